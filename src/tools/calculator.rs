//! Four-operation arithmetic over a list of numbers.
//!
//! Failures are values of [`CalcError`]; nothing here panics. Callers that only
//! want display text use [`render_outcome`], which produces `Error: ...` for
//! failures so the reply reads the same whether the calculation worked or not.
//!
//! Integers are exact at any size. A float operand turns the result into a
//! float, and `divide` always yields one.

use num_bigint::BigInt;
use num_traits::{One, ToPrimitive, Zero};
use serde::de::{self, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Provide at least two numbers.")]
    TooFewNumbers,

    #[error("Division by zero is not allowed.")]
    DivisionByZero,

    #[error("Unsupported operation. Use 'add', 'subtract', 'multiply', or 'divide'.")]
    UnsupportedOperation(String),

    #[error("{0}")]
    Fault(String),
}

/// A JSON number that remembers whether it was written as an integer
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(BigInt),
    Float(f64),
}

impl Number {
    /// Interpret a JSON number literal. Literals with a fraction or exponent are floats.
    pub fn from_literal(literal: &str) -> Result<Self, String> {
        if literal.contains(['.', 'e', 'E']) {
            literal
                .parse::<f64>()
                .map(Number::Float)
                .map_err(|e| format!("invalid number {}: {}", literal, e))
        } else {
            BigInt::from_str(literal)
                .map(Number::Int)
                .map_err(|e| format!("invalid number {}: {}", literal, e))
        }
    }

    /// Float value, failing when an integer is beyond the float range
    pub fn to_f64(&self) -> Result<f64, CalcError> {
        match self {
            Number::Int(i) => i
                .to_f64()
                .filter(|f| f.is_finite())
                .ok_or_else(|| CalcError::Fault("int too large to convert to float".to_string())),
            Number::Float(f) => Ok(*f),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => i.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // serde_json keeps the literal text (arbitrary_precision), so big integers survive
        let literal = serde_json::Number::deserialize(deserializer)?.to_string();
        Number::from_literal(&literal).map_err(de::Error::custom)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(BigInt::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Shortest round-trip form with a `.0` on integral values and a signed,
/// two-digit exponent (`1e+16`, `1e-05`).
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }

    // Debug already switches to exponent form below 1e-4 and from 1e16
    let debug = format!("{:?}", x);
    match debug.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => debug,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }
}

impl FromStr for Operation {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operation::Add),
            "subtract" => Ok(Operation::Subtract),
            "multiply" => Ok(Operation::Multiply),
            "divide" => Ok(Operation::Divide),
            other => Err(CalcError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated calculation: a known operation over at least two numbers
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    operation: Operation,
    numbers: Vec<Number>,
}

impl CalculationRequest {
    pub fn new(operation: Operation, numbers: Vec<Number>) -> Result<Self, CalcError> {
        if numbers.len() < 2 {
            return Err(CalcError::TooFewNumbers);
        }

        Ok(Self { operation, numbers })
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn numbers(&self) -> &[Number] {
        &self.numbers
    }

    pub fn evaluate(&self) -> Result<Number, CalcError> {
        let (first, rest) = (&self.numbers[0], &self.numbers[1..]);

        match self.operation {
            Operation::Add => sum(&self.numbers),
            Operation::Subtract => {
                let tail = sum(rest)?;
                combine(first.clone(), tail, |a, b| a - b, |a, b| a - b)
            }
            Operation::Multiply => self
                .numbers
                .iter()
                .try_fold(Number::Int(BigInt::one()), |acc, n| {
                    combine(acc, n.clone(), |a, b| a * b, |a, b| a * b)
                }),
            Operation::Divide => {
                let mut result = first.to_f64()?;
                for divisor in rest {
                    if divisor.is_zero() {
                        return Err(CalcError::DivisionByZero);
                    }
                    result /= divisor.to_f64()?;
                }
                Ok(Number::Float(result))
            }
        }
    }
}

fn sum(numbers: &[Number]) -> Result<Number, CalcError> {
    numbers
        .iter()
        .try_fold(Number::Int(BigInt::zero()), |acc, n| combine(acc, n.clone(), |a, b| a + b, |a, b| a + b))
}

// Integers stay exact until a float shows up
fn combine(
    lhs: Number,
    rhs: Number,
    int_op: fn(BigInt, BigInt) -> BigInt,
    float_op: fn(f64, f64) -> f64,
) -> Result<Number, CalcError> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => Ok(Number::Int(int_op(a, b))),
        (lhs, rhs) => Ok(Number::Float(float_op(lhs.to_f64()?, rhs.to_f64()?))),
    }
}

/// Perform `operation` over `numbers`.
///
/// The count check runs before the operation is looked up, so
/// `calculate("modulo", &[1.into()])` reports too few numbers.
pub fn calculate(operation: &str, numbers: &[Number]) -> Result<Number, CalcError> {
    if numbers.len() < 2 {
        return Err(CalcError::TooFewNumbers);
    }

    let operation: Operation = operation.parse()?;
    CalculationRequest::new(operation, numbers.to_vec())?.evaluate()
}

/// Text shown to the user for a calculation outcome
pub fn render_outcome(outcome: &Result<Number, CalcError>) -> String {
    match outcome {
        Ok(value) => value.to_string(),
        Err(err) => format!("Error: {}", err),
    }
}
