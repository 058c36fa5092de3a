pub mod calculator;
pub mod clock;

pub use calculator::{calculate, render_outcome, CalcError, CalculationRequest, Number, Operation};
pub use clock::{get_time, Clock, FixedClock, SystemClock};
