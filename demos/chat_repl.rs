//! Interactive terminal chat with marker-based tool calls
//!
//! Reads configuration from the environment (or `.env`), prints the seeded
//! greeting and then runs one round per line of input. Ask for the time or
//! for arithmetic to see the tools kick in.
//!
//! Run with: GOOGLE_API_KEY=... cargo run --example chat_repl

use anyhow::Context;
use markerchat::prelude::*;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let gateway = config.gateway().context("failed to create completion gateway")?;
    let broker = LlmBroker::new(config.model.clone(), gateway);
    let session = ChatSession::builder(broker)
        .prompt_style(config.prompt_style)
        .completion_config(config.completion.clone())
        .build();

    let mut transcript = Transcript::new();

    println!("Marker Chat ({:?}, {})", config.provider, config.model);
    println!("=================================");
    println!("Send an empty message to exit.\n");

    for message in transcript.messages() {
        print_message(message);
    }

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut query = String::new();
        if io::stdin().read_line(&mut query)? == 0 {
            break;
        }
        let query = query.trim();

        if query.is_empty() {
            println!("\nGoodbye!");
            break;
        }

        match session.send(&mut transcript, query).await {
            Ok(_) => {
                if let Some(reply) = transcript.last() {
                    print_message(reply);
                }
            }
            Err(e) => {
                eprintln!("Error: {}\n", e);
            }
        }
    }

    Ok(())
}

fn print_message(message: &LlmMessage) {
    let label = match message.role {
        MessageRole::User => "You",
        MessageRole::Assistant => "Assistant",
    };
    println!("{}: {}\n", label, message.content);
}
