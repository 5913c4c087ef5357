use clap::{Parser, Subcommand};

/// Weather worker agent: answers delegated weather questions.
#[derive(Parser, Debug)]
#[command(name = "weather-worker", version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Command {
    /// Serve NLIP-style envelopes over HTTP and WebSocket (default).
    #[default]
    Serve,

    /// Chat with the agent on the console.
    Standalone,
}

pub fn parse() -> Args {
    Args::parse()
}
