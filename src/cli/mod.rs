//! CLI command handling.
//!
//! Subcommands:
//! - `run` — serve the chat UI and JSON API (default)
//! - `load` — build the trip database from the CSV inputs
//! - `doctor` — deployment-readiness checks

mod doctor;

pub use doctor::run_doctor_command;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ridelens")]
#[command(about = "Natural-language SQL chat over ride-share trip data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the chat UI and JSON API (default if no subcommand given)
    Run,

    /// Build the trip database from the CSV inputs
    Load,

    /// Check deployment readiness (CSV inputs, database, credential)
    Doctor,
}
