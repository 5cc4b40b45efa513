//! CLI argument parsing for hf

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HolidayFinder - find a Colland holiday rental in five questions
#[derive(Parser, Debug)]
#[command(name = "hf")]
#[command(author, version, about = "Find a Colland holiday rental in a short conversation", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Path to the property catalog (overrides config and environment)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Subcommand to execute; the interview runs when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the interview (default)
    Chat,

    /// List the catalog's properties and tag vocabulary
    Catalog,

    /// Show which properties the given tags would shortlist, without any model call
    Tags {
        /// Tags to rank against
        #[arg(required = true)]
        tags: Vec<String>,
    },
}
