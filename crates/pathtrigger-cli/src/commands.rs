//! CLI command definitions.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Handle one commit event and trigger the matching pipelines
    Handle {
        /// Event JSON file (reads stdin when omitted)
        #[arg(short, long)]
        event: Option<PathBuf>,
    },

    /// Show which pipelines the given paths would trigger, without calling AWS
    Resolve {
        /// Changed file paths
        #[arg(required = true)]
        paths: Vec<String>,

        /// Print the target set as JSON
        #[arg(long)]
        json: bool,
    },
}
