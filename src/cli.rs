use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fetchpool")]
#[command(about = "fetchpool CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one or more URLs and report each outcome
    Get(GetArgs),
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// URLs to fetch
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Number of worker threads (overrides configuration)
    #[arg(long)]
    pub workers: Option<usize>,
}
