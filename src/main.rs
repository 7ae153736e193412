mod cli;

use clap::Parser;
use cli::{Cli, Commands, GetArgs};
use fetchpool::client::Client;
use fetchpool::config::Config;
use std::sync::mpsc;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Get(args) => get(args)?,
    }

    Ok(())
}

fn get(args: GetArgs) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = Config::load()?;
    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }

    let client = Client::new(config)?;
    let (tx, rx) = mpsc::channel();

    let total = args.urls.len();
    for url in args.urls {
        let tx = tx.clone();
        let key = url.clone();
        client.submit(url, move |result| {
            let _ = tx.send((key, result));
        });
    }

    let mut failures = 0usize;
    for _ in 0..total {
        let (url, result) = rx.recv()?;
        if result.successful {
            println!("{}: {} bytes", url, result.data.len());
        } else if result.canceled {
            println!("{}: canceled", url);
        } else {
            println!("{}: failed", url);
            failures += 1;
        }
    }

    client.shutdown();

    if failures > 0 {
        return Err(format!("{} of {} requests failed", failures, total).into());
    }

    Ok(())
}
