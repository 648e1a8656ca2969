mod cmd;
mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cmd::Playground::load(cli.config.as_deref()) {
        Ok(playground) => match cli.command {
            Commands::Watch(args) => cmd::watch::run(&playground, args).await,
            Commands::Error(args) => cmd::watch::run_error(&playground, args).await,
            Commands::Snapshot(args) => cmd::ops::snapshot(&playground, args).await,
            Commands::Exists(args) => cmd::ops::exists(&playground, args).await,
            Commands::Set(args) => cmd::ops::set(&playground, args).await,
            Commands::SetField(args) => cmd::ops::set_field(&playground, args).await,
        },
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
