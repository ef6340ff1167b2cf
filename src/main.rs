//! twinpane - Two-panel browser navigation with breadcrumbs and restorable state

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "twinpane=debug"
    } else {
        "twinpane=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Breadcrumbs { path, json } => {
            cli::commands::breadcrumbs(&path, json)?;
        }
        Commands::Save { side, path, scroll } => {
            cli::commands::save(cli.state, side, &path, scroll)?;
        }
        Commands::Status => {
            cli::commands::status(cli.state)?;
        }
        Commands::Restore { side } => {
            cli::commands::restore(cli.config, cli.state, side).await?;
        }
        Commands::Navigate { side, path, root } => {
            cli::commands::navigate(cli.config, cli.state, side, path, root).await?;
        }
        Commands::Roots => {
            cli::commands::roots().await?;
        }
        Commands::Init { force } => {
            cli::commands::init(cli.config, force)?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
