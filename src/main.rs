//! StrideCoach - AI running coach CLI
//!
//! Main entry point for the StrideCoach application.

use anyhow::Result;
use clap::CommandFactory;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stridecoach::cli::{AuthCommand, Cli, Commands};
use stridecoach::commands;
use stridecoach::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Some(Commands::Chat {
            user,
            feedback,
            limit,
        }) => {
            tracing::info!("Starting coaching session for {}", user);
            commands::chat::run_chat(config, user, feedback, limit).await?;
            Ok(())
        }
        Some(Commands::Auth { command }) => match command {
            AuthCommand::Login { user } => {
                tracing::info!("Starting authorization for {}", user);
                commands::auth::login(config, user).await?;
                Ok(())
            }
            AuthCommand::List => {
                commands::auth::list(config)?;
                Ok(())
            }
            AuthCommand::Status { user } => {
                commands::auth::status(config, user)?;
                Ok(())
            }
            AuthCommand::Revoke { user } => {
                commands::auth::revoke(config, user).await?;
                Ok(())
            }
        },
        Some(Commands::Activities { user, limit }) => {
            commands::activities::run(config, user, limit).await?;
            Ok(())
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "stridecoach=debug"
    } else {
        "stridecoach=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
