use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::database::{self, Store};
use crate::services::CredentialError;
use crate::AppState;

#[derive(Parser)]
#[command(name = "gigbook-api")]
#[command(about = "Gigbook API - bookkeeping for gigs and expenses")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Create tables that do not exist yet")]
    InitDb,

    #[command(about = "Drop every table and create the schema again")]
    RecreateDb,

    #[command(about = "Insert the two demo users")]
    SeedDb {
        #[arg(long, default_value = "changeme", help = "Password given to each demo user")]
        password: String,
    },

    #[command(about = "Grant admin rights to an existing user")]
    PromoteAdmin {
        #[arg(help = "Username to promote")]
        username: String,
    },
}

const DEMO_USERS: &[(&str, &str)] = &[
    ("Tyler", "tyler@gladtime.example"),
    ("Meghan", "meghan@gladtime.example"),
];

pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    info!("Starting Gigbook API in {:?} mode", config.environment);

    let store = database::connect(&config.database)
        .await
        .context("failed to open database")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config, store).await,
        Commands::InitDb => {
            store.create_schema().await?;
            Ok(())
        }
        Commands::RecreateDb => {
            store.drop_schema().await?;
            store.create_schema().await?;
            Ok(())
        }
        Commands::SeedDb { password } => seed(&config, store, &password).await,
        Commands::PromoteAdmin { username } => {
            let state = AppState::new(&config, store)?;
            match state.credentials.promote(&username).await? {
                Some(user) => {
                    println!("{} is now an admin", user.username);
                    Ok(())
                }
                None => anyhow::bail!("no user named {}", username),
            }
        }
    }
}

async fn serve(config: &AppConfig, store: Arc<dyn Store>) -> Result<()> {
    let state = AppState::new(config, store)?;
    let app = crate::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Gigbook API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn seed(config: &AppConfig, store: Arc<dyn Store>, password: &str) -> Result<()> {
    let state = AppState::new(config, store)?;
    for (username, email) in DEMO_USERS {
        match state.credentials.register(username, email, password).await {
            Ok(user) => println!("Seeded {} (id {})", user.username, user.id),
            Err(CredentialError::DuplicateIdentity) => {
                println!("{} already exists, skipped", username)
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["gigbook-api"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn parses_management_commands() {
        let cli = Cli::try_parse_from(["gigbook-api", "promote-admin", "Tyler"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::PromoteAdmin {
                username: "Tyler".to_string()
            })
        );

        let cli = Cli::try_parse_from(["gigbook-api", "seed-db"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::SeedDb {
                password: "changeme".to_string()
            })
        );

        assert!(Cli::try_parse_from(["gigbook-api", "recreate-db"]).is_ok());
        assert!(Cli::try_parse_from(["gigbook-api", "drop-everything"]).is_err());
    }
}
