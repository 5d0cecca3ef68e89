use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;

use crate::core::{AppConfig, ChatVariant};

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,

        /// Conversation model to expose, overrides SOLACE_CHAT_VARIANT
        #[arg(long, value_enum)]
        variant: Option<ChatVariant>,
    },
    /// Start an interactive session in the terminal
    Chat {
        /// Session id to chat as
        #[arg(long, default_value = "local")]
        id: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve {
            host,
            port,
            variant,
        }) => {
            let mut config = AppConfig::from_env()?;
            if let Some(variant) = variant {
                config.variant = variant;
            }
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat { id }) => {
            let config = AppConfig::from_env()?;
            chat::run(&id, config).await?;
        }
        None => {}
    }

    Ok(())
}
