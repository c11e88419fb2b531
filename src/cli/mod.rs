pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "eunify")]
#[command(about = "E-Unify CLI - Menu registry maintenance and operator tooling")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Seed, inspect and maintain the menu registry")]
    Menu {
        #[arg(long, global = true, help = "Database URL (defaults to DATABASE_URL)")]
        database_url: Option<String>,
        #[command(subcommand)]
        cmd: commands::menu::MenuCommands,
    },

    #[command(about = "Authentication and token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Menu { database_url, cmd } => {
            commands::menu::handle(cmd, database_url, output_format).await
        },
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
    }
}
