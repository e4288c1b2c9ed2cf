//! Command handlers for the `deckgen` binary
//!
//! Handlers return `Result<_, String>`; the message is what the user sees.

pub mod credentials;
pub mod generate;

use crate::config::AppConfig;
use crate::generation::types::Language;
use clap::{Parser, Subcommand};

/// Turn documents into slide decks
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a deck from a .pdf, .md, .docx or .txt file
    Generate(generate::GenerateArgs),

    /// Print the sample deck shown before anything was generated
    Placeholder {
        /// Deck language (en or cn)
        #[arg(short, long)]
        language: Option<Language>,

        #[arg(short, long, value_enum, default_value = "markdown")]
        format: generate::OutputFormat,
    },

    /// Store the AI gateway key in the OS keychain
    SetKey {
        /// Gateway API key
        key: String,
    },

    /// Remove the stored AI gateway key
    DeleteKey,
}

pub async fn dispatch(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Generate(args) => {
            let config = AppConfig::from_env().map_err(|e| e.to_string())?;
            generate::generate(args, &config).await
        }
        Command::Placeholder { language, format } => {
            let language = match language {
                Some(language) => language,
                None => AppConfig::from_env().map_err(|e| e.to_string())?.language,
            };
            generate::print_placeholder(language, format)
        }
        Command::SetKey { key } => credentials::set_key(&key),
        Command::DeleteKey => credentials::delete_key(),
    }
}
