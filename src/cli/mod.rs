// CLI module for ms-translator
// Author: kelexine (https://github.com/kelexine)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ms-translator - Microsoft Translator API client
#[derive(Parser, Debug)]
#[command(name = "ms-translator", version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to ~/.ms-translator/config.toml when present)
    #[arg(long, short, env = "MS_TRANSLATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print Prometheus metrics to stderr after the command
    #[arg(long)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by the translate commands
#[derive(clap::Args, Debug, Clone)]
pub struct TranslateArgs {
    /// Target language code
    #[arg(long, short)]
    pub to: String,

    /// Source language code (detected when omitted)
    #[arg(long, short)]
    pub from: Option<String>,

    /// Texts are HTML rather than plain text
    #[arg(long)]
    pub html: bool,

    /// Translation category
    #[arg(long, default_value = "general")]
    pub category: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate one text
    Translate {
        text: String,
        #[command(flatten)]
        options: TranslateArgs,
    },

    /// Translate several texts at once
    TranslateArray {
        #[arg(required = true)]
        texts: Vec<String>,
        #[command(flatten)]
        options: TranslateArgs,
    },

    /// Detect the language of one text
    Detect { text: String },

    /// Detect the language of several texts
    DetectArray {
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Split a text into sentences
    BreakSentences {
        text: String,
        #[arg(long, short)]
        language: String,
    },

    /// Normalize social media text
    Transform {
        text: String,
        #[arg(long, short, default_value = "en")]
        language: String,
        #[arg(long, default_value = "general")]
        category: String,
    },

    /// Localized names of language codes
    LanguageNames {
        /// Locale the names are written in
        #[arg(long, short)]
        locale: String,
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Languages available for translation
    Languages,

    /// Manage cached access tokens
    Tokens {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAction {
    /// Delete expired cached tokens
    Sweep,
    /// Delete every cached token
    Clear,
}
