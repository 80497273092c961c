// ms-translator - Microsoft Translator API client
// Author: kelexine (https://github.com/kelexine)

use anyhow::{Context, Result};
use clap::Parser;
use ms_translator::cli::{Args, Command, TokenAction, TranslateArgs};
use ms_translator::client::{ContentType, TranslateOptions, TranslatorClient};
use ms_translator::config::TranslatorConfig;
use ms_translator::utils::logging;
use tracing::info;

fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = TranslatorConfig::load(args.config.as_deref())?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    info!("Starting ms-translator v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the client (token store, transport)
    let client = TranslatorClient::new(config)?;

    // Phase 4: Run the command
    let output = run(&client, args.command)?;
    println!("{}", output);

    if args.print_metrics {
        eprintln!("{}", ms_translator::metrics::gather_metrics());
    }

    Ok(())
}

fn options(args: &TranslateArgs) -> TranslateOptions {
    let mut options = TranslateOptions::default().category(args.category.clone());
    if let Some(from) = &args.from {
        options = options.source_language(from.clone());
    }
    if args.html {
        options = options.content_type(ContentType::Html);
    }
    options
}

fn run(client: &TranslatorClient, command: Command) -> Result<String> {
    let response = match command {
        Command::Translate { text, options: args } => client.translate(&text, &args.to, &options(&args))?,
        Command::TranslateArray { texts, options: args } => {
            client.translate_array(&texts, &args.to, &options(&args))?
        }
        Command::Detect { text } => client.detect(&text)?,
        Command::DetectArray { texts } => client.detect_array(&texts)?,
        Command::BreakSentences { text, language } => client.break_sentences(&text, &language)?,
        Command::Transform {
            text,
            language,
            category,
        } => client.transform_text(&text, &language, &category)?,
        Command::LanguageNames { locale, codes } => client.get_language_names(&locale, codes)?,
        Command::Languages => client.get_languages_for_translate()?,
        Command::Tokens { action } => return manage_tokens(client, action),
    };

    serde_json::to_string_pretty(response.body()).context("Failed to render the response")
}

fn manage_tokens(client: &TranslatorClient, action: TokenAction) -> Result<String> {
    let store = client
        .store()
        .context("A fixed access token is configured; no tokens are cached")?;

    let removed = match action {
        TokenAction::Sweep => store.sweep_expired()?,
        TokenAction::Clear => store.delete_all()?,
    };

    Ok(serde_json::json!({ "backend": store.backend(), "removed": removed }).to_string())
}
