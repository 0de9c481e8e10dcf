//! Command-line driver for the translation layer.
//!
//! Usage:
//!   portfolio-translate --list                   # Languages in picker order
//!   portfolio-translate --lang es                # Switch (and persist) the language
//!   portfolio-translate "About me" "Skills."     # Render texts in the active language
//!   portfolio-translate --lang fr --metrics "Hi" # Combine, then print metrics as JSON
//!
//! Optional environment variables:
//! - TRANSLATE_API_URL (defaults to the public translate endpoint)
//! - TRANSLATE_TIMEOUT_SECS (defaults to 10)
//! - TRANSLATE_CACHE_CAPACITY (defaults to 1024)
//! - PREFERENCES_FILE (defaults to data/preferences.json)

use anyhow::{bail, Context, Result};
use portfolio_translate::config::Config;
use portfolio_translate::i18n::LanguageCode;
use portfolio_translate::translation::{MountedText, TranslatedText, TranslationContext};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default)]
struct Args {
    lang: Option<String>,
    list: bool,
    metrics: bool,
    texts: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lang" => {
                let code = args.next().context("--lang requires a language code")?;
                parsed.lang = Some(code);
            }
            "--list" => parsed.list = true,
            "--metrics" => parsed.metrics = true,
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            _ => parsed.texts.push(arg),
        }
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portfolio_translate=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = Config::from_env()?;
    let context = Arc::new(TranslationContext::from_config(&config)?);

    if let Some(code) = &args.lang {
        context.set_language(code);
    }

    if args.list {
        let current = context.current_lang();
        for language in context.supported_languages() {
            let code = LanguageCode::from(language);
            let marker = if code == current { "*" } else { " " };
            println!("{} {}  {}", marker, code, language.display_name());
        }
    }

    if !args.texts.is_empty() {
        info!(
            "Translating {} text(s) into {}",
            args.texts.len(),
            context.current_lang()
        );

        let mounted: Vec<MountedText> = args
            .texts
            .iter()
            .map(|text| TranslatedText::new(text.clone()).mount(Arc::clone(&context)))
            .collect();

        for text in &mounted {
            text.settled().await;
            println!("{}", text.render());
        }
    }

    if args.metrics {
        let report = context.metrics().report();
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_texts_and_flags() {
        let parsed = parse_args(args(&["--lang", "es", "Hello", "--metrics", "About me"])).unwrap();

        assert_eq!(parsed.lang.as_deref(), Some("es"));
        assert!(parsed.metrics);
        assert!(!parsed.list);
        assert_eq!(parsed.texts, vec!["Hello", "About me"]);
    }

    #[test]
    fn test_parse_args_list() {
        let parsed = parse_args(args(&["--list"])).unwrap();
        assert!(parsed.list);
        assert!(parsed.texts.is_empty());
    }

    #[test]
    fn test_parse_args_missing_lang_value() {
        let result = parse_args(args(&["--lang"]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("--lang"));
    }

    #[test]
    fn test_parse_args_unknown_flag() {
        let result = parse_args(args(&["--verbose"]));
        assert!(result.unwrap_err().to_string().contains("Unknown option"));
    }
}
