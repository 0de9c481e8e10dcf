use crate::config::Config;
use crate::i18n::LanguageCode;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Public endpoint used by the site's translation layer
pub const DEFAULT_API_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Source language of every translatable string
const SOURCE_LANGUAGE: &str = "en";

/// Sentence-ending periods make the endpoint split the query into separately
/// translated segments, only the first of which is read back. Periods travel
/// as an ideographic full stop and are restored afterwards.
const PERIOD: char = '.';
const PERIOD_PLACEHOLDER: char = '\u{3002}';

/// Errors from a single translation call
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Translation endpoint returned status {0}")]
    Status(u16),

    #[error("Malformed translation response: {0}")]
    Malformed(String),

    #[error("Translation request cancelled")]
    Cancelled,
}

/// Something that can translate English text into a target language.
///
/// Implementations perform exactly one attempt: no retries, no caching.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target: &LanguageCode,
        cancel: &CancellationToken,
    ) -> Result<String, TranslateError>;
}

/// HTTP client for the translation endpoint
#[derive(Debug, Clone)]
pub struct TranslationClient {
    http: reqwest::Client,
    api_url: String,
}

impl TranslationClient {
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self, TranslateError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portfolio-translate/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, TranslateError> {
        Self::new(config.translate_api_url.clone(), config.request_timeout)
    }

    async fn request(&self, text: &str, target: &LanguageCode) -> Result<String, TranslateError> {
        let (leading, core, trailing) = split_padding(text);
        let query = substitute_periods(core);

        debug!(
            "Requesting translation to {} ({} chars)",
            target.code(),
            core.chars().count()
        );

        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("client", "gtx"),
                ("sl", SOURCE_LANGUAGE),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", query.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| TranslateError::Malformed(format!("invalid JSON: {}", e)))?;
        let translated = parse_response(&payload)?;

        Ok(format!(
            "{}{}{}",
            leading,
            restore_periods(translated),
            trailing
        ))
    }
}

#[async_trait]
impl TranslationBackend for TranslationClient {
    async fn translate(
        &self,
        text: &str,
        target: &LanguageCode,
        cancel: &CancellationToken,
    ) -> Result<String, TranslateError> {
        tokio::select! {
            // Dropping the request future aborts the HTTP call
            _ = cancel.cancelled() => {
                debug!("Translation to {} cancelled before completion", target.code());
                Err(TranslateError::Cancelled)
            }
            result = self.request(text, target) => result,
        }
    }
}

/// Extract the translated string from the endpoint payload.
///
/// The payload is a nested array; the translation is at `[0][0][0]`.
/// Anything else is malformed.
pub fn parse_response(payload: &Value) -> Result<&str, TranslateError> {
    let segments = payload
        .as_array()
        .ok_or_else(|| TranslateError::Malformed("expected a top-level array".to_string()))?;

    let sentences = segments
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Malformed("missing sentence list".to_string()))?;

    let sentence = sentences
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Malformed("missing first sentence".to_string()))?;

    sentence
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| TranslateError::Malformed("first sentence has no text".to_string()))
}

/// Replace every period with the placeholder before sending.
pub fn substitute_periods(text: &str) -> String {
    text.replace(PERIOD, &PERIOD_PLACEHOLDER.to_string())
}

/// Turn placeholders back into periods.
///
/// The response cannot tell a placeholder from a full stop the translation
/// produced itself, so every U+3002 comes back as '.'. Chinese and Japanese
/// output therefore ends sentences with ASCII periods.
pub fn restore_periods(text: &str) -> String {
    text.replace(PERIOD_PLACEHOLDER, &PERIOD.to_string())
}

/// Split off leading and trailing whitespace so it survives the round trip.
fn split_padding(text: &str) -> (&str, &str, &str) {
    let core = text.trim();
    if core.is_empty() {
        return (text, "", "");
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();
    (&text[..start], core, &text[end..])
}
