use crate::translation::client::TranslateError;
use std::fmt;

/// Result of asking for a translation.
///
/// Every variant carries the text that should be shown, so callers that do
/// not care about the reason can use [`Translation::into_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// The endpoint produced a translation.
    Translated(String),
    /// No translation was needed (canonical language or blank text).
    Source(String),
    /// Translation failed; the original text is shown instead.
    Fallback { text: String, reason: FallbackReason },
}

impl Translation {
    pub fn text(&self) -> &str {
        match self {
            Translation::Translated(text) | Translation::Source(text) => text,
            Translation::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Translation::Translated(text) | Translation::Source(text) => text,
            Translation::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Translation::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Translation::Fallback { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Why a translation fell back to the original text.
///
/// Cloneable (unlike [`TranslateError`]) so one failure can be handed to
/// every caller sharing an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Network(String),
    Status(u16),
    Malformed(String),
    Cancelled,
}

impl From<&TranslateError> for FallbackReason {
    fn from(error: &TranslateError) -> Self {
        match error {
            TranslateError::Network(e) => FallbackReason::Network(e.to_string()),
            TranslateError::Status(status) => FallbackReason::Status(*status),
            TranslateError::Malformed(detail) => FallbackReason::Malformed(detail.clone()),
            TranslateError::Cancelled => FallbackReason::Cancelled,
        }
    }
}

impl From<TranslateError> for FallbackReason {
    fn from(error: TranslateError) -> Self {
        FallbackReason::from(&error)
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Network(detail) => write!(f, "network error: {}", detail),
            FallbackReason::Status(status) => write!(f, "endpoint returned status {}", status),
            FallbackReason::Malformed(detail) => write!(f, "malformed response: {}", detail),
            FallbackReason::Cancelled => f.write_str("request cancelled"),
        }
    }
}
