//! Language code type.
//!
//! A `LanguageCode` is any normalized language identifier. Codes outside the
//! catalog are representable on purpose: the active language can be set to
//! one (it is passed through to the translation endpoint), while
//! `from_code` offers strict validation for callers that want it.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A normalized (trimmed, lowercase) language code such as "en" or "es".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(Cow<'static, str>);

impl LanguageCode {
    /// English, the source language of every translatable string.
    pub const ENGLISH: LanguageCode = LanguageCode(Cow::Borrowed("en"));

    /// Create a code without validating it against the catalog.
    pub fn new(code: &str) -> LanguageCode {
        let normalized = code.trim().to_ascii_lowercase();
        // Reuse the registry's static str when the code is known
        match LanguageRegistry::get().get_by_code(&normalized) {
            Some(config) => LanguageCode(Cow::Borrowed(config.code)),
            None => LanguageCode(Cow::Owned(normalized)),
        }
    }

    /// Create a code, failing if it is not part of the catalog.
    ///
    /// # Example
    /// ```ignore
    /// let spanish = LanguageCode::from_code("es")?;
    /// ```
    pub fn from_code(code: &str) -> Result<LanguageCode> {
        let language = LanguageCode::new(code);
        if language.code().is_empty() {
            bail!("Empty language code");
        }
        if !language.is_supported() {
            bail!("Unknown language code: '{}'", code);
        }
        Ok(language)
    }

    /// Get the code as a string slice.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Full catalog entry, if the code is supported.
    pub fn config(&self) -> Option<&'static LanguageConfig> {
        LanguageRegistry::get().get_by_code(self.code())
    }

    /// Whether the catalog knows this code.
    pub fn is_supported(&self) -> bool {
        self.config().is_some()
    }

    /// Whether this is the canonical (source) language.
    pub fn is_canonical(&self) -> bool {
        self.config().map(|c| c.is_canonical).unwrap_or(false)
    }

    /// Name shown to users; unsupported codes fall back to the raw code.
    pub fn display_name(&self) -> &str {
        match self.config() {
            Some(config) => config.display_name(),
            None => self.code(),
        }
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        LanguageCode::ENGLISH
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<&LanguageConfig> for LanguageCode {
    fn from(config: &LanguageConfig) -> Self {
        LanguageCode(Cow::Borrowed(config.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_constant() {
        let english = LanguageCode::ENGLISH;
        assert_eq!(english.code(), "en");
        assert_eq!(english.display_name(), "English");
        assert!(english.is_canonical());
        assert!(english.is_supported());
    }

    #[test]
    fn test_new_normalizes() {
        assert_eq!(LanguageCode::new(" ES ").code(), "es");
        assert_eq!(LanguageCode::new("Fr"), LanguageCode::new("fr"));
    }

    #[test]
    fn test_new_accepts_unknown_code() {
        let language = LanguageCode::new("xx");
        assert_eq!(language.code(), "xx");
        assert!(!language.is_supported());
        assert!(!language.is_canonical());
        assert_eq!(language.display_name(), "xx");
    }

    #[test]
    fn test_from_code_spanish() {
        let language = LanguageCode::from_code("es").expect("Should succeed");
        assert_eq!(language.code(), "es");
        assert_eq!(language.display_name(), "Español");
        assert!(!language.is_canonical());
    }

    #[test]
    fn test_from_code_invalid() {
        let result = LanguageCode::from_code("xx");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(LanguageCode::from_code("").is_err());
        assert!(LanguageCode::from_code("   ").is_err());
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(LanguageCode::default(), LanguageCode::ENGLISH);
    }

    #[test]
    fn test_english_constant_equals_parsed() {
        assert_eq!(LanguageCode::ENGLISH, LanguageCode::new("en"));
    }

    #[test]
    fn test_display() {
        assert_eq!(LanguageCode::new("ja").to_string(), "ja");
    }

    #[test]
    fn test_from_catalog_entry() {
        for config in LanguageRegistry::get().list_all() {
            let code = LanguageCode::from(config);
            assert_eq!(code, LanguageCode::new(config.code));
            assert_eq!(code.display_name(), config.display_name());
        }
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&LanguageCode::new("ko")).expect("serialize");
        assert_eq!(json, "\"ko\"");
        let parsed: LanguageCode = serde_json::from_str("\"de\"").expect("deserialize");
        assert_eq!(parsed.code(), "de");
    }
}
