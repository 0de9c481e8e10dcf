//! Language selection and live text translation for the portfolio site.
//!
//! The application root builds one [`translation::TranslationContext`] and
//! shares it with every piece of text that should follow the visitor's
//! language. Text is authored in English and translated on demand through
//! an external endpoint, with results shared between identical requests and
//! memoized for the rest of the session.

pub mod config;
pub mod i18n;
pub mod preferences;
pub mod translation;
