//! Live translation of English source strings.
//!
//! - `client`: one HTTP call to the translation endpoint
//! - `outcome`: tagged result with an explicit fallback reason
//! - `cache`: memoization and in-flight request sharing
//! - `context`: the active language and `translate` bound to it
//! - `text`: mounted text that follows language changes
//! - `document`: the document-level language attribute

mod cache;
mod client;
mod context;
mod document;
mod outcome;
mod text;

pub use cache::{CacheKey, Lookup, TranslationCache};
pub use client::{
    parse_response, restore_periods, substitute_periods, TranslateError, TranslationBackend,
    TranslationClient, DEFAULT_API_URL,
};
pub use context::{resolve_initial_language, TranslationContext, DEFAULT_CACHE_CAPACITY};
pub use document::{DocumentElement, DocumentLanguage};
pub use outcome::{FallbackReason, Translation};
pub use text::{MountedText, TranslatedText};
