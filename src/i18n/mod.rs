//! Language catalog, language codes, locale detection and translation metrics.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their display order
//! - `language`: Normalized `LanguageCode` type
//! - `locale`: System locale signal used at startup
//! - `metrics`: Translation observability counters
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_translate::i18n::{LanguageCode, LanguageRegistry};
//!
//! let spanish = LanguageCode::from_code("es")?;
//! let picker = LanguageRegistry::get().supported_languages();
//! assert_eq!(picker[0].code, "en");
//! ```

mod language;
mod locale;
mod metrics;
mod registry;

pub use language::LanguageCode;
pub use locale::{detect_system_locale, primary_subtag};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
