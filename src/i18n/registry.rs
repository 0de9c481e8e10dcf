//! The language catalog.
//!
//! The registry is built once on first access (via `OnceLock`) and never
//! mutated afterwards. It also owns the display ordering used by language
//! pickers: English pinned first, everything else by display name.

use std::cmp::Ordering;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// One entry of the language catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 code sent to the translation endpoint
    pub code: &'static str,
    /// English name, for logs
    pub name: &'static str,
    /// Name in the language itself; this is what pickers show
    pub native_name: &'static str,
    /// True for the language source strings are written in
    pub is_canonical: bool,
}

impl LanguageConfig {
    const fn new(code: &'static str, name: &'static str, native_name: &'static str) -> Self {
        Self {
            code,
            name,
            native_name,
            is_canonical: false,
        }
    }

    const fn source(code: &'static str, name: &'static str, native_name: &'static str) -> Self {
        Self {
            code,
            name,
            native_name,
            is_canonical: true,
        }
    }

    /// The name shown to users when picking a language.
    pub fn display_name(&self) -> &'static str {
        self.native_name
    }
}

/// Source strings are authored in English; it is the only canonical entry.
const CATALOG: [LanguageConfig; 10] = [
    LanguageConfig::source("en", "English", "English"),
    LanguageConfig::new("es", "Spanish", "Español"),
    LanguageConfig::new("fr", "French", "Français"),
    LanguageConfig::new("de", "German", "Deutsch"),
    LanguageConfig::new("it", "Italian", "Italiano"),
    LanguageConfig::new("pt", "Portuguese", "Português"),
    LanguageConfig::new("ru", "Russian", "Русский"),
    LanguageConfig::new("zh", "Chinese", "中文"),
    LanguageConfig::new("ja", "Japanese", "日本語"),
    LanguageConfig::new("ko", "Korean", "한국어"),
];

/// The immutable language catalog plus its picker ordering.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    display_order: Vec<usize>,
    canonical: usize,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// The process-wide catalog, built on first use.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry::from_languages(CATALOG.to_vec()))
    }

    fn from_languages(languages: Vec<LanguageConfig>) -> Self {
        let mut display_order: Vec<usize> = (0..languages.len()).collect();
        display_order.sort_by(|&a, &b| compare_for_display(&languages[a], &languages[b]));

        // Sorting pins the canonical entry first; without one, the first
        // picker entry stands in
        let canonical = display_order.first().copied().unwrap_or_default();

        Self {
            languages,
            display_order,
            canonical,
        }
    }

    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Every language in catalog order.
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Every language in picker order: canonical first, the rest by display
    /// name. Computed once, so repeated calls agree.
    pub fn supported_languages(&self) -> Vec<&LanguageConfig> {
        self.display_order
            .iter()
            .map(|&index| &self.languages[index])
            .collect()
    }

    /// The source language.
    pub fn canonical(&self) -> &LanguageConfig {
        &self.languages[self.canonical]
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

/// Canonical first, then locale-aware comparison of display names.
fn compare_for_display(a: &LanguageConfig, b: &LanguageConfig) -> Ordering {
    match (a.is_canonical, b.is_canonical) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    collate(a.display_name(), b.display_name())
}

/// Compare two display names roughly the way a root-locale collator does:
/// scripts first (Latin, Greek, Cyrillic, Hangul, Kana, Han), then the
/// accent- and case-folded text, then the raw text as a tiebreaker.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    let key_a = collation_key(a);
    let key_b = collation_key(b);
    key_a.cmp(&key_b).then_with(|| a.cmp(b))
}

fn collation_key(name: &str) -> (u8, String) {
    let script = name.chars().next().map(script_rank).unwrap_or(u8::MAX);
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    (script, folded)
}

fn script_rank(c: char) -> u8 {
    match c as u32 {
        0x0041..=0x024F => 0,                                  // Latin
        0x0370..=0x03FF => 1,                                  // Greek
        0x0400..=0x052F => 2,                                  // Cyrillic
        0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF => 3, // Hangul
        0x3040..=0x30FF => 4,                                  // Kana
        0x3400..=0x4DBF | 0x4E00..=0x9FFF => 5,                // Han
        _ => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_built_once() {
        assert!(std::ptr::eq(LanguageRegistry::get(), LanguageRegistry::get()));
    }

    #[test]
    fn test_only_english_is_canonical() {
        let canonical: Vec<_> = LanguageRegistry::get()
            .list_all()
            .into_iter()
            .filter(|lang| lang.is_canonical)
            .map(|lang| lang.code)
            .collect();
        assert_eq!(canonical, vec!["en"]);
    }

    #[test]
    fn test_lookup_spanish() {
        let spanish = LanguageRegistry::get().get_by_code("es").expect("es in catalog");
        assert_eq!(spanish.name, "Spanish");
        assert_eq!(spanish.display_name(), "Español");
        assert!(!spanish.is_canonical);
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("xx").is_none());
        assert!(LanguageRegistry::get().get_by_code("").is_none());
    }

    #[test]
    fn test_list_all_has_ten_languages() {
        let all = LanguageRegistry::get().list_all();
        assert_eq!(all.len(), 10);
        for code in ["en", "es", "fr", "de", "it", "pt", "ru", "zh", "ja", "ko"] {
            assert!(all.iter().any(|lang| lang.code == code), "missing {}", code);
        }
    }

    #[test]
    fn test_canonical_is_english() {
        assert_eq!(LanguageRegistry::get().canonical().code, "en");
    }

    #[test]
    fn test_is_supported() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_supported("en"));
        assert!(registry.is_supported("ko"));
        assert!(!registry.is_supported("xx"));
    }

    // ==================== Display Order Tests ====================

    #[test]
    fn test_supported_languages_english_first() {
        let languages = LanguageRegistry::get().supported_languages();
        assert_eq!(languages[0].code, "en");
    }

    #[test]
    fn test_supported_languages_full_order() {
        let names: Vec<&str> = LanguageRegistry::get()
            .supported_languages()
            .iter()
            .map(|lang| lang.display_name())
            .collect();

        assert_eq!(
            names,
            vec![
                "English",
                "Deutsch",
                "Español",
                "Français",
                "Italiano",
                "Português",
                "Русский",
                "한국어",
                "中文",
                "日本語",
            ]
        );
    }

    #[test]
    fn test_supported_languages_is_stable() {
        let first = LanguageRegistry::get().supported_languages();
        let second = LanguageRegistry::get().supported_languages();
        assert_eq!(first, second);
    }

    #[test]
    fn test_canonical_pinned_even_when_not_alphabetical() {
        let registry = LanguageRegistry::from_languages(vec![
            LanguageConfig::new("ab", "Abkhaz", "Aԥсуа"),
            LanguageConfig::source("zz", "Zed", "Zed"),
        ]);

        assert_eq!(registry.supported_languages()[0].code, "zz");
        assert_eq!(registry.canonical().code, "zz");
    }

    // ==================== Collation Tests ====================

    #[test]
    fn test_collate_ignores_accents() {
        // "Éclair" sorts with E, not after Z
        assert_eq!(collate("Éclair", "Fromage"), Ordering::Less);
        assert_eq!(collate("Español", "Estonian"), Ordering::Less);
    }

    #[test]
    fn test_collate_ignores_case() {
        assert_eq!(collate("deutsch", "English"), Ordering::Less);
    }

    #[test]
    fn test_collate_script_order() {
        assert_eq!(collate("Zulu", "Русский"), Ordering::Less);
        assert_eq!(collate("Русский", "한국어"), Ordering::Less);
        assert_eq!(collate("한국어", "中文"), Ordering::Less);
    }

    #[test]
    fn test_collate_equal_names() {
        assert_eq!(collate("Italiano", "Italiano"), Ordering::Equal);
    }
}
