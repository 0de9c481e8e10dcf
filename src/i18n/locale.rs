//! System locale signal.
//!
//! Used once at startup as a fallback when no language preference has been
//! persisted yet.

use regex::Regex;
use std::sync::OnceLock;

/// Environment variables consulted, highest priority first.
const LOCALE_VARS: [&str; 4] = ["LC_ALL", "LC_MESSAGES", "LANGUAGE", "LANG"];

static PRIMARY_SUBTAG_REGEX: OnceLock<Regex> = OnceLock::new();

/// Extract the primary language subtag from a locale string.
///
/// Accepts BCP-47 tags ("en-US", "zh-Hans") and POSIX locales
/// ("pt_BR.UTF-8", "de_DE@euro"). Returns `None` for "C", "POSIX" and
/// anything that does not start with a 2-3 letter subtag.
pub fn primary_subtag(locale: &str) -> Option<String> {
    let regex = PRIMARY_SUBTAG_REGEX
        .get_or_init(|| Regex::new(r"^([A-Za-z]{2,3})(?:[-_.@].*)?$").unwrap());

    let locale = locale.trim();
    if locale.eq_ignore_ascii_case("c") || locale.eq_ignore_ascii_case("posix") {
        return None;
    }

    regex
        .captures(locale)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// The user's locale: explicit environment overrides first, then whatever
/// the OS reports (registry on Windows, user defaults on macOS).
///
/// `LANGUAGE` may hold a colon-separated priority list; its first entry is used.
pub fn detect_system_locale() -> Option<String> {
    locale_from(|key| std::env::var(key).ok(), sys_locale::get_locale)
}

fn locale_from<E, O>(env: E, os_locale: O) -> Option<String>
where
    E: Fn(&str) -> Option<String>,
    O: FnOnce() -> Option<String>,
{
    LOCALE_VARS
        .iter()
        .find_map(|&key| usable(env(key)?.split(':').next()?))
        .or_else(|| usable(&os_locale()?))
}

fn usable(locale: &str) -> Option<String> {
    let locale = locale.trim();
    primary_subtag(locale).map(|_| locale.to_string())
}
