use std::sync::{PoisonError, RwLock};

/// Receiver of the document-level language attribute (`<html lang="..">`).
///
/// Screen readers and search engines read it; the translation layer only
/// keeps it in sync with the active language.
pub trait DocumentLanguage: Send + Sync {
    fn set_lang(&self, code: &str);
}

/// In-process stand-in for the root document element.
#[derive(Debug, Default)]
pub struct DocumentElement {
    lang: RwLock<String>,
}

impl DocumentElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lang(&self) -> String {
        self.lang
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl DocumentLanguage for DocumentElement {
    fn set_lang(&self, code: &str) {
        let mut lang = self.lang.write().unwrap_or_else(PoisonError::into_inner);
        *lang = code.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lang_starts_empty() {
        assert_eq!(DocumentElement::new().lang(), "");
    }

    #[test]
    fn test_document_set_lang() {
        let document = DocumentElement::new();
        document.set_lang("es");
        assert_eq!(document.lang(), "es");
        document.set_lang("ja");
        assert_eq!(document.lang(), "ja");
    }
}
