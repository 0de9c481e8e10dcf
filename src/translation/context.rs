//! The process-wide translation context.
//!
//! One `TranslationContext` is built by the application root and handed to
//! every consumer behind an `Arc`. It is the only writer of the active
//! language; consumers read snapshots or subscribe to changes.

use crate::config::Config;
use crate::i18n::{
    detect_system_locale, primary_subtag, LanguageCode, LanguageConfig, LanguageRegistry,
    TranslationMetrics,
};
use crate::preferences::{FilePreferenceStore, PreferenceStore, PREFERRED_LANGUAGE_KEY};
use crate::translation::cache::{CacheKey, Lookup, RequestOutput, TranslationCache};
use crate::translation::client::{TranslationBackend, TranslationClient};
use crate::translation::document::{DocumentElement, DocumentLanguage};
use crate::translation::outcome::{FallbackReason, Translation};
use anyhow::{Context, Result};
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

pub struct TranslationContext {
    backend: Arc<dyn TranslationBackend>,
    store: Arc<dyn PreferenceStore>,
    document: Arc<dyn DocumentLanguage>,
    current: watch::Sender<LanguageCode>,
    cache: TranslationCache,
    metrics: Arc<TranslationMetrics>,
}

impl TranslationContext {
    /// Build the context, resolving the initial language from `store`,
    /// then `system_locale`, then English.
    pub fn new(
        backend: Arc<dyn TranslationBackend>,
        store: Arc<dyn PreferenceStore>,
        system_locale: Option<&str>,
    ) -> Self {
        let initial = resolve_initial_language(store.as_ref(), system_locale);
        info!(
            "Active language: {} ({})",
            initial.display_name(),
            initial.code()
        );

        let document: Arc<dyn DocumentLanguage> = Arc::new(DocumentElement::new());
        document.set_lang(initial.code());
        let (current, _) = watch::channel(initial);

        Self {
            backend,
            store,
            document,
            current,
            cache: TranslationCache::new(DEFAULT_CACHE_CAPACITY),
            metrics: Arc::new(TranslationMetrics::new()),
        }
    }

    /// Build the context the binary uses: HTTP client, file-backed
    /// preferences and the environment's locale.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client =
            TranslationClient::from_config(config).context("Failed to build translation client")?;
        let store = FilePreferenceStore::new(config.preferences_file.clone());
        debug!("Language preference stored in {}", store.path().display());
        let locale = detect_system_locale();

        Ok(
            Self::new(Arc::new(client), Arc::new(store), locale.as_deref())
                .with_cache_capacity(config.cache_capacity),
        )
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = TranslationCache::new(capacity);
        self
    }

    /// Route the document language attribute to `document`.
    pub fn with_document(mut self, document: Arc<dyn DocumentLanguage>) -> Self {
        document.set_lang(self.current.borrow().code());
        self.document = document;
        self
    }

    /// Snapshot of the active language.
    pub fn current_lang(&self) -> LanguageCode {
        self.current.borrow().clone()
    }

    /// Receiver notified on every language change.
    pub fn subscribe(&self) -> watch::Receiver<LanguageCode> {
        self.current.subscribe()
    }

    /// Catalog in picker order: English first, then by display name.
    pub fn supported_languages(&self) -> Vec<&'static LanguageConfig> {
        LanguageRegistry::get().supported_languages()
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Switch the active language.
    ///
    /// Codes outside the catalog are accepted and passed through to the
    /// endpoint. The choice is persisted before subscribers are notified;
    /// a failed write is logged and does not stop the switch.
    pub fn set_language(&self, code: &str) {
        let language = LanguageCode::new(code);
        if language.code().is_empty() {
            warn!("Ignoring empty language code");
            return;
        }
        if !language.is_supported() {
            warn!(
                "Language '{}' is not in the catalog, translations will be requested as-is",
                language
            );
        }

        if let Err(e) = self.store.set(PREFERRED_LANGUAGE_KEY, language.code()) {
            warn!("Failed to persist language preference: {:#}", e);
        }
        self.document.set_lang(language.code());

        info!(
            "Language set to {} ({})",
            language.display_name(),
            language.code()
        );
        self.current.send_if_modified(|current| {
            if *current == language {
                false
            } else {
                *current = language;
                true
            }
        });
    }

    /// Translate `text` into the active language, falling back to `text`.
    pub async fn translate(&self, text: &str) -> String {
        self.translate_tagged(text).await.into_text()
    }

    /// Translate `text` into the active language, keeping the outcome.
    pub async fn translate_tagged(&self, text: &str) -> Translation {
        let target = self.current_lang();
        self.translate_to(text, &target, &CancellationToken::new())
            .await
    }

    /// Translate `text` into `target`.
    ///
    /// Never fails: errors become [`Translation::Fallback`]. Cancelling
    /// `cancel` stops waiting immediately; the shared request is aborted once
    /// no other caller is waiting on it.
    pub async fn translate_to(
        &self,
        text: &str,
        target: &LanguageCode,
        cancel: &CancellationToken,
    ) -> Translation {
        if target.is_canonical() || text.trim().is_empty() {
            return Translation::Source(text.to_string());
        }

        let key = CacheKey::new(text, target);
        let request = match self
            .cache
            .lookup_or_start(key, || self.start_request(text, target))
        {
            Lookup::Hit(translated) => {
                self.metrics.record_cache_hit();
                debug!("Cache hit for {} translation", target.code());
                return Translation::Translated(translated);
            }
            Lookup::Joined(request) => {
                self.metrics.record_coalesced();
                debug!("Joined in-flight {} translation", target.code());
                request
            }
            Lookup::Started(request) => {
                self.metrics.record_cache_miss();
                request
            }
        };

        let output = tokio::select! {
            _ = cancel.cancelled() => Err(FallbackReason::Cancelled),
            output = request => output,
        };

        match output {
            Ok(translated) => Translation::Translated(translated),
            Err(reason) => {
                self.metrics.record_fallback();
                if reason == FallbackReason::Cancelled {
                    debug!("Translation to {} cancelled", target.code());
                } else {
                    warn!("Translation error ({}): {}", target.code(), reason);
                }
                Translation::Fallback {
                    text: text.to_string(),
                    reason,
                }
            }
        }
    }

    fn start_request(&self, text: &str, target: &LanguageCode) -> BoxFuture<'static, RequestOutput> {
        let backend = Arc::clone(&self.backend);
        let metrics = Arc::clone(&self.metrics);
        let text = text.to_string();
        let target = target.clone();

        async move {
            // Cancelled when this future is dropped, i.e. when the last
            // waiter has gone away
            let cancel = CancellationToken::new();
            let _abort_on_drop = cancel.clone().drop_guard();

            metrics.record_api_call();
            backend
                .translate(&text, &target, &cancel)
                .await
                .map_err(|e| {
                    metrics.record_api_failure();
                    FallbackReason::from(&e)
                })
        }
        .boxed()
    }
}

/// Pick the language a session starts in.
///
/// Priority: persisted choice, then the system locale (only when the catalog
/// supports it), then English.
pub fn resolve_initial_language(
    store: &dyn PreferenceStore,
    system_locale: Option<&str>,
) -> LanguageCode {
    match store.get(PREFERRED_LANGUAGE_KEY) {
        Ok(Some(saved)) if !saved.trim().is_empty() => {
            debug!("Using persisted language preference '{}'", saved);
            return LanguageCode::new(&saved);
        }
        Ok(_) => {}
        Err(e) => warn!("Failed to read language preference: {:#}", e),
    }

    if let Some(primary) = system_locale.and_then(primary_subtag) {
        let language = LanguageCode::new(&primary);
        if language.is_supported() {
            debug!("Using system locale language '{}'", primary);
            return language;
        }
        debug!("System locale language '{}' is not supported", primary);
    }

    LanguageCode::ENGLISH
}
