//! Mounted text that follows the active language.
//!
//! A `TranslatedText` describes a literal English string plus how to render
//! it. Mounting it starts a task that requests a translation whenever the
//! text or the active language changes. The previous value stays on display
//! until the new one resolves; nothing shows a loading state.
//!
//! Only the newest request may write to the display. Each request is tagged
//! with a generation number and a commit from any older generation is
//! refused. Superseded requests are also cancelled, so their network calls
//! stop instead of finishing in the background.

use crate::translation::context::TranslationContext;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const DEFAULT_ELEMENT: &str = "span";

/// Source text and rendering options, not yet mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    text: String,
    element: &'static str,
    class: String,
}

impl TranslatedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            element: DEFAULT_ELEMENT,
            class: String::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = class.into();
        self
    }

    /// Render inside `element` instead of `span`. Names that are not plain
    /// lowercase tag names are ignored.
    pub fn as_element(mut self, element: &'static str) -> Self {
        if is_valid_element(element) {
            self.element = element;
        } else {
            warn!("Ignoring invalid element name '{}'", element);
        }
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start following the context's language.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn mount(self, context: Arc<TranslationContext>) -> MountedText {
        let (text_tx, text_rx) = watch::channel(self.text.clone());
        let display = Arc::new(Display::new(self.text.clone()));
        let unmounted = CancellationToken::new();

        let task = tokio::spawn(follow_language(
            context,
            text_rx,
            Arc::clone(&display),
            unmounted.clone(),
        ));

        MountedText {
            element: self.element,
            class: self.class,
            text_tx,
            display,
            unmounted,
            task,
        }
    }
}

/// A `TranslatedText` that is live. Dropping it unmounts.
pub struct MountedText {
    element: &'static str,
    class: String,
    text_tx: watch::Sender<String>,
    display: Arc<Display>,
    unmounted: CancellationToken,
    task: JoinHandle<()>,
}

impl MountedText {
    /// The text currently on display.
    pub fn displayed(&self) -> String {
        self.display.shown.borrow().clone()
    }

    /// Receiver notified whenever the displayed text changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.display.shown.subscribe()
    }

    /// The source text being translated.
    pub fn source(&self) -> String {
        self.text_tx.borrow().clone()
    }

    /// Replace the source text; a translation of the new text is requested.
    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        let modified = self.text_tx.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
        if modified {
            self.display.pending.send_replace(true);
        }
    }

    /// Wait until the newest request for the current text has resolved.
    ///
    /// Language changes reach the mount asynchronously, so a call made right
    /// after `set_language` may return before the new request starts.
    pub async fn settled(&self) {
        let mut pending = self.display.pending.subscribe();
        // The sender lives in `self.display`, so this cannot fail
        let _ = pending.wait_for(|pending| !*pending).await;
    }

    /// HTML for the displayed text inside the configured element.
    pub fn render(&self) -> String {
        let text = escape_html(&self.displayed());
        if self.class.is_empty() {
            format!("<{0}>{1}</{0}>", self.element, text)
        } else {
            format!(
                "<{0} class=\"{1}\">{2}</{0}>",
                self.element,
                escape_html(&self.class),
                text
            )
        }
    }

    /// Stop following the language. Pending results are discarded.
    pub fn unmount(self) {
        debug!("Unmounting translated text");
    }
}

impl Drop for MountedText {
    fn drop(&mut self) {
        self.display.supersede();
        self.unmounted.cancel();
        self.task.abort();
    }
}

/// Displayed text plus the generation allowed to replace it.
struct Display {
    generation: Mutex<u64>,
    shown: watch::Sender<String>,
    // True from the moment a request is due until its result is committed
    pending: watch::Sender<bool>,
}

impl Display {
    fn new(initial: String) -> Self {
        let (shown, _) = watch::channel(initial);
        let (pending, _) = watch::channel(true);
        Self {
            generation: Mutex::new(0),
            shown,
            pending,
        }
    }

    /// Start a new generation; every older one loses its right to commit.
    fn begin(&self) -> u64 {
        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        *generation += 1;
        self.pending.send_replace(true);
        *generation
    }

    fn supersede(&self) {
        self.begin();
    }

    /// Show `text` if `generation` is still current. Returns whether it was.
    fn commit(&self, generation: u64, text: String) -> bool {
        let current = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != generation {
            return false;
        }
        self.shown.send_if_modified(|shown| {
            if *shown == text {
                false
            } else {
                *shown = text;
                true
            }
        });
        self.pending.send_replace(false);
        true
    }
}

async fn follow_language(
    context: Arc<TranslationContext>,
    mut text_rx: watch::Receiver<String>,
    display: Arc<Display>,
    unmounted: CancellationToken,
) {
    let mut lang_rx = context.subscribe();

    loop {
        let language = lang_rx.borrow_and_update().clone();
        let text = text_rx.borrow_and_update().clone();
        let generation = display.begin();
        let request_cancel = unmounted.child_token();

        let outcome = tokio::select! {
            outcome = context.translate_to(&text, &language, &request_cancel) => Some(outcome),
            changed = lang_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                None
            }
            changed = text_rx.changed() => {
                if changed.is_err() {
                    return;
                }
                None
            }
            _ = unmounted.cancelled() => return,
        };

        let Some(outcome) = outcome else {
            // Superseded before it resolved
            request_cancel.cancel();
            context.metrics().record_stale_discard();
            continue;
        };

        if !display.commit(generation, outcome.into_text()) {
            context.metrics().record_stale_discard();
            return;
        }

        tokio::select! {
            changed = lang_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            changed = text_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
            _ = unmounted.cancelled() => return,
        }
    }
}

fn is_valid_element(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
