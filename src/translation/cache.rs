//! Memoized translations and in-flight request sharing.
//!
//! Completed translations are kept per `(text, target)` pair. While a pair
//! is being fetched, later callers join the same request instead of issuing
//! their own. The in-flight table only holds weak references: once every
//! caller waiting on a request has gone, the request future is dropped
//! (aborting the HTTP call) and the next caller starts a fresh one.

use crate::i18n::LanguageCode;
use crate::translation::outcome::FallbackReason;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type RequestOutput = Result<String, FallbackReason>;
pub type SharedRequest = Shared<BoxFuture<'static, RequestOutput>>;
type WeakRequest = WeakShared<BoxFuture<'static, RequestOutput>>;

/// Identity of a translation: the same key always means the same output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub target: LanguageCode,
}

impl CacheKey {
    pub fn new(text: &str, target: &LanguageCode) -> Self {
        Self {
            text: text.to_string(),
            target: target.clone(),
        }
    }
}

/// What a lookup found.
pub enum Lookup {
    /// A memoized translation.
    Hit(String),
    /// An identical request is already running; await it.
    Joined(SharedRequest),
    /// No request was running; this one was just registered.
    Started(SharedRequest),
}

pub struct TranslationCache {
    state: Arc<Mutex<CacheState>>,
    capacity: usize,
}

#[derive(Default)]
struct CacheState {
    ready: HashMap<CacheKey, String>,
    // Insertion order of `ready`, oldest first
    order: VecDeque<CacheKey>,
    in_flight: HashMap<CacheKey, WeakRequest>,
}

impl CacheState {
    /// Drop entries whose every waiter has gone away.
    fn prune_abandoned(&mut self) {
        self.in_flight.retain(|_, weak| weak.upgrade().is_some());
    }

    fn remember(&mut self, key: CacheKey, text: String, capacity: usize) {
        if capacity == 0 {
            return;
        }
        if self.ready.insert(key.clone(), text).is_none() {
            self.order.push_back(key);
        }
        while self.ready.len() > capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.ready.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

impl TranslationCache {
    /// `capacity` bounds the number of memoized translations; 0 disables
    /// memoization but keeps in-flight sharing.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return a memoized translation, join a running request, or register
    /// the request built by `start`.
    ///
    /// `start` only builds the future; nothing runs until a caller awaits
    /// the returned request. Successful results are memoized, failures are
    /// not.
    pub fn lookup_or_start<F>(&self, key: CacheKey, start: F) -> Lookup
    where
        F: FnOnce() -> BoxFuture<'static, RequestOutput>,
    {
        let mut state = self.lock();

        if let Some(text) = state.ready.get(&key) {
            return Lookup::Hit(text.clone());
        }

        if let Some(running) = state.in_flight.get(&key).and_then(WeakShared::upgrade) {
            return Lookup::Joined(running);
        }
        state.prune_abandoned();

        let inner = start();
        let shared_state = Arc::clone(&self.state);
        let capacity = self.capacity;
        let completed_key = key.clone();

        let request = async move {
            let output = inner.await;

            {
                let mut state = shared_state.lock().unwrap_or_else(PoisonError::into_inner);
                state.in_flight.remove(&completed_key);
                if let Ok(text) = &output {
                    state.remember(completed_key, text.clone(), capacity);
                }
            }

            output
        }
        .boxed()
        .shared();

        if let Some(weak) = request.downgrade() {
            state.in_flight.insert(key, weak);
        }

        Lookup::Started(request)
    }

    /// Memoized translation for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.lock().ready.get(key).cloned()
    }

    /// Number of memoized translations.
    pub fn len(&self) -> usize {
        self.lock().ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of requests that still have at least one waiter.
    pub fn in_flight(&self) -> usize {
        let mut state = self.lock();
        state.prune_abandoned();
        state.in_flight.len()
    }

    /// Forget every memoized translation. Running requests are unaffected.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.ready.clear();
        state.order.clear();
    }
}
