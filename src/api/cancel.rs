//! Cancellation handles for in-flight requests
//!
//! A `CancelToken` is a cheap, clonable flag that request futures race
//! against. A `CancelSet` tracks the tokens of every outstanding save so they
//! can all be cancelled when the board goes away.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use super::ApiError;

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Flag the token as cancelled. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `cancel()` has been called on any clone
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Run `fut` unless `cancel` fires first, in which case the future is dropped
/// and `ApiError::Cancelled` is returned.
pub async fn run_cancellable<T, F>(cancel: Option<&CancelToken>, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let Some(token) = cancel else {
        return fut.await;
    };

    if token.is_cancelled() {
        return Err(ApiError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ApiError::Cancelled),
        result = fut => result,
    }
}

/// Outstanding cancellation handles, keyed by the ticket of the request that owns them
#[derive(Debug, Default)]
pub struct CancelSet {
    next_ticket: u64,
    tokens: HashMap<u64, CancelToken>,
}

impl CancelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and track a fresh token. Earlier tokens stay tracked.
    pub fn register(&mut self) -> (u64, CancelToken) {
        self.next_ticket += 1;
        let token = CancelToken::new();
        self.tokens.insert(self.next_ticket, token.clone());
        (self.next_ticket, token)
    }

    /// Stop tracking the token for `ticket`. Returns false if it was unknown.
    pub fn release(&mut self, ticket: u64) -> bool {
        self.tokens.remove(&ticket).is_some()
    }

    /// Cancel every tracked token and forget them
    pub fn cancel_all(&mut self) {
        for (ticket, token) in self.tokens.drain() {
            tracing::debug!("Cancelling outstanding request #{}", ticket);
            token.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
