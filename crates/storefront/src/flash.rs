//! Auto-reverting confirmation flags ("Added to cart!").
//!
//! A flash is an explicit scheduled callback: [`FlashBoard::trigger`] marks a
//! key active and spawns a Tokio task that clears it after a delay. Each
//! pending reset carries a token and an abort handle, so re-triggering the
//! same key replaces the old timer instead of letting it clear the new flash
//! early, and [`FlashBoard::cancel_scope`] drops every pending reset for a
//! visitor who navigated away.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use handicrafts_core::ProductId;
use tokio::task::AbortHandle;

/// What a flash is about: one visitor, one product.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlashKey {
    /// Visitor identifier (from the session).
    pub scope: String,
    pub product_id: ProductId,
}

impl FlashKey {
    #[must_use]
    pub fn new(scope: impl Into<String>, product_id: ProductId) -> Self {
        Self {
            scope: scope.into(),
            product_id,
        }
    }
}

struct Pending {
    token: u64,
    reset: AbortHandle,
}

#[derive(Default)]
struct FlashState {
    next_token: u64,
    active: HashMap<FlashKey, Pending>,
}

/// Shared registry of active flashes. Cheap to clone.
#[derive(Clone, Default)]
pub struct FlashBoard {
    inner: Arc<Mutex<FlashState>>,
}

impl std::fmt::Debug for FlashBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashBoard")
            .field("active", &self.lock().active.len())
            .finish()
    }
}

impl FlashBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FlashState> {
        // The state is a plain map; a panic elsewhere cannot leave it half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Show the flash for `key` for `duration`, restarting any running timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn trigger(&self, key: FlashKey, duration: Duration) {
        let mut state = self.lock();
        state.next_token += 1;
        let token = state.next_token;

        let board = self.clone();
        let task_key = key.clone();
        let reset = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            board.expire(&task_key, token);
        })
        .abort_handle();

        if let Some(previous) = state.active.insert(key, Pending { token, reset }) {
            previous.reset.abort();
        }
    }

    /// Clear `key` only if it is still owned by the timer holding `token`.
    fn expire(&self, key: &FlashKey, token: u64) {
        let mut state = self.lock();
        if state.active.get(key).is_some_and(|p| p.token == token) {
            state.active.remove(key);
            tracing::trace!(scope = %key.scope, product_id = %key.product_id, "Flash expired");
        }
    }

    #[must_use]
    pub fn is_active(&self, key: &FlashKey) -> bool {
        self.lock().active.contains_key(key)
    }

    /// Products with an active flash for `scope`.
    #[must_use]
    pub fn active_in_scope(&self, scope: &str) -> Vec<ProductId> {
        self.lock()
            .active
            .keys()
            .filter(|k| k.scope == scope)
            .map(|k| k.product_id.clone())
            .collect()
    }

    /// Drop the flash for `key` and its pending reset. Returns whether one existed.
    pub fn cancel(&self, key: &FlashKey) -> bool {
        self.lock().active.remove(key).is_some_and(|pending| {
            pending.reset.abort();
            true
        })
    }

    /// Drop every flash for `scope`. Returns how many were cancelled.
    pub fn cancel_scope(&self, scope: &str) -> usize {
        let mut state = self.lock();
        let before = state.active.len();
        state.active.retain(|key, pending| {
            if key.scope == scope {
                pending.reset.abort();
                false
            } else {
                true
            }
        });
        before - state.active.len()
    }
}
