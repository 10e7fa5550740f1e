//! Active download registry
//!
//! In-memory map from download id to the cancellation token of its live
//! process. This is the single source of truth for "is this download
//! cancellable right now": an entry exists exactly while the supervising
//! task owns a running process, and is removed when the process
//! terminates, regardless of outcome.
//!
//! Cancellation and completion both go through [`remove`](JobRegistry::remove),
//! an atomic check-and-remove, so a cancel racing a completion can never
//! observe a token for a process that has already been reaped.

use crate::types::DownloadId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Registry of live download processes, keyed by download id
///
/// Cloneable: all clones share the same underlying map. The orchestrator
/// is constructed with an injected registry so the lifetime and
/// concurrent-access discipline are testable in isolation.
#[derive(Clone, Default)]
pub struct JobRegistry {
    active: Arc<Mutex<HashMap<DownloadId, CancellationToken>>>,
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the cancellation token for a newly spawned process
    ///
    /// Returns the previous token if the id was already registered. The
    /// orchestrator never double-registers; a caller seeing `Some` here
    /// has violated the one-process-per-download invariant.
    pub async fn register(&self, id: DownloadId, token: CancellationToken) -> Option<CancellationToken> {
        self.active.lock().await.insert(id, token)
    }

    /// Atomically remove and return the token for a download
    ///
    /// Used by cancellation (to signal the process) and by the supervision
    /// task once the process has terminated. Returns `None` if the
    /// download has no live process.
    pub async fn remove(&self, id: DownloadId) -> Option<CancellationToken> {
        self.active.lock().await.remove(&id)
    }

    /// Whether a download currently has a live process
    pub async fn is_active(&self, id: DownloadId) -> bool {
        self.active.lock().await.contains_key(&id)
    }

    /// Number of live processes
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Atomically remove and return every registered token
    ///
    /// Shutdown support: the caller cancels each returned token and the
    /// per-download supervision tasks resolve their downloads as usual.
    pub async fn drain(&self) -> Vec<CancellationToken> {
        self.active.lock().await.drain().map(|(_, token)| token).collect()
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_then_remove_returns_the_token() {
        let registry = JobRegistry::new();
        let token = CancellationToken::new();

        assert!(registry.register(DownloadId(1), token.clone()).await.is_none());
        assert!(registry.is_active(DownloadId(1)).await);

        let removed = registry.remove(DownloadId(1)).await;
        assert!(removed.is_some());
        assert!(!registry.is_active(DownloadId(1)).await);
    }

    #[tokio::test]
    async fn remove_of_unknown_id_returns_none() {
        let registry = JobRegistry::new();
        assert!(registry.remove(DownloadId(42)).await.is_none());
    }

    #[tokio::test]
    async fn second_remove_returns_none() {
        // The check-and-remove is what prevents a cancel racing a completion
        // from both acting on the same process
        let registry = JobRegistry::new();
        registry
            .register(DownloadId(1), CancellationToken::new())
            .await;

        assert!(registry.remove(DownloadId(1)).await.is_some());
        assert!(registry.remove(DownloadId(1)).await.is_none());
    }

    #[tokio::test]
    async fn entries_are_independent_per_download() {
        let registry = JobRegistry::new();
        registry
            .register(DownloadId(1), CancellationToken::new())
            .await;
        registry
            .register(DownloadId(2), CancellationToken::new())
            .await;

        assert_eq!(registry.active_count().await, 2);

        registry.remove(DownloadId(1)).await;
        assert!(!registry.is_active(DownloadId(1)).await);
        assert!(registry.is_active(DownloadId(2)).await);
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn clones_share_the_same_map() {
        let registry = JobRegistry::new();
        let clone = registry.clone();

        registry
            .register(DownloadId(9), CancellationToken::new())
            .await;
        assert!(clone.is_active(DownloadId(9)).await);

        clone.remove(DownloadId(9)).await;
        assert!(!registry.is_active(DownloadId(9)).await);
    }

    #[tokio::test]
    async fn drain_empties_the_registry_and_returns_all_tokens() {
        let registry = JobRegistry::new();
        registry
            .register(DownloadId(1), CancellationToken::new())
            .await;
        registry
            .register(DownloadId(2), CancellationToken::new())
            .await;

        let drained = registry.drain().await;
        assert_eq!(drained.len(), 2);
        assert_eq!(registry.active_count().await, 0);
    }

    #[tokio::test]
    async fn concurrent_removes_hand_the_token_to_exactly_one_caller() {
        let registry = JobRegistry::new();
        registry
            .register(DownloadId(5), CancellationToken::new())
            .await;

        let r1 = registry.clone();
        let r2 = registry.clone();
        let (a, b) = tokio::join!(r1.remove(DownloadId(5)), r2.remove(DownloadId(5)));

        assert_eq!(
            a.is_some() as u8 + b.is_some() as u8,
            1,
            "exactly one concurrent remove may win the token"
        );
    }
}
