//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-browser session store.

use crate::adapters::pdf::RendererLoader;
use crate::config::Config;
use explainer_core::ports::ExplanationService;
use explainer_core::shell::Shell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub explainer: Arc<dyn ExplanationService>,
    pub renderer: Arc<RendererLoader>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        explainer: Arc<dyn ExplanationService>,
        renderer: Arc<RendererLoader>,
    ) -> Self {
        Self {
            config,
            explainer,
            renderer,
            sessions: Arc::new(SessionStore::default()),
        }
    }
}

//=========================================================================================
// SessionStore (One Shell Per Browser)
//=========================================================================================

/// A handle to one browser's shell, inserted into request extensions by the session middleware.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub shell: Arc<Mutex<Shell>>,
}

impl SessionHandle {
    /// A fresh shell that is not stored anywhere, for reads without a session.
    /// Its id is nil.
    pub fn detached() -> Self {
        Self {
            id: Uuid::nil(),
            shell: Arc::new(Mutex::new(Shell::new())),
        }
    }
}

struct SessionEntry {
    shell: Arc<Mutex<Shell>>,
    last_seen: Instant,
}

/// In-memory sessions keyed by the session cookie. Nothing is persisted.
#[derive(Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<Uuid, SessionEntry>>,
}

impl SessionStore {
    /// Returns the live session for `id` and marks it as seen.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(SessionHandle {
            id,
            shell: entry.shell.clone(),
        })
    }

    /// Stores a new, empty session.
    pub async fn create(&self) -> SessionHandle {
        let handle = SessionHandle {
            id: Uuid::new_v4(),
            shell: Arc::new(Mutex::new(Shell::new())),
        };
        self.entries.lock().await.insert(
            handle.id,
            SessionEntry {
                shell: handle.shell.clone(),
                last_seen: Instant::now(),
            },
        );
        handle
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many were removed.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.last_seen.elapsed() <= ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_ids_resolve_to_the_same_shell() {
        let store = SessionStore::default();
        let first = store.create().await;

        let again = store.get(first.id).await.unwrap();
        assert_eq!(again.id, first.id);
        assert!(Arc::ptr_eq(&again.shell, &first.shell));

        assert!(store.get(Uuid::new_v4()).await.is_none());
        let other = store.create().await;
        assert_ne!(other.id, first.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn detached_handles_are_not_stored() {
        let store = SessionStore::default();
        let handle = SessionHandle::detached();
        assert!(handle.id.is_nil());
        assert!(store.get(handle.id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn idle_sessions_are_pruned() {
        let store = SessionStore::default();
        store.create().await;
        store.create().await;
        assert_eq!(store.prune_idle(Duration::from_secs(3600)).await, 0);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(store.prune_idle(Duration::ZERO).await, 2);
        assert_eq!(store.len().await, 0);
    }
}
