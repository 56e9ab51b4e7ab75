//! Shared quote service wrapper used across clients.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::db::{MemoryKeyValueStore, SqliteKeyValueStore};
use crate::error::{Error, Result};
use crate::models::Quote;
use crate::store::QuoteStore;
use crate::sync::{identity_key, KeyFn, RemoteQuoteSource, SyncReport};

/// Thread-safe service over a [`QuoteStore`] and a remote quote source.
///
/// Syncs are single-flight: while one sync waits on its fetch, further calls
/// fail fast with [`Error::SyncInProgress`]. The store lock is never held
/// across a remote call.
#[derive(Clone)]
pub struct QuoteService {
    store: Arc<Mutex<QuoteStore>>,
    remote: Arc<dyn RemoteQuoteSource>,
    key_fn: KeyFn,
    sync_in_flight: Arc<AtomicBool>,
}

impl QuoteService {
    pub fn new(store: QuoteStore, remote: Arc<dyn RemoteQuoteSource>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            remote,
            key_fn: identity_key,
            sync_in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open a service backed by an `SQLite` file at `db_path`.
    pub fn open_path(
        db_path: impl AsRef<Path>,
        remote: Arc<dyn RemoteQuoteSource>,
    ) -> Result<Self> {
        let storage = SqliteKeyValueStore::open(db_path)?;
        Ok(Self::new(QuoteStore::open(storage)?, remote))
    }

    /// Open a service with in-memory storage (primarily for tests).
    pub fn open_in_memory(remote: Arc<dyn RemoteQuoteSource>) -> Result<Self> {
        Ok(Self::new(QuoteStore::open(MemoryKeyValueStore::new())?, remote))
    }

    /// Replace the identity key function used when merging.
    #[must_use]
    pub fn with_key_fn(mut self, key_fn: KeyFn) -> Self {
        self.key_fn = key_fn;
        self
    }

    /// Add a quote locally, then offer it to the remote source.
    ///
    /// A failed submit is logged and does not undo the local add.
    pub async fn add_quote(&self, text: &str, category: &str) -> Result<Quote> {
        let mut quote = {
            let mut store = self.store.lock().await;
            store.add(text, category)?
        };

        match self.remote.submit_quote(&quote).await {
            Ok(Some(server_id)) => {
                let mut store = self.store.lock().await;
                match store.assign_server_id(&quote.id, server_id) {
                    Ok(true) => quote.server_id = Some(server_id),
                    Ok(false) => {}
                    Err(error) => {
                        tracing::warn!("Failed to record server id for {}: {error}", quote.id);
                    }
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("Quote {} kept locally; submit failed: {error}", quote.id);
            }
        }

        Ok(quote)
    }

    /// Fetch remote candidates and merge them into the store.
    ///
    /// A failed fetch leaves the store untouched and is reported as a
    /// transient error.
    pub async fn sync_with_remote(&self) -> Result<SyncReport> {
        let _guard = SyncGuard::acquire(&self.sync_in_flight).ok_or(Error::SyncInProgress)?;

        let candidates = match self.remote.fetch_quotes().await {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!("Sync failed, local quotes unchanged: {error}");
                return Err(if error.is_transient() {
                    error
                } else {
                    Error::Remote(error.to_string())
                });
            }
        };

        let mut store = self.store.lock().await;
        let report = store.merge_remote(&candidates, self.key_fn)?;
        if report.has_changes() {
            tracing::info!(
                "Quotes synced with server: {} added, {} updated",
                report.added,
                report.updated
            );
        } else {
            tracing::debug!("Sync completed with no changes");
        }
        Ok(report)
    }

    /// Whether a sync is currently waiting on the remote source.
    pub fn is_syncing(&self) -> bool {
        self.sync_in_flight.load(Ordering::Acquire)
    }

    pub async fn list_quotes(&self) -> Vec<Quote> {
        let store = self.store.lock().await;
        store.quotes().to_vec()
    }

    /// Filter by category and remember the selection.
    pub async fn filter_by_category(&self, label: Option<&str>) -> Result<Vec<Quote>> {
        let mut store = self.store.lock().await;
        store.filter_by_category(label)
    }

    pub async fn categories(&self) -> Vec<String> {
        let store = self.store.lock().await;
        store.categories()
    }

    pub async fn selected_category(&self) -> String {
        let store = self.store.lock().await;
        store.selected_category().to_string()
    }

    /// Random quote from the current selection.
    pub async fn random_quote<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Quote> {
        let store = self.store.lock().await;
        store.random_quote(rng).cloned()
    }

    pub async fn import_quotes(&self, payload: &Value) -> Result<usize> {
        let mut store = self.store.lock().await;
        store.import_quotes(payload)
    }

    pub async fn import_json(&self, raw: &str) -> Result<usize> {
        let mut store = self.store.lock().await;
        store.import_json(raw)
    }

    pub async fn export_snapshot(&self) -> Result<String> {
        let store = self.store.lock().await;
        store.export_snapshot()
    }

    /// Records flagged as resolved in favor of remote.
    pub async fn flagged_quotes(&self) -> Vec<Quote> {
        let store = self.store.lock().await;
        store.flagged().into_iter().cloned().collect()
    }

    pub async fn accept_remote(&self) -> Result<usize> {
        let mut store = self.store.lock().await;
        store.accept_remote()
    }

    /// Delete flagged records; see [`QuoteStore::accept_local`].
    pub async fn accept_local(&self) -> Result<usize> {
        let mut store = self.store.lock().await;
        store.accept_local()
    }

    pub async fn last_synced_at(&self) -> Option<i64> {
        let store = self.store.lock().await;
        store.last_synced_at()
    }
}

/// Clears the in-flight flag when the sync ends, however it ends.
struct SyncGuard {
    flag: Arc<AtomicBool>,
}

impl SyncGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
