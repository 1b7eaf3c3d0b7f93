//! Remote reconciliation.
//!
//! Periodically fetches the remote posts collection, appends every record
//! whose text has no exact local match, pushes local records added since the
//! last run, and advances the sync cursor. Text equality is the only
//! identity key: a remote record matching a local one by text is dropped,
//! whatever its category.

pub mod config;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::meta::SyncMeta;
use crate::store::{Quote, QuoteStore};
use config::SyncConfig;

/// Category stamped onto records merged from the remote endpoint.
pub const SERVER_CATEGORY: &str = "server";

/// Observable reconciler state. `Complete` and `Failed` are transient run
/// outcomes; the machine re-enters `Idle` after every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Idle,
    Syncing,
    Complete,
    Failed,
}

/// A record from the remote posts collection. Only `body` matters; it
/// becomes the quote text. Other fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RemotePost {
    pub body: String,
}

#[derive(Serialize)]
struct UploadPost<'a> {
    title: &'a str,
    body: &'a str,
}

/// Outcome of one completed sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Records the remote endpoint returned.
    pub fetched: usize,
    /// Records appended to the local list.
    pub added: usize,
    /// Local records pushed to the endpoint.
    pub uploaded: usize,
    /// When this run started; becomes the new cursor.
    pub at: DateTime<Utc>,
}

/// Remote records with no exact-text match in `local`, mapped to quotes in
/// their original remote order. Matching is against the local list only; a
/// body repeated in the remote batch is appended once per occurrence.
pub fn new_from_remote(local: &[Quote], remote: Vec<RemotePost>, now: DateTime<Utc>) -> Vec<Quote> {
    remote
        .into_iter()
        .filter(|post| !local.iter().any(|q| q.text == post.body))
        .map(|post| Quote {
            text: post.body,
            category: SERVER_CATEGORY.to_string(),
            date_added: Some(now),
        })
        .collect()
}

/// Local records added after the cursor — the upload set. Seed quotes carry
/// no timestamp and are never uploaded.
pub fn upload_candidates(quotes: &[Quote], cursor: Option<DateTime<Utc>>) -> Vec<Quote> {
    quotes
        .iter()
        .filter(|q| match (q.date_added, cursor) {
            (Some(added), Some(cursor)) => added > cursor,
            (Some(_), None) => true,
            (None, _) => false,
        })
        .cloned()
        .collect()
}

/// The reconciler. Holds the HTTP client and serializes runs through a
/// single-flight guard.
pub struct SyncEngine {
    client: Client,
    config: SyncConfig,
    in_flight: AtomicBool,
    status: Mutex<SyncStatus>,
}

impl SyncEngine {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            in_flight: AtomicBool::new(false),
            status: Mutex::new(SyncStatus::Idle),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn status(&self) -> SyncStatus {
        self.status.lock().map(|s| *s).unwrap_or(SyncStatus::Idle)
    }

    fn set_status(&self, status: SyncStatus) {
        if let Ok(mut s) = self.status.lock() {
            *s = status;
        }
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.request_timeout_secs)
    }

    /// Fetch the full remote posts collection. The cursor never filters this
    /// fetch; every run re-downloads the whole set.
    pub async fn fetch_posts(&self) -> Result<Vec<RemotePost>> {
        let response = self
            .client
            .get(format!("{}/posts", self.config.base_url))
            .timeout(self.request_timeout())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Push a single quote to the endpoint. The response body is ignored;
    /// only success or failure matters.
    pub async fn push_quote(&self, quote: &Quote) -> Result<()> {
        self.client
            .post(format!("{}/posts", self.config.base_url))
            .json(&UploadPost {
                title: &quote.category,
                body: &quote.text,
            })
            .timeout(self.request_timeout())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Run one reconciliation: fetch, merge, upload, advance the cursor.
    ///
    /// Returns `SyncInFlight` without touching anything if a run is already
    /// underway — overlapping timer and manual triggers never interleave
    /// their reads and writes of the persisted list.
    pub async fn run(
        &self,
        store: &Mutex<QuoteStore>,
        meta: &Mutex<SyncMeta>,
        meta_path: &Path,
    ) -> Result<SyncReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(VaultError::SyncInFlight);
        }

        self.set_status(SyncStatus::Syncing);
        let result = self.run_inner(store, meta, meta_path).await;
        self.set_status(match result {
            Ok(_) => SyncStatus::Complete,
            Err(_) => SyncStatus::Failed,
        });
        // The outcome is carried by the returned result; the machine
        // re-enters Idle before the guard is released so a new trigger never
        // observes a stale outcome state.
        self.set_status(SyncStatus::Idle);
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(
        &self,
        store: &Mutex<QuoteStore>,
        meta: &Mutex<SyncMeta>,
        meta_path: &Path,
    ) -> Result<SyncReport> {
        let posts = self.fetch_posts().await?;
        let fetched = posts.len();
        let now = Utc::now();

        let cursor = meta
            .lock()
            .map_err(|e| VaultError::Lock(e.to_string()))?
            .last_synced;

        // Upload set comes from the pre-merge list, so records merged from
        // the server below are never echoed back to it.
        let (candidates, added) = {
            let mut store = store.lock().map_err(|e| VaultError::Lock(e.to_string()))?;
            let candidates = upload_candidates(store.quotes(), cursor);
            let fresh = new_from_remote(store.quotes(), posts, now);
            let added = fresh.len();
            if added > 0 {
                store.extend(fresh)?;
            }
            (candidates, added)
        };

        let mut uploaded = 0;
        for quote in &candidates {
            match self.push_quote(quote).await {
                Ok(()) => uploaded += 1,
                Err(e) => {
                    // At-most-once: log and move on, no retry.
                    tracing::warn!("Failed to upload quote \"{}\": {}", quote.text, e);
                }
            }
        }

        {
            let mut meta = meta.lock().map_err(|e| VaultError::Lock(e.to_string()))?;
            meta.last_synced = Some(now);
            meta.save(meta_path)?;
        }

        tracing::info!(
            "Sync complete: {} fetched, {} added, {} uploaded",
            fetched,
            added,
            uploaded
        );
        Ok(SyncReport {
            fetched,
            added,
            uploaded,
            at: now,
        })
    }
}
