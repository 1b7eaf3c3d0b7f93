mod error;
mod meta;
mod store;
mod sync;
mod transfer;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

pub use error::{Result, VaultError};
pub use meta::SyncMeta;
pub use store::{seed_quotes, Quote, QuoteStore};
pub use sync::config::SyncConfig;
pub use sync::{RemotePost, SyncEngine, SyncReport, SyncStatus, SERVER_CATEGORY};
pub use transfer::{export_json, import_json};

const QUOTES_FILE: &str = "quotes.json";
const META_FILE: &str = "sync_meta.json";

/// Get the app data directory.
fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("com.quotevault.app")
}

/// Application state shared between the caller-facing API and the
/// background sync loop.
pub struct QuoteApp {
    store: Mutex<QuoteStore>,
    meta: Mutex<SyncMeta>,
    meta_path: PathBuf,
    engine: SyncEngine,
}

impl QuoteApp {
    /// Open (or create) the vault rooted at `data_dir`.
    pub fn open(data_dir: &Path, config: SyncConfig) -> Self {
        let store = QuoteStore::load(&data_dir.join(QUOTES_FILE));
        let meta_path = data_dir.join(META_FILE);
        let meta = SyncMeta::load(&meta_path);
        Self {
            store: Mutex::new(store),
            meta: Mutex::new(meta),
            meta_path,
            engine: SyncEngine::new(config),
        }
    }

    /// Open the vault in the default app data directory.
    pub fn open_default(config: SyncConfig) -> Self {
        Self::open(&app_data_dir(), config)
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, QuoteStore>> {
        self.store.lock().map_err(|e| VaultError::Lock(e.to_string()))
    }

    fn lock_meta(&self) -> Result<MutexGuard<'_, SyncMeta>> {
        self.meta.lock().map_err(|e| VaultError::Lock(e.to_string()))
    }

    // --- Quote access ---

    /// Validate and insert a user-entered quote.
    pub fn add_quote(&self, text: &str, category: &str) -> Result<Quote> {
        let mut store = self.lock_store()?;
        store.add_quote(text, category)
    }

    pub fn quotes(&self) -> Result<Vec<Quote>> {
        Ok(self.lock_store()?.quotes().to_vec())
    }

    /// Distinct categories for populating a selector.
    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(self.lock_store()?.categories())
    }

    /// Random quote for the display area, optionally filtered by category.
    pub fn random_quote(&self, category: Option<&str>) -> Result<Option<Quote>> {
        Ok(self.lock_store()?.random_quote(category).cloned())
    }

    // --- Category filter persistence ---

    /// Remember the category filter the UI selected, restored on next start.
    pub fn set_category_filter(&self, category: Option<String>) -> Result<()> {
        let mut meta = self.lock_meta()?;
        meta.last_category = category;
        meta.save(&self.meta_path)
    }

    pub fn category_filter(&self) -> Result<Option<String>> {
        Ok(self.lock_meta()?.last_category.clone())
    }

    // --- Export / import ---

    pub fn export_quotes(&self) -> Result<String> {
        let store = self.lock_store()?;
        transfer::export_json(store.quotes())
    }

    /// Import a quote file. The whole batch is validated first; either every
    /// record is appended or none is.
    pub fn import_quotes(&self, content: &str) -> Result<usize> {
        let quotes = transfer::import_json(content)?;
        let count = quotes.len();
        let mut store = self.lock_store()?;
        store.extend(quotes)?;
        Ok(count)
    }

    // --- Sync ---

    /// Trigger a reconciliation right now (the "sync now" control). Returns
    /// `SyncInFlight` if a run is already underway.
    pub async fn sync_now(&self) -> Result<SyncReport> {
        self.engine.run(&self.store, &self.meta, &self.meta_path).await
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.engine.status()
    }

    pub fn last_synced(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock_meta()?.last_synced)
    }
}

/// Start the periodic sync loop. The first tick fires immediately, which is
/// the startup sync; failures are logged and the loop keeps going until the
/// next tick.
pub fn spawn_periodic_sync(app: Arc<QuoteApp>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(app.engine.config().poll_interval_secs);
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match app.sync_now().await {
                Ok(report) => {
                    tracing::debug!("Periodic sync added {} quotes", report.added);
                }
                Err(VaultError::SyncInFlight) => {
                    tracing::debug!("Sync already running, skipping tick");
                }
                Err(e) => {
                    tracing::warn!("Sync failed: {}", e);
                }
            }
        }
    })
}

// --- App Setup ---

pub async fn run() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quotevault=info")),
        )
        .init();

    tracing::info!("Starting quotevault v{}", env!("CARGO_PKG_VERSION"));

    let data_dir = app_data_dir();
    tracing::info!("Data directory: {}", data_dir.display());

    let app = Arc::new(QuoteApp::open(&data_dir, SyncConfig::default()));
    tracing::info!("Loaded {} quotes", app.quotes()?.len());

    let sync_task = spawn_periodic_sync(app.clone());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    sync_task.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_app(name: &str) -> (PathBuf, QuoteApp) {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        let app = QuoteApp::open(&dir, SyncConfig::default());
        (dir, app)
    }

    #[test]
    fn test_fresh_app_has_seed_quotes() {
        let (dir, app) = temp_app("quotevault_test_app_fresh");
        assert_eq!(app.quotes().unwrap().len(), 3);
        assert_eq!(app.sync_status(), SyncStatus::Idle);
        assert!(app.last_synced().unwrap().is_none());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_add_then_reopen_persists() {
        let (dir, app) = temp_app("quotevault_test_app_reopen");
        app.add_quote("Persisted across restarts", "testing").unwrap();

        let reopened = QuoteApp::open(&dir, SyncConfig::default());
        let quotes = reopened.quotes().unwrap();
        assert_eq!(quotes.len(), 4);
        assert_eq!(quotes[3].text, "Persisted across restarts");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_export_import_through_app() {
        let (dir, app) = temp_app("quotevault_test_app_transfer");
        app.add_quote("Exported", "io").unwrap();

        let exported = app.export_quotes().unwrap();

        let (dir2, other) = temp_app("quotevault_test_app_transfer2");
        let imported = other.import_quotes(&exported).unwrap();
        assert_eq!(imported, 4);
        assert_eq!(other.quotes().unwrap().len(), 7); // 3 seeds + 4 imported

        let _ = std::fs::remove_dir_all(dir);
        let _ = std::fs::remove_dir_all(dir2);
    }

    #[test]
    fn test_import_failure_leaves_store_unchanged() {
        let (dir, app) = temp_app("quotevault_test_app_badimport");
        let before = app.quotes().unwrap().len();

        let result = app.import_quotes(r#"[{"text": "", "category": "bad"}]"#);
        assert!(result.is_err());
        assert_eq!(app.quotes().unwrap().len(), before);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_category_filter_survives_reopen() {
        let (dir, app) = temp_app("quotevault_test_app_filter");
        app.set_category_filter(Some("life".to_string())).unwrap();

        let reopened = QuoteApp::open(&dir, SyncConfig::default());
        assert_eq!(reopened.category_filter().unwrap().as_deref(), Some("life"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
