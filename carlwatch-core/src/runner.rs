//! One watch run: fetch, persist, compare, notify, advance the baseline
//!
//! ```text
//! fetch ──► load snapshot ──► write models.json ──► diff
//!                                                    │
//!                        empty ◄─────────────────────┴──► notify ──► write previous_models.json
//! ```

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::catalog::{diff, CatalogSource, DiffResult, HttpCatalogSource, SnapshotStore};
use crate::config::{OnFetchError, Settings, TelegramCredentials};
use crate::notifier::{Notifier, NotifyReport, TelegramBackend};

/// How the fetch step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Fetched,
    /// Fetch failed and the run was abandoned
    Skipped { reason: String },
    /// Fetch failed and the run continued with an empty catalog
    TreatedAsEmpty { reason: String },
}

/// Summary of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub fetch: FetchStatus,
    /// Brands in the current catalog
    pub brands: usize,
    /// Models in the current catalog
    pub models: usize,
    pub new_models: DiffResult,
    pub notifications: NotifyReport,
    pub snapshot_updated: bool,
}

impl RunReport {
    fn skipped(reason: String) -> Self {
        Self {
            fetch: FetchStatus::Skipped { reason },
            brands: 0,
            models: 0,
            new_models: DiffResult::default(),
            notifications: NotifyReport::default(),
            snapshot_updated: false,
        }
    }

    pub fn was_skipped(&self) -> bool {
        matches!(self.fetch, FetchStatus::Skipped { .. })
    }
}

/// Sequences a single fetch/compare/notify pass
pub struct Watcher {
    source: Box<dyn CatalogSource>,
    catalog_store: SnapshotStore,
    snapshot_store: SnapshotStore,
    on_fetch_error: OnFetchError,
    dry_run: bool,
}

impl Watcher {
    pub fn new(
        source: Box<dyn CatalogSource>,
        catalog_store: SnapshotStore,
        snapshot_store: SnapshotStore,
    ) -> Self {
        Self {
            source,
            catalog_store,
            snapshot_store,
            on_fetch_error: OnFetchError::default(),
            dry_run: false,
        }
    }

    /// Build a watcher for the configured files and fetch policy
    pub fn from_settings(settings: &Settings, source: Box<dyn CatalogSource>) -> Self {
        Self::new(
            source,
            SnapshotStore::new(settings.catalog_path()),
            SnapshotStore::new(settings.snapshot_path()),
        )
        .with_on_fetch_error(settings.config.on_fetch_error)
        .with_dry_run(settings.dry_run)
    }

    pub fn with_on_fetch_error(mut self, on_fetch_error: OnFetchError) -> Self {
        self.on_fetch_error = on_fetch_error;
        self
    }

    /// In dry-run mode the snapshot baseline is never advanced
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run once
    ///
    /// `make_notifier` is only called when there is something to announce, so
    /// credentials are not needed for runs without new models. An error from it
    /// aborts the run before any message is sent and before the snapshot moves.
    pub async fn run<F>(&self, make_notifier: F) -> Result<RunReport>
    where
        F: FnOnce() -> Result<Notifier>,
    {
        let (current, fetch) = match self.source.fetch().await {
            Ok(catalog) => (catalog, FetchStatus::Fetched),
            Err(e) => {
                let reason = e.to_string();
                error!("Error fetching models from {}: {}", self.source.describe(), e);
                match self.on_fetch_error {
                    OnFetchError::Skip => {
                        warn!("Skipping this run; no files were changed");
                        return Ok(RunReport::skipped(reason));
                    }
                    OnFetchError::Empty => {
                        warn!("Continuing with an empty catalog");
                        (Default::default(), FetchStatus::TreatedAsEmpty { reason })
                    }
                }
            }
        };

        info!("Loading previous models...");
        let previous = self.snapshot_store.load()?;

        info!(
            "Saving current models to {}",
            self.catalog_store.path().display()
        );
        self.catalog_store.save(&current)?;

        info!("Comparing current models with previous models...");
        let new_models = diff(&current, &previous);

        let mut report = RunReport {
            fetch,
            brands: current.len(),
            models: current.model_count(),
            new_models: DiffResult::default(),
            notifications: NotifyReport::default(),
            snapshot_updated: false,
        };

        if new_models.is_empty() {
            info!("No new models found. Nothing to send.");
            return Ok(report);
        }

        info!(
            "{} new models found across {} brands",
            new_models.model_count(),
            new_models.len()
        );

        let notifier = make_notifier().context("Cannot send notifications")?;
        report.notifications = notifier.notify(&new_models).await;
        report.new_models = new_models;

        if self.dry_run {
            info!(
                "Dry run: leaving {} untouched",
                self.snapshot_store.path().display()
            );
        } else {
            info!("Saving current models as previous models.");
            self.snapshot_store.save(&current)?;
            report.snapshot_updated = true;
        }

        Ok(report)
    }
}

/// Run once against the Carlcare feed and Telegram, as configured
pub async fn run_once(settings: &Settings) -> Result<RunReport> {
    let http = settings.config.http_settings();
    let source = HttpCatalogSource::new(settings.config.catalog_url.clone(), &http)?;
    let watcher = Watcher::from_settings(settings, Box::new(source));

    watcher
        .run(|| {
            if settings.dry_run {
                return Ok(Notifier::dry_run());
            }
            let credentials = TelegramCredentials::from_env()?;
            let backend =
                TelegramBackend::new(credentials, &settings.config.telegram_api_base, &http)?;
            Ok(Notifier::new(Box::new(backend)))
        })
        .await
}
