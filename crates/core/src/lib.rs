pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{Duration, NaiveDateTime};
use models::{
    diagnostic::Diagnostic, holdings::Holdings, report::Report, settings::EngineConfig,
    snapshot::PriceSnapshot,
};
use providers::registry::MarketDataRegistry;
use services::{
    market_data_service::MarketDataService,
    report_service::{ExternalInputs, ReportService},
};
use storage::snapshot_store::{append_snapshot, SnapshotStore};
use tracing::{info, warn};

use errors::CoreError;

/// Extra days of benchmark history fetched before the earliest window start,
/// so the first boundary has a price at or before it across weekends.
const BENCHMARK_MARGIN_DAYS: i64 = 7;

/// Main entry point for the Portfolio Tracker core library.
/// Holds the snapshot log, the run configuration and all services needed to
/// turn them into a report.
#[must_use]
pub struct PerformanceTracker {
    config: EngineConfig,
    store: SnapshotStore,
    snapshots: Vec<PriceSnapshot>,
    market_data: MarketDataService,
    report_service: ReportService,
    /// Rate from the most recent successful exchange-rate fetch.
    last_known_fx: Option<f64>,
    /// Problems found while loading the store, carried into the next report.
    load_diagnostics: Vec<Diagnostic>,
    /// Tracks whether any snapshot was added since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for PerformanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceTracker")
            .field("store", &self.store.path())
            .field("snapshots", &self.snapshots.len())
            .field("config", &self.config)
            .field("last_known_fx", &self.last_known_fx)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl PerformanceTracker {
    /// Create a tracker with the default market data providers.
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        Self::with_registry(config, MarketDataRegistry::new_with_defaults())
    }

    /// Create a tracker with a custom provider registry (offline runs, tests).
    pub fn with_registry(
        config: EngineConfig,
        registry: MarketDataRegistry,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let store = SnapshotStore::new(&config.store_path, config.retention_cap);
        let market_data = MarketDataService::new(registry, config.fetch_timeout());
        Ok(Self {
            config,
            store,
            snapshots: Vec::new(),
            market_data,
            report_service: ReportService::new(),
            last_known_fx: None,
            load_diagnostics: Vec::new(),
            dirty: false,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Snapshots currently held, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> &[PriceSnapshot] {
        &self.snapshots
    }

    /// Whether there are snapshots that have not been saved yet.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn last_known_fx(&self) -> Option<f64> {
        self.last_known_fx
    }

    /// Seed the last-known exchange rate, e.g. from a previous process.
    pub fn set_last_known_fx(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            self.last_known_fx = Some(rate);
        }
    }

    // ── Persistence ─────────────────────────────────────────────────

    /// Replace the in-memory log with one decoded from bytes.
    /// Returns the corruption diagnostic, if the bytes were unusable.
    pub fn load_history_from_bytes(&mut self, data: &[u8]) -> Option<&Diagnostic> {
        let loaded = SnapshotStore::load_from_bytes(data);
        self.accept_loaded(loaded.snapshots, loaded.corruption)
    }

    /// Encode the current log (sorted, capped) for writing.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = self.store.save_to_bytes(&self.snapshots)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load the log from the configured store file (native only).
    /// Returns the corruption diagnostic, if the file was unusable.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_history(&mut self) -> Option<&Diagnostic> {
        let loaded = self.store.load();
        self.accept_loaded(loaded.snapshots, loaded.corruption)
    }

    /// Read the holdings from the configured holdings file (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_holdings(&self) -> Result<Holdings, CoreError> {
        let holdings = storage::manager::StorageManager::load_holdings(&self.config.holdings_path)?;
        info!(path = %self.config.holdings_path, assets = holdings.len(), "Loaded holdings");
        Ok(holdings)
    }

    /// Atomically write the log to the configured store file (native only).
    /// Returns the number of snapshots written.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&mut self) -> Result<usize, CoreError> {
        let written = self.store.save(&self.snapshots)?;
        let excess = self.snapshots.len().saturating_sub(self.store.retention_cap());
        self.snapshots.drain(..excess);
        self.dirty = false;
        Ok(written)
    }

    // ── Snapshot Collection ─────────────────────────────────────────

    /// Append a snapshot unless one already exists for the same minute.
    pub fn record_snapshot(&mut self, snapshot: PriceSnapshot) -> bool {
        let added = append_snapshot(&mut self.snapshots, snapshot);
        self.dirty |= added;
        added
    }

    /// Sample the latest price of every held asset and record it as one
    /// snapshot stamped `now`. Returns whether a snapshot was added.
    pub async fn collect_snapshot(
        &mut self,
        holdings: &Holdings,
        now: NaiveDateTime,
    ) -> Result<bool, CoreError> {
        let symbols: Vec<String> = holdings.assets().map(str::to_string).collect();
        match self.market_data.collect_snapshot(&symbols, now).await {
            Some(snapshot) => Ok(self.record_snapshot(snapshot)),
            None => Err(CoreError::NoSnapshots),
        }
    }

    /// Seed an empty log with daily history for every held asset.
    /// Does nothing when the log already has entries. Returns the number added.
    pub async fn backfill_if_empty(
        &mut self,
        holdings: &Holdings,
        now: NaiveDateTime,
    ) -> Result<usize, CoreError> {
        if !self.snapshots.is_empty() {
            return Ok(0);
        }

        let to = now.date();
        let from = to - Duration::days(i64::from(self.config.backfill_days));
        let symbols: Vec<String> = holdings.assets().map(str::to_string).collect();

        info!(%from, %to, symbols = symbols.len(), "Snapshot log empty, backfilling history");
        let history = self.market_data.backfill_history(&symbols, from, to).await?;

        let mut added = 0;
        for snapshot in history {
            if self.record_snapshot(snapshot) {
                added += 1;
            }
        }
        Ok(added)
    }

    // ── Reporting ───────────────────────────────────────────────────

    /// Fetch benchmark history, the exchange rate and dividend rates for one run.
    /// Each input fails independently; a successful FX fetch updates the last-known rate.
    pub async fn fetch_inputs(
        &mut self,
        holdings: &Holdings,
        now: NaiveDateTime,
    ) -> Result<ExternalInputs, CoreError> {
        let earliest = self
            .report_service
            .required_history_start(now, &self.config)?;
        let from = earliest.date() - Duration::days(BENCHMARK_MARGIN_DAYS);

        let benchmark = self
            .market_data
            .fetch_benchmark(&self.config.benchmark_symbol, from, now.date())
            .await;

        let fx_rate = self
            .market_data
            .fetch_exchange_rate(&self.config.native_currency, &self.config.display_currency)
            .await;
        if let Ok(rate) = fx_rate {
            self.last_known_fx = Some(rate);
        }

        let dividend_rates = self.market_data.fetch_dividend_rates(holdings.assets()).await;

        Ok(ExternalInputs {
            benchmark,
            fx_rate,
            // Only consulted when this run's fetch failed, so it is the previous run's rate.
            last_known_fx: self.last_known_fx,
            dividend_rates,
        })
    }

    /// Fetch external inputs and build the report for the current log.
    pub async fn generate_report(
        &mut self,
        holdings: &Holdings,
        now: NaiveDateTime,
    ) -> Result<Report, CoreError> {
        let inputs = self.fetch_inputs(holdings, now).await?;
        self.generate_report_with_inputs(holdings, inputs, now)
    }

    /// Build the report from already-fetched inputs. No I/O.
    pub fn generate_report_with_inputs(
        &self,
        holdings: &Holdings,
        inputs: ExternalInputs,
        now: NaiveDateTime,
    ) -> Result<Report, CoreError> {
        let mut report = self.report_service.build_report(
            &self.snapshots,
            holdings,
            &self.config,
            inputs,
            now,
        )?;

        if !self.load_diagnostics.is_empty() {
            let mut diagnostics = self.load_diagnostics.clone();
            diagnostics.append(&mut report.diagnostics);
            report.diagnostics = diagnostics;
        }
        Ok(report)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn accept_loaded(
        &mut self,
        snapshots: Vec<PriceSnapshot>,
        corruption: Option<Diagnostic>,
    ) -> Option<&Diagnostic> {
        self.snapshots = snapshots;
        self.dirty = false;
        self.load_diagnostics.clear();
        if let Some(diagnostic) = corruption {
            warn!(path = %self.store.path().display(), "Starting from an empty snapshot log");
            self.load_diagnostics.push(diagnostic);
        }
        self.load_diagnostics.first()
    }
}
