use std::collections::{BTreeMap, BTreeSet};

use crate::config::AppConfig;
use crate::data::filter::{self, LocalitySelection};
use crate::data::{DataError, DatasetKey, LabeledTable, Registry};

pub type Datasets = BTreeMap<DatasetKey, LabeledTable>;

// ---------------------------------------------------------------------------
// UI choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    TimeSeries,
    BarRanking,
    Heatmap,
    PctChange,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::TimeSeries,
        ChartKind::BarRanking,
        ChartKind::Heatmap,
        ChartKind::PctChange,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::TimeSeries => "Time series",
            ChartKind::BarRanking => "Ranking (bars)",
            ChartKind::Heatmap => "Heatmap",
            ChartKind::PctChange => "Percentage change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalityMode {
    All,
    TopN,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Dataset cache
// ---------------------------------------------------------------------------

/// Lazily populated snapshot of every dataset that could be loaded.
///
/// Filled on first access and kept until [`DatasetCache::invalidate`]; a
/// failed load is remembered as an empty snapshot so it is not retried on
/// every frame.
#[derive(Debug, Default)]
pub struct DatasetCache {
    snapshot: Option<Datasets>,
}

impl DatasetCache {
    pub fn get_or_load(&mut self, registry: &Registry) -> Result<&Datasets, DataError> {
        if self.snapshot.is_none() {
            match registry.load_all() {
                Ok(datasets) => self.snapshot = Some(datasets),
                Err(e) => {
                    self.snapshot = Some(BTreeMap::new());
                    return Err(e);
                }
            }
        }
        Ok(self.snapshot.get_or_insert_with(BTreeMap::new))
    }

    pub fn get(&self) -> Option<&Datasets> {
        self.snapshot.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn invalidate(&mut self) {
        self.snapshot = None;
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,
    pub registry: Registry,
    cache: DatasetCache,

    /// Dataset shown in the central panel.
    pub selected: Option<DatasetKey>,

    pub locality_mode: LocalityMode,
    /// N of the "Top N" mode.
    pub top_n: usize,
    /// Localities ticked in manual mode.
    pub manual: BTreeSet<String>,

    pub chart: ChartKind,
    /// Period shown by the ranking chart.
    pub ranking_period: Option<String>,

    /// Status / error message shown in the top bar.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            registry: Registry::new(config.data_dir.clone()),
            top_n: config.default_top_n,
            config,
            cache: DatasetCache::default(),
            selected: None,
            locality_mode: LocalityMode::All,
            manual: BTreeSet::new(),
            chart: ChartKind::TimeSeries,
            ranking_period: None,
            status: None,
        }
    }

    /// Populate the dataset cache if needed and keep the selection valid.
    pub fn ensure_loaded(&mut self) {
        if self.cache.is_loaded() {
            return;
        }
        match self.cache.get_or_load(&self.registry) {
            Ok(datasets) => {
                log::info!("{} datasets available", datasets.len());
                self.status = None;
            }
            Err(e) => {
                let message = describe(&e);
                log::error!("Failed to load datasets: {message}");
                self.status = Some(Status::Error(format!("Error: {message}")));
            }
        }

        let keys: Vec<DatasetKey> = self
            .datasets()
            .map(|d| d.keys().copied().collect())
            .unwrap_or_default();
        match self.selected.filter(|k| keys.contains(k)).or(keys.first().copied()) {
            Some(key) => self.select_dataset(key),
            None => self.selected = None,
        }
    }

    /// Drop the cached snapshot and read the files again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.ensure_loaded();
    }

    pub fn datasets(&self) -> Option<&Datasets> {
        self.cache.get()
    }

    pub fn current(&self) -> Option<&LabeledTable> {
        let key = self.selected?;
        self.datasets()?.get(&key)
    }

    pub fn availability(&self) -> BTreeMap<DatasetKey, bool> {
        self.registry.check_availability()
    }

    /// Heading of the view shown while no dataset is loaded. A failed load
    /// means the files are present but unreadable.
    pub fn unavailable_heading(&self) -> &'static str {
        match self.status {
            Some(Status::Error(_)) => "Data files could not be read",
            _ => "Data files not found",
        }
    }

    /// Switch dataset and reset the selections that depend on it.
    pub fn select_dataset(&mut self, key: DatasetKey) {
        self.selected = Some(key);
        let Some(dataset) = self.current() else {
            return;
        };
        let manual = filter::first_localities(&dataset.table, self.config.manual_default);
        let last = dataset.table.last_period().map(str::to_string);
        let total = dataset.table.entities().len();

        self.manual = manual;
        self.ranking_period = last;
        self.top_n = self.config.default_top_n.min(total).max(1);
    }

    pub fn set_locality_mode(&mut self, mode: LocalityMode) {
        self.locality_mode = mode;
    }

    /// Tick or untick one locality of the manual selection.
    pub fn toggle_locality(&mut self, name: &str) {
        if !self.manual.remove(name) {
            self.manual.insert(name.to_string());
        }
    }

    pub fn select_all(&mut self) {
        if let Some(dataset) = self.current() {
            self.manual = dataset.table.entities().iter().cloned().collect();
        }
    }

    pub fn select_none(&mut self) {
        self.manual.clear();
    }

    pub fn selection(&self) -> LocalitySelection {
        match self.locality_mode {
            LocalityMode::All => LocalitySelection::All,
            LocalityMode::TopN => LocalitySelection::TopN(self.top_n),
            LocalityMode::Manual => LocalitySelection::Manual(self.manual.clone()),
        }
    }

    /// Localities of the current dataset passing the side-panel filter.
    pub fn selected_localities(&self) -> Result<Vec<String>, DataError> {
        match self.current() {
            Some(dataset) => filter::resolve(&dataset.table, &self.selection()),
            None => Ok(Vec::new()),
        }
    }
}

/// Error message including its sources.
pub fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
