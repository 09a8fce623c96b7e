use crate::charts::DashboardSummary;
use crate::color::Theme;
use crate::config::DashboardConfig;
use crate::data::filter::{FilterSelection, filtered_indices};
use crate::data::model::{Dataset, Record};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    pub theme: Theme,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Current sidebar selections.
    pub selection: FilterSelection,

    /// Indices of records passing the current selection (cached).
    pub visible_indices: Vec<usize>,

    /// Chart summaries for `visible_indices` (cached).
    pub summary: Option<DashboardSummary>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig, theme: Theme) -> Self {
        Self {
            config,
            theme,
            dataset: None,
            selection: FilterSelection::all(&Dataset::default()),
            visible_indices: Vec::new(),
            summary: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded dataset and select everything.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selection = FilterSelection::all(&dataset);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Records currently visible, in dataset order.
    pub fn visible_records(&self) -> Vec<&Record> {
        match &self.dataset {
            Some(ds) => ds.select(&self.visible_indices),
            None => Vec::new(),
        }
    }

    /// Recompute the filtered view and the chart summaries.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.selection);
        let records = ds.select(&self.visible_indices);
        self.summary = Some(DashboardSummary::build(&records, self.config.histogram_bins));
    }

    /// Replace the selection wholesale (e.g. after the sidebar changed it).
    pub fn apply_selection(&mut self, selection: FilterSelection) {
        if selection != self.selection {
            self.selection = selection;
            self.refilter();
        }
    }

    /// Restore all four filters to "everything selected".
    pub fn reset_filters(&mut self) {
        let Some(all) = self.dataset.as_ref().map(FilterSelection::all) else {
            return;
        };
        log::info!("Resetting filters");
        self.apply_selection(all);
    }
}
