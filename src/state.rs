use std::path::PathBuf;

use crate::config::DashboardConfig;
use crate::data::dashboard::DashboardData;
use crate::data::filter::{select_all, MonthSelection};
use crate::report::ReportView;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Triage,
    EmergencyType,
    Consultations,
    Surgeries,
    Mortality,
    Births,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Triage,
        Tab::EmergencyType,
        Tab::Consultations,
        Tab::Surgeries,
        Tab::Mortality,
        Tab::Births,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Triage => "Triagem Manchester",
            Tab::EmergencyType => "Tipos de Urgência",
            Tab::Consultations => "Consultas Médicas",
            Tab::Surgeries => "Intervenções Cirúrgicas",
            Tab::Mortality => "Morbilidade e Mortalidade",
            Tab::Births => "Partos e Nascimentos",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Prepared extracts; replaced only when a data folder is (re)loaded.
    pub data: DashboardData,

    /// Months offered by the month selector, in display order.
    pub available_months: Vec<&'static str>,

    /// Months shared by every tab.
    pub selected_months: MonthSelection,

    /// Diagnosis shown in the mortality breakdown.
    pub selected_diagnosis: Option<String>,

    /// Chart data for the current selection (cached).
    pub view: ReportView,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load every extract named by `config`.
    pub fn new(config: DashboardConfig) -> Self {
        let data = DashboardData::load(&config);
        Self::with_data(config, data)
    }

    pub fn with_data(config: DashboardConfig, data: DashboardData) -> Self {
        let mut state = AppState {
            config,
            data: DashboardData::default(),
            available_months: Vec::new(),
            selected_months: MonthSelection::new(),
            selected_diagnosis: None,
            view: ReportView::build(&DashboardData::default(), &MonthSelection::new(), None),
            active_tab: Tab::default(),
            status_message: None,
        };
        state.set_data(data);
        state
    }

    /// Install freshly loaded extracts and select every available month.
    pub fn set_data(&mut self, data: DashboardData) {
        self.available_months = data.available_months();
        self.selected_months = select_all(&self.available_months);

        let failed: Vec<String> = data.failures().map(|(kind, _)| kind.to_string()).collect();
        self.status_message = if failed.is_empty() {
            None
        } else {
            Some(format!("Erro ao carregar: {}", failed.join(", ")))
        };

        self.data = data;
        self.refresh();
    }

    /// Re-read every extract from another folder.
    pub fn reload_from(&mut self, dir: PathBuf) {
        self.config.data_dir = dir;
        let data = DashboardData::load(&self.config);
        self.set_data(data);
    }

    /// Recompute the chart data after a selection change.
    pub fn refresh(&mut self) {
        self.view = ReportView::build(
            &self.data,
            &self.selected_months,
            self.selected_diagnosis.as_deref(),
        );
        self.selected_diagnosis = self.view.selected_diagnosis().map(str::to_string);
    }

    /// Toggle a single month in the shared selection.
    pub fn toggle_month(&mut self, month: &'static str) {
        if !self.selected_months.remove(month) {
            self.selected_months.insert(month);
        }
        self.refresh();
    }

    pub fn select_all_months(&mut self) {
        self.selected_months = select_all(&self.available_months);
        self.refresh();
    }

    pub fn select_no_months(&mut self) {
        self.selected_months.clear();
        self.refresh();
    }

    pub fn select_diagnosis(&mut self, diagnosis: String) {
        self.selected_diagnosis = Some(diagnosis);
        self.refresh();
    }
}
