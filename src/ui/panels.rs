use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::datasets::DatasetKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – month selector
// ---------------------------------------------------------------------------

/// Render the month multi-select shared by every tab.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    if state.available_months.is_empty() {
        ui.label("Sem meses disponíveis.");
        return;
    }

    let months = state.available_months.clone();
    let n_selected = state.selected_months.len();
    ui.strong(format!("Selecione os meses  ({n_selected}/{})", months.len()));

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Todos").clicked() {
            state.select_all_months();
        }
        if ui.small_button("Nenhum").clicked() {
            state.select_no_months();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for month in months {
                let mut checked = state.selected_months.contains(month);
                if ui.checkbox(&mut checked, month).changed() {
                    state.toggle_month(month);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Dados", |ui: &mut Ui| {
            if ui.button("Abrir pasta…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let loaded = state.data.loaded().count();
        let rows: usize = state.data.loaded().map(|(_, t)| t.len()).sum();
        ui.label(format!(
            "{loaded}/{} extratos carregados, {rows} linhas ({})",
            DatasetKind::ALL.len(),
            state.config.data_dir.display()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Folder dialog
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Abrir pasta de extratos")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(path) = folder {
        log::info!("Reloading extracts from {}", path.display());
        state.reload_from(path);
    }
}
