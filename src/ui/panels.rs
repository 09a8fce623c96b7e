use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{Outlook, PartnershipStatus};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters 🔍");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    if dataset.is_empty() {
        ui.label("The loaded file has no rows.");
    }

    // Edit a copy; the state is only touched once per frame.
    let mut selection = state.selection.clone();
    let leaders: Vec<String> = dataset.leaders.iter().cloned().collect();
    let durations: Vec<i64> = dataset.durations.iter().copied().collect();
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            multi_select(ui, "Leaders", &leaders, &mut selection.leaders, |l| l.clone());
            multi_select(
                ui,
                "Partnership status",
                &PartnershipStatus::ALL,
                &mut selection.statuses,
                ToString::to_string,
            );
            multi_select(
                ui,
                "Contract length (years)",
                &durations,
                &mut selection.durations,
                ToString::to_string,
            );
            multi_select(
                ui,
                "Profitability outlook",
                &Outlook::ALL,
                &mut selection.outlooks,
                ToString::to_string,
            );

            ui.add_space(8.0);
            let button = egui::Button::new(RichText::new("🔄 Reset filters").color(Color32::WHITE))
                .fill(state.theme.accent);
            if ui.add(button).clicked() {
                reset = true;
            }
        });

    if reset {
        state.reset_filters();
    } else {
        state.apply_selection(selection);
    }
}

/// Collapsible checkbox list over `options`, editing `selected` in place.
fn multi_select<T: Ord + Clone>(
    ui: &mut Ui,
    title: &str,
    options: &[T],
    selected: &mut BTreeSet<T>,
    label: impl Fn(&T) -> String,
) {
    let n_selected = options.iter().filter(|v| selected.contains(v)).count();
    let header_text = format!("{title}  ({n_selected}/{})", options.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    selected.extend(options.iter().cloned());
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                }
            });

            for val in options {
                let mut checked = selected.contains(val);
                if ui.checkbox(&mut checked, label(val)).changed() {
                    if checked {
                        selected.insert(val.clone());
                    } else {
                        selected.remove(val);
                    }
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
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} schools loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(state.theme.negative));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open partnership data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq", "xlsx", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "ods"])
        .pick_file();

    if let Some(path) = file {
        load_into_state(state, &path);
    }
}

/// Load `path` and install it, or surface the error in the status bar.
pub fn load_into_state(state: &mut AppState, path: &std::path::Path) {
    match crate::data::loader::load_file(path, &state.config.columns) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} records, {} leaders, durations {:?}",
                dataset.len(),
                dataset.leaders.len(),
                dataset.durations
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered data")
        .set_file_name("dados_filtrados.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let records = state.visible_records();
        let result = crate::data::export::export_csv(&path, &records, &state.config.columns);
        if let Err(e) = result {
            log::error!("Failed to export: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
