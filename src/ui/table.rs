use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Collapsible table of the records behind the charts.
pub fn filtered_table(ui: &mut Ui, state: &AppState) {
    let records = state.visible_records();
    if state.dataset.is_none() {
        return;
    }

    egui::CollapsingHeader::new(format!("📥 Filtered records ({})", records.len()))
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(300.0)
                .column(Column::auto().at_least(160.0))
                .columns(Column::auto(), 6)
                .header(20.0, |mut header| {
                    for title in ["School", "Leader", "Status", "Signed", "Expires", "Margin (%)", "Years"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, records.len(), |mut row| {
                        let rec = records[row.index()];
                        let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
                        let cells = [
                            rec.school_name.clone(),
                            rec.leader.clone(),
                            rec.status.to_string(),
                            date(rec.signing_date),
                            date(rec.expiration_date),
                            rec.margin.map(|m| format!("{m:.2}")).unwrap_or_default(),
                            rec.duration_years.map(|y| y.to_string()).unwrap_or_default(),
                        ];
                        for text in cells {
                            row.col(|ui| {
                                ui.label(text);
                            });
                        }
                    });
                });
        });
}
