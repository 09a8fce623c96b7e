use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot, PlotPoint, Text};

use crate::charts::{BarTone, Histogram, LeaderMarginBar, SchoolBar, StackedBarChart};
use crate::color::Theme;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the five charts in a 2/2/1 grid.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };
    let theme = &state.theme;

    ui.heading("🎯 Strategic Dashboard");
    if summary.records == 0 {
        ui.label(RichText::new("No schools match the current filters.").italics());
    }
    ui.add_space(4.0);

    ui.columns(2, |cols| {
        chart_frame(&mut cols[0], "📊 Schools per leader (status)", |ui| {
            stacked_chart(ui, "leader_status", &summary.leader_status, "Schools", theme);
        });
        chart_frame(&mut cols[1], "📈 Schools per contract length and outlook", |ui| {
            stacked_chart(ui, "duration_outlook", &summary.duration_outlook, "Schools", theme);
        });
    });

    ui.columns(2, |cols| {
        chart_frame(&mut cols[0], "📉 Average margin per leader", |ui| {
            leader_margin_chart(ui, &summary.leader_margins, theme);
        });
        chart_frame(&mut cols[1], "📈 Profitability margin distribution", |ui| {
            histogram_chart(ui, &summary.margin_histogram, theme);
        });
    });

    chart_frame(ui, "🏆 Schools by profitability", |ui| {
        school_ranking_chart(ui, &summary.school_ranking, theme);
    });
}

fn chart_frame(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.group(|ui: &mut Ui| {
        ui.strong(title);
        add_contents(ui);
    });
}

/// Tick label for categorical axes: the category whose index is `mark`.
fn category_tick(categories: &[String], mark: GridMark) -> String {
    let idx = mark.value.round();
    if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn stacked_chart(ui: &mut Ui, id: &str, chart: &StackedBarChart, y_label: &str, theme: &Theme) {
    let categories = chart.categories.clone();
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| category_tick(&categories, mark))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut base = vec![0.0; chart.categories.len()];
            for series in &chart.series {
                let color = theme.color_for(series.tone);
                let bars: Vec<Bar> = series
                    .counts
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| {
                        Bar::new(i as f64, count as f64)
                            .base_offset(base[i])
                            .width(0.6)
                            .name(format!("{}: {count} ({})", chart.categories[i], series.labels[i]))
                            .fill(color)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(color));

                for (i, &count) in series.counts.iter().enumerate() {
                    if count > 0 && !series.labels[i].is_empty() {
                        let mid = base[i] + count as f64 / 2.0;
                        plot_ui.text(
                            Text::new(PlotPoint::new(i as f64, mid), RichText::new(&series.labels[i]).strong())
                                .color(Color32::WHITE),
                        );
                    }
                    base[i] += count as f64;
                }
            }
        });
}

fn leader_margin_chart(ui: &mut Ui, bars: &[LeaderMarginBar], theme: &Theme) {
    let leaders: Vec<String> = bars.iter().map(|b| b.leader.clone()).collect();
    Plot::new("leader_margin")
        .height(CHART_HEIGHT)
        .y_axis_label("Average margin (%)")
        .x_axis_formatter(move |mark, _range| category_tick(&leaders, mark))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let plot_bars: Vec<Bar> = bars
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    Bar::new(i as f64, b.mean)
                        .width(0.6)
                        .name(format!("{}: {}", b.leader, b.label))
                        .fill(theme.color_for(b.tone))
                        .stroke(egui::Stroke::new(1.0, theme.highlight(b.tone)))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(plot_bars));

            for (i, b) in bars.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, b.mean / 2.0), RichText::new(&b.label).strong())
                        .color(Color32::WHITE),
                );
            }
        });
}

fn histogram_chart(ui: &mut Ui, hist: &Histogram, theme: &Theme) {
    let width = hist.bin_width();
    Plot::new("margin_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label(format!("Profitability margin (%), {} schools", hist.total()))
        .y_axis_label("Schools")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let bars: Vec<Bar> = hist
                .counts
                .iter()
                .zip(&hist.edges)
                .map(|(&count, &left)| {
                    Bar::new(left + width / 2.0, count as f64)
                        .width(width)
                        .name(format!("{left:.1}% – {:.1}%: {count}", left + width))
                        .fill(theme.color_for(BarTone::Accent))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(theme.accent));
        });
}

fn school_ranking_chart(ui: &mut Ui, bars: &[SchoolBar], theme: &Theme) {
    let schools: Vec<String> = bars.iter().map(|b| b.school.clone()).collect();
    Plot::new("school_ranking")
        .height(CHART_HEIGHT.max(18.0 * bars.len() as f32))
        .x_axis_label("Profitability margin (%)")
        .y_axis_formatter(move |mark, _range| category_tick(&schools, mark))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let plot_bars: Vec<Bar> = bars
                .iter()
                .enumerate()
                .map(|(i, b)| {
                    Bar::new(i as f64, b.margin)
                        .width(0.7)
                        .name(format!("{}: {:.2}%", b.school, b.margin))
                        .fill(theme.color_for(b.tone))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(plot_bars).horizontal());
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::DashboardSummary;

    fn mark(value: f64) -> GridMark {
        GridMark { value, step_size: 1.0 }
    }

    #[test]
    fn category_ticks_only_on_whole_indices() {
        let cats = vec!["Ana".to_string(), "Bia".to_string()];
        assert_eq!(category_tick(&cats, mark(1.0)), "Bia");
        assert_eq!(category_tick(&cats, mark(0.5)), "");
        assert_eq!(category_tick(&cats, mark(2.0)), "");
        assert_eq!(category_tick(&cats, mark(-1.0)), "");
    }

    #[test]
    fn empty_summary_is_drawable_data() {
        // The charts iterate over these; all must be empty, not absent.
        let summary = DashboardSummary::build(&[], 20);
        assert!(summary.leader_status.series.is_empty());
        assert!(summary.margin_histogram.edges.is_empty());
    }
}
