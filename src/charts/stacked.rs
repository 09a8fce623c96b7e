use std::collections::BTreeMap;

use serde::Serialize;

use super::{BarTone, percent_label};
use crate::data::model::{Outlook, PartnershipStatus, Record};

// ---------------------------------------------------------------------------
// Stacked bar chart summary
// ---------------------------------------------------------------------------

/// One stacked layer; `counts` and `labels` are parallel to the categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSeries {
    pub name: String,
    pub tone: BarTone,
    pub counts: Vec<usize>,
    pub labels: Vec<String>,
}

/// Category counts pivoted into series, bottom series first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StackedBarChart {
    pub categories: Vec<String>,
    pub totals: Vec<usize>,
    pub series: Vec<StackSeries>,
}

impl StackedBarChart {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Pivot `(category, series)` pairs into a stacked chart.
///
/// `layers` fixes the drawing order; a layer with no observations is left
/// out. Categories come out in `K`'s natural order.
fn pivot<K, S>(
    pairs: impl Iterator<Item = (K, S)>,
    layers: &[(S, &str, BarTone)],
    category_label: impl Fn(&K) -> String,
) -> StackedBarChart
where
    K: Ord,
    S: Copy + PartialEq,
{
    let mut counts: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    let mut seen = vec![false; layers.len()];
    for (key, s) in pairs {
        let Some(layer) = layers.iter().position(|(candidate, _, _)| *candidate == s) else {
            continue;
        };
        counts.entry(key).or_insert_with(|| vec![0; layers.len()])[layer] += 1;
        seen[layer] = true;
    }

    let categories = counts.keys().map(&category_label).collect();
    let totals: Vec<usize> = counts.values().map(|row| row.iter().sum()).collect();
    let series = layers
        .iter()
        .enumerate()
        .filter(|(layer, _)| seen[*layer])
        .map(|(layer, (_, name, tone))| {
            let column: Vec<usize> = counts.values().map(|row| row[layer]).collect();
            StackSeries {
                name: name.to_string(),
                tone: *tone,
                labels: column
                    .iter()
                    .zip(&totals)
                    .map(|(&count, &total)| percent_label(count, total))
                    .collect(),
                counts: column,
            }
        })
        .collect();

    StackedBarChart {
        categories,
        totals,
        series,
    }
}

/// Reorder categories (and every parallel column) by total, largest first.
/// Ties keep their existing order.
fn sort_by_total_desc(chart: &mut StackedBarChart) {
    let mut order: Vec<usize> = (0..chart.categories.len()).collect();
    order.sort_by(|&a, &b| chart.totals[b].cmp(&chart.totals[a]));

    chart.categories = order.iter().map(|&i| chart.categories[i].clone()).collect();
    chart.totals = order.iter().map(|&i| chart.totals[i]).collect();
    for series in &mut chart.series {
        series.counts = order.iter().map(|&i| series.counts[i]).collect();
        series.labels = order.iter().map(|&i| series.labels[i].clone()).collect();
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Schools per leader, stacked by partnership status (Ended at the bottom).
/// Leaders are ordered by total schools, descending.
pub fn leader_status_chart(records: &[&Record]) -> StackedBarChart {
    let layers = [
        (PartnershipStatus::Ended, "Ended", BarTone::Negative),
        (PartnershipStatus::Active, "Active", BarTone::Positive),
    ];
    let mut chart = pivot(
        records.iter().map(|r| (r.leader.clone(), r.status)),
        &layers,
        |leader| leader.clone(),
    );
    sort_by_total_desc(&mut chart);
    chart
}

/// Schools per contract length in years, stacked by outlook (Negative at the
/// bottom). Records without a contract length are not counted.
pub fn duration_outlook_chart(records: &[&Record]) -> StackedBarChart {
    let layers = [
        (Outlook::Negative, "Negative outlook", BarTone::Negative),
        (Outlook::Positive, "Positive outlook", BarTone::Positive),
    ];
    pivot(
        records
            .iter()
            .filter_map(|r| r.duration_years.map(|years| (years, r.outlook))),
        &layers,
        |years| years.to_string(),
    )
}
