//! Chart builders: pure functions from the filtered records to the summary
//! behind each dashboard chart. None of them panic on an empty view.

pub mod histogram;
pub mod margin;
pub mod stacked;

use serde::Serialize;

use crate::data::model::Record;

pub use histogram::{Histogram, margin_histogram};
pub use margin::{LeaderMarginBar, SchoolBar, average_margin_by_leader, school_ranking};
pub use stacked::{StackedBarChart, duration_outlook_chart, leader_status_chart};

/// Semantic bar colour; resolved to a real colour by the UI theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BarTone {
    Positive,
    Negative,
    Accent,
}

impl BarTone {
    /// Zero is positive.
    pub fn for_value(value: f64) -> Self {
        if value < 0.0 {
            BarTone::Negative
        } else {
            BarTone::Positive
        }
    }
}

/// Share of `count` in `total` as a whole percentage, e.g. `"67%"`.
/// Empty when the total is zero.
pub fn percent_label(count: usize, total: usize) -> String {
    if total == 0 {
        return String::new();
    }
    format!("{:.0}%", count as f64 / total as f64 * 100.0)
}

/// All five chart summaries for one filtered view.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub records: usize,
    pub leader_status: StackedBarChart,
    pub duration_outlook: StackedBarChart,
    pub leader_margins: Vec<LeaderMarginBar>,
    pub margin_histogram: Histogram,
    pub school_ranking: Vec<SchoolBar>,
}

impl DashboardSummary {
    pub fn build(records: &[&Record], histogram_bins: usize) -> Self {
        DashboardSummary {
            records: records.len(),
            leader_status: leader_status_chart(records),
            duration_outlook: duration_outlook_chart(records),
            leader_margins: average_margin_by_leader(records),
            margin_histogram: margin_histogram(records, histogram_bins),
            school_ranking: school_ranking(records),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::data::derive::derive_record;
    use crate::data::model::{PartnershipStatus, RawRecord, Record};

    /// A derived record with the given contract length in whole years.
    pub fn record(school: &str, leader: &str, status: PartnershipStatus, margin_pct: f64, years: Option<i32>) -> Record {
        derive_record(RawRecord {
            school_name: school.to_string(),
            leader: leader.to_string(),
            status,
            signing_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            expiration_date: years.and_then(|y| NaiveDate::from_ymd_opt(2020 + y, 1, 1)),
            margin_ratio: Some(margin_pct / 100.0),
        })
    }
}
