use std::collections::BTreeSet;

use super::model::{Dataset, Outlook, PartnershipStatus, Record};

// ---------------------------------------------------------------------------
// Filter selection: which values are selected per dimension
// ---------------------------------------------------------------------------

/// Snapshot of the four sidebar multi-selects.
///
/// An empty set selects nothing, so every record is filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub leaders: BTreeSet<String>,
    pub statuses: BTreeSet<PartnershipStatus>,
    pub durations: BTreeSet<i64>,
    pub outlooks: BTreeSet<Outlook>,
}

impl FilterSelection {
    /// Every observed value selected (i.e., show everything).
    pub fn all(dataset: &Dataset) -> Self {
        FilterSelection {
            leaders: dataset.leaders.clone(),
            statuses: PartnershipStatus::ALL.into_iter().collect(),
            durations: dataset.durations.clone(),
            outlooks: Outlook::ALL.into_iter().collect(),
        }
    }

    /// Whether the duration selection still covers every observed duration.
    /// Records without a duration only pass while this holds.
    pub fn all_durations_selected(&self, dataset: &Dataset) -> bool {
        dataset.durations.is_subset(&self.durations)
    }

    fn matches(&self, record: &Record, include_unknown_duration: bool) -> bool {
        let duration_ok = match record.duration_years {
            Some(years) => self.durations.contains(&years),
            None => include_unknown_duration,
        };
        duration_ok
            && self.leaders.contains(&record.leader)
            && self.statuses.contains(&record.status)
            && self.outlooks.contains(&record.outlook)
    }
}

/// Return indices of records that pass all four predicates, in dataset order.
pub fn filtered_indices(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    let include_unknown_duration = selection.all_durations_selected(dataset);
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec, include_unknown_duration))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::derive_dataset;
    use crate::data::model::RawRecord;
    use chrono::NaiveDate;

    fn row(school: &str, leader: &str, status: PartnershipStatus, margin: f64, years: Option<i32>) -> RawRecord {
        let signing = NaiveDate::from_ymd_opt(2020, 1, 1);
        RawRecord {
            school_name: school.to_string(),
            leader: leader.to_string(),
            status,
            signing_date: signing,
            expiration_date: years.and_then(|y| NaiveDate::from_ymd_opt(2020 + y, 1, 1)),
            margin_ratio: Some(margin),
        }
    }

    fn sample() -> Dataset {
        derive_dataset(vec![
            row("A", "X", PartnershipStatus::Active, 0.10, Some(3)),
            row("B", "X", PartnershipStatus::Ended, -0.05, Some(3)),
            row("C", "Y", PartnershipStatus::Active, 0.02, Some(5)),
            row("D", "Z", PartnershipStatus::Ended, 0.0, None),
        ])
    }

    #[test]
    fn all_selection_keeps_everything() {
        let ds = sample();
        let sel = FilterSelection::all(&ds);
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1, 2, 3]);
    }

    #[test]
    fn status_filter_selects_active_only() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        sel.statuses = [PartnershipStatus::Active].into_iter().collect();
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 2]);
    }

    #[test]
    fn narrowing_durations_drops_unknown_durations() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        sel.durations.remove(&5);
        assert_eq!(filtered_indices(&ds, &sel), vec![0, 1]);
    }

    #[test]
    fn every_passing_record_satisfies_all_predicates() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        sel.leaders.remove("Y");
        sel.outlooks = [Outlook::Positive].into_iter().collect();
        let idx = filtered_indices(&ds, &sel);
        assert_eq!(idx, vec![0, 3]);
        for rec in ds.select(&idx) {
            assert!(sel.leaders.contains(&rec.leader));
            assert!(sel.statuses.contains(&rec.status));
            assert!(sel.outlooks.contains(&rec.outlook));
            assert!(rec.duration_years.map_or(true, |d| sel.durations.contains(&d)));
        }
    }

    #[test]
    fn empty_set_hides_everything() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        sel.leaders.clear();
        assert!(filtered_indices(&ds, &sel).is_empty());
    }

    #[test]
    fn reset_restores_full_view() {
        let ds = sample();
        let mut sel = FilterSelection::all(&ds);
        sel.statuses.clear();
        assert!(filtered_indices(&ds, &sel).is_empty());
        sel = FilterSelection::all(&ds);
        assert_eq!(filtered_indices(&ds, &sel).len(), ds.len());
    }
}
