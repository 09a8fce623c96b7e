use std::collections::BTreeMap;

use serde::Serialize;

use super::BarTone;
use crate::data::model::Record;

/// Mean profitability margin of one leader's schools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderMarginBar {
    pub leader: String,
    pub mean: f64,
    pub tone: BarTone,
    /// Two decimals with a percent sign, e.g. `"-3.25%"`.
    pub label: String,
}

/// One school's margin, as drawn in the ranking chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolBar {
    pub school: String,
    pub margin: f64,
    pub tone: BarTone,
}

/// Average margin per leader, highest first. Records without a margin are
/// skipped; a leader with none at all gets no bar.
pub fn average_margin_by_leader(records: &[&Record]) -> Vec<LeaderMarginBar> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for rec in records {
        let Some(margin) = rec.margin else { continue };
        let entry = sums.entry(rec.leader.as_str()).or_insert((0.0, 0));
        entry.0 += margin;
        entry.1 += 1;
    }

    let mut bars: Vec<LeaderMarginBar> = sums
        .into_iter()
        .map(|(leader, (sum, n))| {
            let mean = sum / n as f64;
            LeaderMarginBar {
                leader: leader.to_string(),
                mean,
                tone: BarTone::for_value(mean),
                label: format!("{mean:.2}%"),
            }
        })
        .collect();
    bars.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    bars
}

/// Every school's margin, lowest first. Duplicate school names stay as
/// separate bars; schools without a margin are left out.
pub fn school_ranking(records: &[&Record]) -> Vec<SchoolBar> {
    let mut bars: Vec<SchoolBar> = records
        .iter()
        .filter_map(|rec| {
            let margin = rec.margin?;
            Some(SchoolBar {
                school: rec.school_name.clone(),
                margin,
                tone: BarTone::for_value(margin),
            })
        })
        .collect();
    bars.sort_by(|a, b| a.margin.total_cmp(&b.margin));
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::test_support::record;
    use crate::data::model::PartnershipStatus::{Active, Ended};

    #[test]
    fn leader_means_sorted_descending_with_sign_tones() {
        let rows = [
            record("A", "Ana", Active, 10.0, Some(3)),
            record("B", "Ana", Ended, -4.0, Some(3)),
            record("C", "Bia", Active, -2.5, Some(3)),
            record("D", "Caio", Active, 0.0, None),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let bars = average_margin_by_leader(&refs);

        let leaders: Vec<&str> = bars.iter().map(|b| b.leader.as_str()).collect();
        assert_eq!(leaders, vec!["Ana", "Caio", "Bia"]);
        assert!((bars[0].mean - 3.0).abs() < 1e-9);
        assert_eq!(bars[0].label, "3.00%");
        assert_eq!(bars[1].tone, BarTone::Positive);
        assert_eq!(bars[2].tone, BarTone::Negative);
        assert_eq!(bars[2].label, "-2.50%");
        for bar in &bars {
            assert_eq!(bar.tone == BarTone::Negative, bar.mean < 0.0);
        }
    }

    #[test]
    fn ranking_has_one_bar_per_record_ascending() {
        let rows = [
            record("Escola Azul", "Ana", Active, 7.0, Some(3)),
            record("Escola Azul", "Bia", Active, -1.0, Some(3)),
            record("Escola Sol", "Ana", Ended, 2.0, Some(3)),
        ];
        let refs: Vec<&Record> = rows.iter().collect();
        let bars = school_ranking(&refs);

        assert_eq!(bars.len(), 3);
        assert!(bars.windows(2).all(|w| w[0].margin <= w[1].margin));
        assert_eq!(bars[0].school, "Escola Azul");
        assert_eq!(bars[0].tone, BarTone::Negative);
        assert_eq!(bars[2].tone, BarTone::Positive);
    }

    #[test]
    fn blank_margins_are_skipped() {
        let blank = |school: &str, leader: &str| Record {
            margin: None,
            ..record(school, leader, Active, 0.0, Some(3))
        };
        let rows = [
            record("A", "Ana", Active, 4.0, Some(3)),
            blank("B", "Ana"),
            blank("C", "Bia"),
        ];
        let refs: Vec<&Record> = rows.iter().collect();

        let means = average_margin_by_leader(&refs);
        assert_eq!(means.len(), 1);
        assert_eq!(means[0].leader, "Ana");
        assert!((means[0].mean - 4.0).abs() < 1e-9);

        let ranking = school_ranking(&refs);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].school, "A");
    }

    #[test]
    fn empty_input_has_no_bars() {
        assert!(average_margin_by_leader(&[]).is_empty());
        assert!(school_ranking(&[]).is_empty());
    }
}
