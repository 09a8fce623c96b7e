use chrono::NaiveDate;

use super::model::{Dataset, Outlook, RawRecord, Record};

/// Average number of days in a calendar year, leap years included.
const DAYS_PER_YEAR: f64 = 365.25;

/// Contract length in whole years.
///
/// The day difference is divided by 365.25 and rounded half-to-even, so a
/// contract of exactly 2.5 years rounds to 2 and 3.5 years rounds to 4.
/// An expiration before the signing date yields a negative length.
pub fn contract_duration_years(
    signing: Option<NaiveDate>,
    expiration: Option<NaiveDate>,
) -> Option<i64> {
    let days = (expiration? - signing?).num_days() as f64;
    Some((days / DAYS_PER_YEAR).round_ties_even() as i64)
}

/// Compute the derived columns of a single row.
pub fn derive_record(raw: RawRecord) -> Record {
    let margin = raw.margin_ratio.map(|ratio| ratio * 100.0);
    Record {
        duration_years: contract_duration_years(raw.signing_date, raw.expiration_date),
        outlook: Outlook::from_margin(margin),
        margin,
        school_name: raw.school_name,
        leader: raw.leader,
        status: raw.status,
        signing_date: raw.signing_date,
        expiration_date: raw.expiration_date,
    }
}

/// Derive every row and index the resulting dataset.
pub fn derive_dataset(rows: Vec<RawRecord>) -> Dataset {
    Dataset::from_records(rows.into_iter().map(derive_record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PartnershipStatus;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn raw(margin_ratio: Option<f64>, signing: Option<NaiveDate>, expiration: Option<NaiveDate>) -> RawRecord {
        RawRecord {
            school_name: "Escola Azul".to_string(),
            leader: "Ana".to_string(),
            status: PartnershipStatus::Active,
            signing_date: signing,
            expiration_date: expiration,
            margin_ratio,
        }
    }

    #[test]
    fn duration_rounds_to_whole_years() {
        assert_eq!(contract_duration_years(date(2020, 1, 1), date(2023, 1, 1)), Some(3));
        // 400 days ~ 1.095 years
        assert_eq!(contract_duration_years(date(2020, 1, 1), date(2021, 2, 4)), Some(1));
        // 700 days ~ 1.916 years
        assert_eq!(contract_duration_years(date(2020, 1, 1), date(2021, 12, 1)), Some(2));
    }

    #[test]
    fn duration_half_rounds_to_even() {
        // 913.125 days is exactly 2.5 years; whole days can't hit it, so test
        // the rounding rule directly on the division result.
        assert_eq!((2.5f64).round_ties_even(), 2.0);
        assert_eq!((3.5f64).round_ties_even(), 4.0);
    }

    #[test]
    fn duration_is_null_without_both_dates() {
        assert_eq!(contract_duration_years(None, date(2023, 1, 1)), None);
        assert_eq!(contract_duration_years(date(2020, 1, 1), None), None);
        assert_eq!(contract_duration_years(None, None), None);
    }

    #[test]
    fn inverted_dates_give_negative_duration() {
        assert_eq!(contract_duration_years(date(2023, 1, 1), date(2020, 1, 1)), Some(-3));
    }

    #[test]
    fn margin_is_rescaled_to_percent() {
        let rec = derive_record(raw(Some(0.05), None, None));
        assert!((rec.margin.unwrap() - 5.0).abs() < 1e-9);
        assert_eq!(rec.outlook, Outlook::Positive);
        assert_eq!(rec.duration_years, None);

        let rec = derive_record(raw(Some(-0.125), None, None));
        assert!((rec.margin.unwrap() + 12.5).abs() < 1e-9);
        assert_eq!(rec.outlook, Outlook::Negative);
    }

    #[test]
    fn blank_margin_stays_blank_and_negative() {
        let rec = derive_record(raw(None, date(2020, 1, 1), date(2023, 1, 1)));
        assert_eq!(rec.margin, None);
        assert_eq!(rec.outlook, Outlook::Negative);
        assert_eq!(rec.duration_years, Some(3));
    }

    #[test]
    fn dataset_indexes_non_null_durations() {
        let ds = derive_dataset(vec![
            raw(Some(0.1), date(2020, 1, 1), date(2023, 1, 1)),
            raw(Some(0.1), None, date(2023, 1, 1)),
            raw(Some(0.1), date(2020, 1, 1), date(2025, 1, 1)),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.durations.iter().copied().collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(ds.leaders.len(), 1);
    }
}
