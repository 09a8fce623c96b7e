use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// PartnershipStatus / Outlook – the two closed categorical columns
// ---------------------------------------------------------------------------

/// Whether the school partnership is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PartnershipStatus {
    Active,
    Ended,
}

impl PartnershipStatus {
    pub const ALL: [PartnershipStatus; 2] = [PartnershipStatus::Active, PartnershipStatus::Ended];

    /// Parse a status cell. Accepts the Portuguese labels used by the source
    /// spreadsheet as well as the English names, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ativa" | "active" => Some(PartnershipStatus::Active),
            "encerrada" | "ended" => Some(PartnershipStatus::Ended),
            _ => None,
        }
    }

    /// Label written back to exported files, in the source spreadsheet's language.
    pub fn source_label(self) -> &'static str {
        match self {
            PartnershipStatus::Active => "Ativa",
            PartnershipStatus::Ended => "Encerrada",
        }
    }
}

impl fmt::Display for PartnershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartnershipStatus::Active => write!(f, "Active"),
            PartnershipStatus::Ended => write!(f, "Ended"),
        }
    }
}

/// Sign classification of the profitability margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Outlook {
    Positive,
    Negative,
}

impl Outlook {
    pub const ALL: [Outlook; 2] = [Outlook::Positive, Outlook::Negative];

    /// Zero counts as positive; an unknown margin is never positive.
    pub fn from_margin(margin: Option<f64>) -> Self {
        match margin {
            Some(m) if m >= 0.0 => Outlook::Positive,
            _ => Outlook::Negative,
        }
    }

    pub fn source_label(self) -> &'static str {
        match self {
            Outlook::Positive => "Positiva",
            Outlook::Negative => "Negativa",
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outlook::Positive => write!(f, "Positive"),
            Outlook::Negative => write!(f, "Negative"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawRecord / Record – one row of the source table
// ---------------------------------------------------------------------------

/// A row as read from the source file, before derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub school_name: String,
    pub leader: String,
    pub status: PartnershipStatus,
    pub signing_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// Fraction as stored in the file (0.05 == 5%); `None` for blank cells.
    pub margin_ratio: Option<f64>,
}

/// A fully derived partnership record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub school_name: String,
    pub leader: String,
    pub status: PartnershipStatus,
    pub signing_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// Percentage (already multiplied by 100). Records without one are kept
    /// but left out of the margin charts.
    pub margin: Option<f64>,
    /// Whole contract years; `None` when either date is missing.
    pub duration_years: Option<i64>,
    pub outlook: Outlook,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full derived dataset with pre-computed distinct values for the filters.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All records, in file order.
    pub records: Vec<Record>,
    /// Sorted distinct leaders.
    pub leaders: BTreeSet<String>,
    /// Sorted distinct non-null contract durations.
    pub durations: BTreeSet<i64>,
}

impl Dataset {
    /// Build the distinct-value indices from derived records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let leaders = records.iter().map(|r| r.leader.clone()).collect();
        let durations = records.iter().filter_map(|r| r.duration_years).collect();
        Dataset {
            records,
            leaders,
            durations,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve row indices (as produced by the filter) to record references.
    pub fn select(&self, indices: &[usize]) -> Vec<&Record> {
        indices.iter().filter_map(|&i| self.records.get(i)).collect()
    }
}
