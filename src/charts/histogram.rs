use serde::Serialize;

use crate::data::model::Record;

/// Equal-width margin histogram. `edges` has one more entry than `counts`;
/// both are empty when there is nothing to bin.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin margins into `bins` equal-width bins spanning the observed range.
///
/// Bins are half-open except the last, which also holds the maximum. A
/// single distinct value is spread over `[v - 0.5, v + 0.5]`. Records
/// without a margin are not counted.
pub fn margin_histogram(records: &[&Record], bins: usize) -> Histogram {
    let margins: Vec<f64> = records.iter().filter_map(|r| r.margin).collect();
    if margins.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let (mut lo, mut hi) = margins
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &m| (lo.min(m), hi.max(m)));
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| lo + i as f64 * width).collect();
    edges.push(hi);

    let mut counts = vec![0usize; bins];
    for margin in margins {
        let bin = (((margin - lo) / width).floor() as usize).min(bins - 1);
        counts[bin] += 1;
    }

    Histogram { edges, counts }
}
