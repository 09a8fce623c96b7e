use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Record;
use crate::config::ColumnNames;

/// Header of the derived contract-length column.
pub const DURATION_HEADER: &str = "Tempo de Contrato";
/// Header of the derived outlook column.
pub const OUTLOOK_HEADER: &str = "Previsão de Rentabilidade";

/// Write records as CSV: source columns first, then the two derived ones.
/// Margins are written as percentages, missing values as empty fields, and
/// category values in the same Portuguese labels the source file uses.
pub fn write_csv<W: Write>(writer: W, records: &[&Record], columns: &ColumnNames) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = columns.required().to_vec();
    header.push(DURATION_HEADER);
    header.push(OUTLOOK_HEADER);
    wtr.write_record(&header).context("writing CSV header")?;

    for rec in records {
        let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        wtr.write_record([
            rec.school_name.clone(),
            rec.leader.clone(),
            rec.status.source_label().to_string(),
            date(rec.signing_date),
            date(rec.expiration_date),
            rec.margin.map(|m| m.to_string()).unwrap_or_default(),
            rec.duration_years.map(|y| y.to_string()).unwrap_or_default(),
            rec.outlook.source_label().to_string(),
        ])
        .with_context(|| format!("writing CSV row for '{}'", rec.school_name))?;
    }

    wtr.flush().context("flushing CSV")?;
    Ok(())
}

/// Export the filtered records to a file.
pub fn export_csv(path: &Path, records: &[&Record], columns: &ColumnNames) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(std::io::BufWriter::new(file), records, columns)?;
    log::info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
