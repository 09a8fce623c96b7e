use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::derive::derive_dataset;
use super::model::{Dataset, PartnershipStatus, RawRecord};
use crate::config::ColumnNames;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Problems with the shape or content of the source table. All are fatal.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: unknown partnership status '{value}'")]
    UnknownStatus { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// Cell / Table – format-neutral intermediate representation
// ---------------------------------------------------------------------------

/// A single loosely-typed cell, as produced by the format readers.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Null,
}

impl Cell {
    fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.to_string(),
            Cell::Null => String::new(),
        }
    }
}

/// Column-named rows; header names are already trimmed.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn with_headers<I: IntoIterator<Item = String>>(headers: I) -> Self {
        Table {
            headers: headers.into_iter().map(|h| h.trim().to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and derive a partnership dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one row per partnership
/// * `.json`    – `[{ "Nome da Escola": "...", ... }, ...]`
/// * `.parquet` – flat columns (strings, numbers, dates)
/// * `.xlsx` / `.xls` / `.ods` – first sheet, header in the first row
pub fn load_file(path: &Path, columns: &ColumnNames) -> Result<Dataset> {
    let table = read_table(path)?;
    let rows = records_from_table(&table, columns)
        .with_context(|| format!("validating {}", path.display()))?;
    Ok(derive_dataset(rows))
}

/// Read the raw table without interpreting any column.
pub fn read_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Map the named columns of `table` onto typed rows.
pub fn records_from_table(table: &Table, columns: &ColumnNames) -> Result<Vec<RawRecord>, SchemaError> {
    let index: HashMap<&str, usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();
    let position = |name: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    };

    let school_idx = position(columns.school_name.as_str())?;
    let leader_idx = position(columns.leader.as_str())?;
    let status_idx = position(columns.status.as_str())?;
    let signing_idx = position(columns.signing_date.as_str())?;
    let expiration_idx = position(columns.expiration_date.as_str())?;
    let margin_idx = position(columns.margin.as_str())?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            let cell = |i: usize| cells.get(i).unwrap_or(&Cell::Null);

            let status_text = cell(status_idx).as_text();
            let status = PartnershipStatus::parse(&status_text).ok_or(SchemaError::UnknownStatus {
                row,
                value: status_text,
            })?;

            let margin_ratio = parse_margin(cell(margin_idx));
            if margin_ratio.is_none() {
                log::warn!(
                    "row {row}: no usable profitability margin ({:?}), left out of margin charts",
                    cell(margin_idx).as_text()
                );
            }

            Ok(RawRecord {
                school_name: cell(school_idx).as_text(),
                leader: cell(leader_idx).as_text(),
                status,
                signing_date: parse_date(cell(signing_idx)),
                expiration_date: parse_date(cell(expiration_idx)),
                margin_ratio,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Cell interpretation
// ---------------------------------------------------------------------------

fn parse_margin(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => {
            let s = s.trim();
            // Decimal comma, as exported by pt-BR spreadsheets.
            if s.contains(',') && !s.contains('.') {
                s.replace(',', ".").parse().ok()?
            } else {
                s.parse().ok()?
            }
        }
        Cell::Date(_) | Cell::Null => return None,
    };
    value.is_finite().then_some(value)
}

/// Interpret a cell as a calendar date. Malformed or empty cells give `None`.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(n) => number_to_date(*n),
        Cell::Text(s) => parse_date_text(s.trim()),
        Cell::Null => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    let dt_formats = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
    for fmt in dt_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    s.parse::<f64>().ok().and_then(number_to_date)
}

/// Numeric dates are either spreadsheet day serials or Unix timestamps.
/// Serials stay below ~3e6 (year 9999); larger values are epoch seconds,
/// and from 1e11 on epoch milliseconds (`DataFrame.to_json` writes those).
fn number_to_date(n: f64) -> Option<NaiveDate> {
    if !n.is_finite() {
        return None;
    }
    if n.abs() >= 1e11 {
        DateTime::from_timestamp_millis(n as i64).map(|dt| dt.date_naive())
    } else if n.abs() >= 1e8 {
        DateTime::from_timestamp(n as i64, 0).map(|dt| dt.date_naive())
    } else {
        excel_serial_to_date(n)
    }
}

/// Spreadsheet day numbers count from 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::try_days(serial.floor() as i64)?)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every field read as text.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?;
    let mut table = Table::with_headers(headers.iter().map(str::to_string));

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        table.rows.push(
            record
                .iter()
                .map(|v| if v.trim().is_empty() { Cell::Null } else { Cell::Text(v.to_string()) })
                .collect(),
        );
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, as `df.to_json(orient='records')`
/// writes it; dates may be strings or epoch milliseconds):
///
/// ```json
/// [
///   { "Nome da Escola": "Escola Azul", "Líder": "Ana", "Margem rentabilidade": 0.05,
///     "Data de Assinatura": 1577836800000, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(records.len());
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            let key = key.trim();
            if !headers.iter().any(|h| h == key) {
                headers.push(key.to_string());
            }
        }
        objects.push(obj);
    }

    let mut table = Table::with_headers(headers);
    for obj in objects {
        let trimmed: HashMap<&str, &JsonValue> = obj.iter().map(|(k, v)| (k.trim(), v)).collect();
        table.rows.push(
            table
                .headers
                .iter()
                .map(|h| trimmed.get(h.as_str()).map_or(Cell::Null, |v| json_to_cell(v)))
                .collect(),
        );
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) if s.trim().is_empty() => Cell::Null,
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => n.as_f64().map_or(Cell::Null, Cell::Number),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet; its first row holds the column names.
fn load_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no sheets")?
        .context("reading first sheet")?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|header| header.iter().map(|c| c.to_string()).collect::<Vec<_>>())
        .unwrap_or_default();

    let mut table = Table::with_headers(headers);
    for row in rows {
        table.rows.push(row.iter().map(spreadsheet_to_cell).collect());
    }
    Ok(table)
}

fn spreadsheet_to_cell(val: &Data) -> Cell {
    match val {
        Data::String(s) | Data::DateTimeIso(s) if s.trim().is_empty() => Cell::Null,
        Data::String(s) | Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(Cell::Null, Cell::Date),
        _ => Cell::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// String columns become text cells, numeric columns numbers, and
/// date/timestamp columns dates. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect::<Vec<_>>();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::with_headers(headers);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .zip(batch.schema().fields())
            .map(|(col, field)| {
                arrow_column_to_cells(col)
                    .with_context(|| format!("reading column '{}'", field.name()))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            table
                .rows
                .push(columns.iter().map(|col| col[row].clone()).collect());
        }
    }

    Ok(table)
}

// -- Parquet / Arrow helpers --

/// Convert a whole Arrow column to cells, casting once per column.
fn arrow_column_to_cells(col: &Arc<dyn Array>) -> Result<Vec<Cell>> {
    let len = col.len();
    let cells: Vec<Cell> = match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let strings = cast(col, &DataType::Utf8).context("casting to Utf8")?;
            let strings = strings.as_string::<i32>();
            (0..len)
                .map(|i| {
                    if strings.is_null(i) || strings.value(i).trim().is_empty() {
                        Cell::Null
                    } else {
                        Cell::Text(strings.value(i).to_string())
                    }
                })
                .collect()
        }
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            let dates = cast(col, &DataType::Date32).context("casting to Date32")?;
            let dates = dates.as_primitive::<Date32Type>();
            (0..len)
                .map(|i| {
                    if dates.is_null(i) {
                        Cell::Null
                    } else {
                        dates.value_as_date(i).map_or(Cell::Null, Cell::Date)
                    }
                })
                .collect()
        }
        dt if dt.is_numeric() => {
            let numbers = cast(col, &DataType::Float64).context("casting to Float64")?;
            let numbers = numbers.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| {
                    if numbers.is_null(i) {
                        Cell::Null
                    } else {
                        Cell::Number(numbers.value(i))
                    }
                })
                .collect()
        }
        DataType::Null => vec![Cell::Null; len],
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = " Nome da Escola ,Líder,Status da Parceria ,Data de Assinatura,Data de Vencimento, Margem rentabilidade";

    fn write_file(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        path
    }

    #[test]
    fn csv_headers_are_trimmed_and_rows_derived() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dados.csv",
            &[
                HEADER,
                "Escola Azul,Ana,Ativa,2020-01-01,2023-01-01,0.10",
                "Escola Verde,Ana,Encerrada,01/01/2020,,-0.05",
            ],
        );

        let ds = load_file(&path, &ColumnNames::default()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records[0];
        assert_eq!(first.school_name, "Escola Azul");
        assert_eq!(first.status, PartnershipStatus::Active);
        assert_eq!(first.duration_years, Some(3));
        assert!((first.margin.unwrap() - 10.0).abs() < 1e-9);

        let second = &ds.records[1];
        assert_eq!(second.signing_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(second.expiration_date, None);
        assert_eq!(second.duration_years, None);
    }

    #[test]
    fn missing_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "dados.csv", &["Nome da Escola,Líder", "Escola Azul,Ana"]);

        let err = load_file(&path, &ColumnNames::default()).unwrap_err();
        let schema = err.downcast_ref::<SchemaError>().unwrap();
        assert_eq!(schema, &SchemaError::MissingColumn("Status da Parceria".to_string()));
    }

    #[test]
    fn unknown_status_names_the_row() {
        let table = Table {
            headers: ColumnNames::default().required().iter().map(|s| s.to_string()).collect(),
            rows: vec![vec![
                Cell::Text("Escola Azul".into()),
                Cell::Text("Ana".into()),
                Cell::Text("Suspensa".into()),
                Cell::Null,
                Cell::Null,
                Cell::Number(0.1),
            ]],
        };
        let err = records_from_table(&table, &ColumnNames::default()).unwrap_err();
        assert_eq!(err, SchemaError::UnknownStatus { row: 0, value: "Suspensa".into() });
    }

    #[test]
    fn blank_margin_keeps_the_row() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dados.csv",
            &[
                HEADER,
                "Escola Azul,Ana,Ativa,2020-01-01,2023-01-01,",
                "Escola Verde,Bia,Encerrada,2020-01-01,2022-01-01,0.05",
            ],
        );

        let ds = load_file(&path, &ColumnNames::default()).unwrap();
        assert_eq!(ds.len(), 2);
        let blank = &ds.records[0];
        assert_eq!(blank.margin, None);
        assert_eq!(blank.outlook, crate::data::model::Outlook::Negative);
        assert_eq!(blank.duration_years, Some(3));
        assert!((ds.records[1].margin.unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn json_records_load() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dados.json",
            &[r#"[{"Nome da Escola ": "Escola Azul", "Líder": "Ana", "Status da Parceria": "Active",
                 "Data de Assinatura": "2021-03-01", "Data de Vencimento": "2024-03-01",
                 "Margem rentabilidade": -0.02}]"#],
        );
        let ds = load_file(&path, &ColumnNames::default()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].duration_years, Some(3));
        assert!(ds.records[0].margin.unwrap() < 0.0);
    }

    #[test]
    fn json_epoch_millisecond_dates() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "dados.json",
            &[r#"[{"Nome da Escola":"Escola Azul","Líder":"Ana","Status da Parceria":"Ativa",
                 "Data de Assinatura":1577836800000,"Data de Vencimento":1672531200000,
                 "Margem rentabilidade":0.1}]"#],
        );
        let ds = load_file(&path, &ColumnNames::default()).unwrap();
        let rec = &ds.records[0];
        assert_eq!(rec.signing_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(rec.expiration_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(rec.duration_years, Some(3));
    }

    #[test]
    fn dates_accept_several_encodings() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 1);
        assert_eq!(parse_date(&Cell::Text("2020-01-01".into())), expected);
        assert_eq!(parse_date(&Cell::Text("2020-01-01 00:00:00".into())), expected);
        assert_eq!(parse_date(&Cell::Text("01/01/2020".into())), expected);
        // Excel serial for 2020-01-01
        assert_eq!(parse_date(&Cell::Number(43831.0)), expected);
        // Unix epoch seconds and milliseconds
        assert_eq!(parse_date(&Cell::Number(1_577_836_800.0)), expected);
        assert_eq!(parse_date(&Cell::Number(1_577_836_800_000.0)), expected);
        assert_eq!(parse_date(&Cell::Text("1577836800000".into())), expected);
        assert_eq!(parse_date(&Cell::Text("soon".into())), None);
        assert_eq!(parse_date(&Cell::Null), None);
    }

    #[test]
    fn decimal_comma_margin() {
        assert_eq!(parse_margin(&Cell::Text("0,25".into())), Some(0.25));
        assert_eq!(parse_margin(&Cell::Text("NaN".into())), None);
    }

    #[test]
    fn xlsx_first_sheet_loads() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Dados.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let headers = [" Nome da Escola ", "Líder", "Status da Parceria", "Data de Assinatura", "Data de Vencimento", "Margem rentabilidade "];
        for (col, header) in headers.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        sheet.write_string(1, 0, "Escola Azul").unwrap();
        sheet.write_string(1, 1, "Ana").unwrap();
        sheet.write_string(1, 2, "Ativa").unwrap();
        sheet
            .write_datetime_with_format(1, 3, &ExcelDateTime::from_ymd(2020, 1, 1).unwrap(), &date_format)
            .unwrap();
        sheet
            .write_datetime_with_format(1, 4, &ExcelDateTime::from_ymd(2023, 1, 1).unwrap(), &date_format)
            .unwrap();
        sheet.write_number(1, 5, -0.05).unwrap();
        workbook.save(&path).unwrap();

        let ds = load_file(&path, &ColumnNames::default()).unwrap();
        assert_eq!(ds.len(), 1);
        let rec = &ds.records[0];
        assert_eq!(rec.school_name, "Escola Azul");
        assert_eq!(rec.signing_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(rec.duration_years, Some(3));
        assert!((rec.margin.unwrap() + 5.0).abs() < 1e-9);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(read_table(Path::new("dados.txt")).is_err());
    }
}
