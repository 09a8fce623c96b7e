//! Writes a deterministic synthetic partnership dataset to
//! `sample_partnerships.parquet` and `sample_partnerships.csv`.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

struct Row {
    school: String,
    leader: &'static str,
    status: &'static str,
    signed: NaiveDate,
    expires: Option<NaiveDate>,
    margin: f64,
}

fn generate_rows(rng: &mut SimpleRng, n: usize) -> Result<Vec<Row>> {
    let leaders = ["Ana", "Bruno", "Carla", "Diego", "Elisa"];
    let prefixes = ["Escola", "Colégio", "Instituto"];
    let names = ["Azul", "Horizonte", "Saber", "Aurora", "Futuro", "Esperança", "Sol", "Raízes"];
    let base = NaiveDate::from_ymd_opt(2016, 1, 1).context("base date")?;

    (0..n)
        .map(|i| {
            let signed = base + Duration::days(rng.below(6 * 365) as i64);
            let years = 1 + rng.below(6) as i64;
            // Every 12th contract has no expiration date on file.
            let expires = (i % 12 != 11).then(|| signed + Duration::days(years * 365 + rng.below(60) as i64));
            Ok(Row {
                school: format!(
                    "{} {} {}",
                    prefixes[rng.below(prefixes.len())],
                    names[rng.below(names.len())],
                    i + 1
                ),
                leader: leaders[rng.below(leaders.len())],
                status: if rng.next_f64() < 0.7 { "Ativa" } else { "Encerrada" },
                signed,
                expires,
                // Fraction, roughly -20% .. +30%
                margin: ((rng.next_f64() * 0.5 - 0.2) * 1000.0).round() / 1000.0,
            })
        })
        .collect()
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let days = |d: NaiveDate| (d - epoch).num_days() as i32;

    let schema = Arc::new(Schema::new(vec![
        Field::new("Nome da Escola", DataType::Utf8, false),
        Field::new("Líder", DataType::Utf8, false),
        Field::new("Status da Parceria", DataType::Utf8, false),
        Field::new("Data de Assinatura", DataType::Date32, true),
        Field::new("Data de Vencimento", DataType::Date32, true),
        // Trailing space as found in the source spreadsheet.
        Field::new("Margem rentabilidade ", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.school.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.leader))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.status))),
            Arc::new(Date32Array::from(rows.iter().map(|r| Some(days(r.signed))).collect::<Vec<_>>())),
            Arc::new(Date32Array::from(rows.iter().map(|r| r.expires.map(days)).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.margin).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    wtr.write_record([
        "Nome da Escola",
        "Líder",
        "Status da Parceria",
        "Data de Assinatura",
        "Data de Vencimento",
        "Margem rentabilidade ",
    ])?;
    for r in rows {
        wtr.write_record([
            r.school.clone(),
            r.leader.to_string(),
            r.status.to_string(),
            r.signed.to_string(),
            r.expires.map(|d| d.to_string()).unwrap_or_default(),
            r.margin.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(&mut rng, 120)?;

    write_parquet(&rows, "sample_partnerships.parquet")?;
    write_csv(&rows, "sample_partnerships.csv")?;

    println!(
        "Wrote {} partnerships to sample_partnerships.parquet and sample_partnerships.csv",
        rows.len()
    );
    Ok(())
}
