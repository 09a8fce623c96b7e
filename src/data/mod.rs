/// Data layer: core types, loading, derivation, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table → RawRecord rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive   │  margin %, contract years, outlook → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection predicates → filtered indices
///   └──────────┘
/// ```

pub mod derive;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
