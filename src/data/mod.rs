/// Data layer: cell types, loading, and record selection.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawSheet (headerless grid)
///   └──────────┘
///        │  header row chosen by the user
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<SalesRecord>, column names
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  select / group records by a column value
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
