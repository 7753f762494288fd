/// Data layer: core types, loading, classification and statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (typed columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  continuous / discrete / categorical partitions
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  stats    │   │ binning  │  quartile cut → derived `<col>_category`
///   └──────────┘   └──────────┘
/// ```

pub mod binning;
pub mod classify;
pub mod error;
pub mod loader;
pub mod model;
pub mod stats;
