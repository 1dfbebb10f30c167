/// Data layer: core types, loading, and querying.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → EmissionsTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────────┐
///   │ EmissionsTable  │  year columns + Vec<CountryRow>, immutable
///   └────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  Selection → SeriesPoint / TotalPoint sequences
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod query;
