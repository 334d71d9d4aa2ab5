/// Data layer: ingestion, preparation, filtering and aggregation.
///
/// Architecture:
/// ```text
///  seven .csv / .parquet extracts
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable (malformed rows skipped)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  prepare  │  institution + year filter, sort, diff, month label
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ DashboardData  │  one PreparedTable per extract, built once
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selected months → FilteredTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  shares, group sums, rates, age-band order
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dashboard;
pub mod datasets;
pub mod filter;
pub mod loader;
pub mod model;
pub mod prepare;
