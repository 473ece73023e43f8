/// Data layer: core types, loading, outlier filtering, and segmentation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CourseTable (enrollment normalized)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ outliers  │  z-score / IQR flags on rating + enrollment columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ segment   │  percentile gates → topic tables, scaled ratings
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod outliers;
pub mod segment;
