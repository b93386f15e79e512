/// Data layer: loading, column selection, recoding and the prepared model.
///
/// Architecture:
/// ```text
///  HTTP / file (cp1252 CSV)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → RawTable (missing tokens → None)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  select   │  allow-list + rename → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  recode   │  typed Respondents → Survey (cached behind Arc)
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod recode;
pub mod select;
