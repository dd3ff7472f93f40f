/// Data layer: record types, loading, caching and filtering.
///
/// Architecture:
/// ```text
///  channels_data.csv / {prefix}_*.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + validate → Vec<Record> | MissingSource
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  SourceId → Arc<Vec<Record>>, loaded once
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  selected artists / categories / member / region → Selection
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod source;

pub use cache::TableCache;
pub use filter::{ChannelFilter, DashboardFilter, Selection};
pub use loader::{MissingReason, MissingSource};
pub use source::{AnalysisKind, SourceId};
