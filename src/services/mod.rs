pub mod metadata;
pub mod stats;

pub use metadata::{MetadataClient, TitleSummary};
pub use stats::{PgStatsProvider, StatsProvider};
