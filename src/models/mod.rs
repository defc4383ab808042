mod achievement;
mod stats;

pub use achievement::{
    AchievementDefinition, Category, Notification, ProgressMetric, UnlockRecord,
};
pub use stats::{
    EpisodeCounts, GenreCount, MovieCounts, SeriesCounts, StreakStats, UserStats, WatchedTitle,
};
