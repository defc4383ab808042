use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserStats;

/// Category grouping for achievements, used for display filtering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Collection,
    Viewing,
    Streak,
    Genres,
    Time,
    Special,
}

/// Optional numeric metric backing a percentage-complete display.
///
/// `path` is a dotted accessor into the serialized [`UserStats`] shape
/// (e.g. `"episodes.watched"`); `target` is the value at which the
/// achievement's condition is met. Achievements whose condition inspects a
/// list (franchise counting, genre breadth) have no metric and never report
/// partial progress.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ProgressMetric {
    pub path: &'static str,
    pub target: u64,
}

/// A single achievement definition.
///
/// Immutable once the catalog is built. `id` is the stable persistence key:
/// ids are append-only across releases and must never be renamed or removed
/// once users may hold unlock records referencing them.
#[derive(Clone)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    /// Opaque presentation hint consumed by the frontend, not interpreted here
    pub color_class: &'static str,
    pub category: Category,
    /// Pure unlock condition. Must not perform I/O; a panicking predicate is
    /// caught by the evaluator and treated as locked for this one rule.
    pub predicate: fn(&UserStats) -> bool,
    pub progress_metric: Option<ProgressMetric>,
}

impl std::fmt::Debug for AchievementDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AchievementDefinition")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("progress_metric", &self.progress_metric)
            .finish()
    }
}

/// The permanent fact that a user satisfied an achievement at least once.
///
/// Unique on `(user_id, achievement_id)`; created exactly once by the
/// reconciler and never updated or deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnlockRecord {
    pub user_id: Uuid,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Outbound "achievement unlocked" message handed to the notifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Deep link to the achievement detail view
    pub link: String,
}

impl Notification {
    /// Builds the congratulatory notification for a freshly unlocked
    /// achievement.
    pub fn for_unlock(definition: &AchievementDefinition) -> Self {
        Self {
            title: format!("{} {}", definition.emoji, definition.display_name),
            body: definition.description.to_string(),
            link: format!("/achievements/{}", definition.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&Category::Collection).unwrap();
        assert_eq!(json, "\"collection\"");

        let json = serde_json::to_string(&Category::Special).unwrap();
        assert_eq!(json, "\"special\"");
    }

    #[test]
    fn test_notification_for_unlock() {
        let definition = AchievementDefinition {
            id: "first-series",
            display_name: "First Steps",
            description: "Add your first series",
            emoji: "🎬",
            color_class: "bg-blue-500",
            category: Category::Collection,
            predicate: |stats| stats.series.total >= 1,
            progress_metric: None,
        };

        let notification = Notification::for_unlock(&definition);
        assert_eq!(notification.title, "🎬 First Steps");
        assert_eq!(notification.body, "Add your first series");
        assert_eq!(notification.link, "/achievements/first-series");
    }
}
