use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::Serialize;

use crate::models::{AchievementDefinition, UserStats};

use super::catalog::AchievementCatalog;
use super::metric;

/// Default length of the upcoming list shown on the profile page
pub const DEFAULT_UPCOMING_LIMIT: usize = 8;

/// A locked achievement with measurable partial progress
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpcomingAchievement {
    pub id: &'static str,
    pub display_name: &'static str,
    pub emoji: &'static str,
    /// Percentage toward the target, 1..=99 in practice (0% entries are
    /// dropped and 100% implies the predicate already unlocked)
    pub progress: u8,
}

/// Unlock totals for the profile header
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AchievementSummary {
    pub total: usize,
    pub unlocked: usize,
    pub percentage: u8,
}

/// Pure, side-effect-free classification of stats against a catalog.
///
/// Borrows an injected catalog so tests can run against small synthetic ones.
/// Every method is deterministic for a given `UserStats` value.
pub struct Evaluator<'a> {
    catalog: &'a AchievementCatalog,
}

impl<'a> Evaluator<'a> {
    pub fn new(catalog: &'a AchievementCatalog) -> Self {
        Self { catalog }
    }

    /// Ids of all achievements whose predicate holds for the given stats.
    ///
    /// A panicking predicate is logged and treated as false for that single
    /// achievement; evaluation of every other rule proceeds unaffected.
    pub fn unlocked(&self, stats: &UserStats) -> HashSet<&'static str> {
        self.catalog
            .all()
            .iter()
            .filter(|definition| self.evaluate_predicate(definition, stats))
            .map(|definition| definition.id)
            .collect()
    }

    fn evaluate_predicate(&self, definition: &AchievementDefinition, stats: &UserStats) -> bool {
        match catch_unwind(AssertUnwindSafe(|| (definition.predicate)(stats))) {
            Ok(satisfied) => satisfied,
            Err(_) => {
                tracing::warn!(
                    achievement_id = definition.id,
                    "Achievement predicate panicked; treating as locked"
                );
                false
            }
        }
    }

    /// Percentage (0..=100) toward a locked achievement's target.
    ///
    /// Floors rather than rounds so the display never claims 100% before the
    /// condition is literally met. Achievements without a numeric metric
    /// report 0: no partial credit for predicate-only conditions.
    pub fn progress(&self, definition: &AchievementDefinition, stats: &UserStats) -> u8 {
        let Some(m) = definition.progress_metric else {
            return 0;
        };
        if m.target == 0 {
            return 0;
        }

        let value = match serde_json::to_value(stats) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize stats for progress lookup");
                return 0;
            }
        };

        let current = match metric::resolve(&value, m.path) {
            Some(current) if current > 0.0 => current,
            _ => return 0,
        };

        let pct = (current / m.target as f64 * 100.0).floor();
        pct.min(100.0) as u8
    }

    /// Locked achievements with progress > 0, best-first.
    ///
    /// Stable sort by progress descending; catalog order breaks ties.
    pub fn upcoming(&self, stats: &UserStats, limit: usize) -> Vec<UpcomingAchievement> {
        let unlocked = self.unlocked(stats);

        let mut upcoming: Vec<UpcomingAchievement> = self
            .catalog
            .all()
            .iter()
            .filter(|definition| !unlocked.contains(definition.id))
            .filter_map(|definition| {
                let progress = self.progress(definition, stats);
                (progress > 0).then_some(UpcomingAchievement {
                    id: definition.id,
                    display_name: definition.display_name,
                    emoji: definition.emoji,
                    progress,
                })
            })
            .collect();

        upcoming.sort_by(|a, b| b.progress.cmp(&a.progress));
        upcoming.truncate(limit);
        upcoming
    }

    /// Unlock totals; an empty catalog reports 0%, never a division error
    pub fn summary(&self, stats: &UserStats) -> AchievementSummary {
        let total = self.catalog.len();
        let unlocked = self.unlocked(stats).len();
        let percentage = if total == 0 {
            0
        } else {
            (unlocked as f64 / total as f64 * 100.0).round() as u8
        };

        AchievementSummary {
            total,
            unlocked,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ProgressMetric};

    fn definition(
        id: &'static str,
        predicate: fn(&UserStats) -> bool,
        progress_metric: Option<ProgressMetric>,
    ) -> AchievementDefinition {
        AchievementDefinition {
            id,
            display_name: id,
            description: "",
            emoji: "⭐",
            color_class: "bg-gray-500",
            category: Category::Collection,
            predicate,
            progress_metric,
        }
    }

    fn stats_with_episodes(watched: u64) -> UserStats {
        UserStats {
            episodes: crate::models::EpisodeCounts {
                watched,
                minutes: 0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_unlocked_is_deterministic() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);
        let stats = stats_with_episodes(250);

        let first = evaluator.unlocked(&stats);
        for _ in 0..10 {
            assert_eq!(evaluator.unlocked(&stats), first);
        }
    }

    #[test]
    fn test_first_series_scenario() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);
        let stats = UserStats {
            series: crate::models::SeriesCounts {
                total: 1,
                ..Default::default()
            },
            ..Default::default()
        };

        let unlocked = evaluator.unlocked(&stats);
        assert!(unlocked.contains("first-series"));
        assert!(!unlocked.contains("series-collector-10"));
        assert!(!unlocked.contains("series-collector-25"));
        assert!(!unlocked.contains("series-collector-50"));
        assert!(!unlocked.contains("series-collector-100"));
    }

    #[test]
    fn test_episode_boundary_and_progress() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);
        let stats = stats_with_episodes(100);

        let unlocked = evaluator.unlocked(&stats);
        assert!(unlocked.contains("episodes-100"));
        assert!(!unlocked.contains("episodes-500"));

        let five_hundred = catalog.get("episodes-500").unwrap();
        assert_eq!(evaluator.progress(five_hundred, &stats), 20);
    }

    #[test]
    fn test_progress_floors_instead_of_rounding() {
        let catalog = AchievementCatalog::new(vec![definition(
            "target-1000",
            |s| s.episodes.watched >= 1000,
            Some(ProgressMetric {
                path: "episodes.watched",
                target: 1000,
            }),
        )]);
        let evaluator = Evaluator::new(&catalog);

        // 999/1000 = 99.9% must display as 99, not 100
        let stats = stats_with_episodes(999);
        let def = catalog.get("target-1000").unwrap();
        assert_eq!(evaluator.progress(def, &stats), 99);
    }

    #[test]
    fn test_progress_clamps_at_100() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);
        let stats = stats_with_episodes(12_345);

        let def = catalog.get("episodes-100").unwrap();
        assert_eq!(evaluator.progress(def, &stats), 100);
    }

    #[test]
    fn test_progress_bounds_hold_across_catalog() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);

        let extremes = [
            UserStats::default(),
            stats_with_episodes(u64::MAX / 2),
            UserStats {
                series: crate::models::SeriesCounts {
                    total: 1_000_000,
                    watching: 3,
                    completed: 999,
                    pending: 1,
                },
                ..Default::default()
            },
        ];

        for stats in &extremes {
            for def in catalog.all() {
                let p = evaluator.progress(def, stats);
                assert!(p <= 100, "progress out of bounds for {}", def.id);
            }
        }
    }

    #[test]
    fn test_progress_without_metric_is_zero() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);
        let stats = UserStats {
            watched_movies: vec![crate::models::WatchedTitle {
                name: "Star Wars: The Empire Strikes Back".to_string(),
                original_name: None,
                runtime_minutes: None,
            }],
            ..Default::default()
        };

        let franchise = catalog.get("franchise-star-wars").unwrap();
        assert_eq!(evaluator.progress(franchise, &stats), 0);
    }

    #[test]
    fn test_panicking_predicate_is_isolated() {
        let catalog = AchievementCatalog::new(vec![
            definition("always-panics", |_| panic!("bad rule"), None),
            definition("ten-episodes", |s| s.episodes.watched >= 10, None),
        ]);
        let evaluator = Evaluator::new(&catalog);

        let unlocked = evaluator.unlocked(&stats_with_episodes(50));
        assert!(!unlocked.contains("always-panics"));
        assert!(unlocked.contains("ten-episodes"));
    }

    #[test]
    fn test_upcoming_sorted_and_truncated() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);
        let stats = UserStats {
            series: crate::models::SeriesCounts {
                total: 8, // 80% toward series-collector-10
                completed: 0,
                watching: 8,
                pending: 0,
            },
            episodes: crate::models::EpisodeCounts {
                watched: 40, // 40% toward episodes-100
                minutes: 360, // 25% toward watch-time-day
            },
            ..Default::default()
        };

        let upcoming = evaluator.upcoming(&stats, DEFAULT_UPCOMING_LIMIT);
        assert!(upcoming.len() <= DEFAULT_UPCOMING_LIMIT);
        assert!(upcoming.windows(2).all(|w| w[0].progress >= w[1].progress));
        assert_eq!(upcoming[0].id, "series-collector-10");
        assert_eq!(upcoming[0].progress, 80);
        assert!(upcoming.iter().all(|u| u.progress > 0));
    }

    #[test]
    fn test_upcoming_ties_keep_catalog_order() {
        let m = |target| {
            Some(ProgressMetric {
                path: "episodes.watched",
                target,
            })
        };
        let catalog = AchievementCatalog::new(vec![
            definition("a", |s| s.episodes.watched >= 200, m(200)),
            definition("b", |s| s.episodes.watched >= 200, m(200)),
            definition("c", |s| s.episodes.watched >= 200, m(200)),
        ]);
        let evaluator = Evaluator::new(&catalog);

        let upcoming = evaluator.upcoming(&stats_with_episodes(100), 8);
        let ids: Vec<_> = upcoming.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_franchise_below_threshold_locked_and_not_upcoming() {
        let catalog = AchievementCatalog::standard();
        let evaluator = Evaluator::new(&catalog);

        let movie = |name: &str| crate::models::WatchedTitle {
            name: name.to_string(),
            original_name: None,
            runtime_minutes: Some(120),
        };
        let stats = UserStats {
            watched_movies: vec![
                movie("Star Wars: A New Hope"),
                movie("Star Wars: The Empire Strikes Back"),
                movie("Star Wars: Return of the Jedi"),
            ],
            ..Default::default()
        };

        // Three of four required titles: locked, and (no numeric metric)
        // absent from the upcoming list rather than shown at 0%.
        assert!(!evaluator.unlocked(&stats).contains("franchise-star-wars"));
        assert!(evaluator
            .upcoming(&stats, usize::MAX)
            .iter()
            .all(|u| u.id != "franchise-star-wars"));
    }

    #[test]
    fn test_summary_percentage() {
        let catalog = AchievementCatalog::new(vec![
            definition("a", |_| true, None),
            definition("b", |_| true, None),
            definition("c", |_| false, None),
        ]);
        let evaluator = Evaluator::new(&catalog);

        let summary = evaluator.summary(&UserStats::default());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unlocked, 2);
        assert_eq!(summary.percentage, 67); // round, not floor
    }

    #[test]
    fn test_summary_empty_catalog_is_zero() {
        let catalog = AchievementCatalog::new(vec![]);
        let evaluator = Evaluator::new(&catalog);

        let summary = evaluator.summary(&UserStats::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.unlocked, 0);
        assert_eq!(summary.percentage, 0);
    }
}
