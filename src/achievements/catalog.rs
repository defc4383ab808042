use std::collections::HashSet;

use crate::models::{AchievementDefinition, Category, ProgressMetric, UserStats};

/// Franchise keyword lists. Spanish and English spellings are carried side by
/// side because library titles arrive in either language; matching is plain
/// case-insensitive substring comparison with no diacritic normalization, so
/// both spellings must be listed explicitly. Known-fragile heuristic kept as
/// product behavior.
const STAR_WARS: &[&str] = &["star wars", "la guerra de las galaxias"];
const HARRY_POTTER: &[&str] = &["harry potter", "animales fantásticos", "fantastic beasts"];
const LORD_OF_THE_RINGS: &[&str] = &[
    "lord of the rings",
    "el señor de los anillos",
    "the hobbit",
    "el hobbit",
];
const MARVEL: &[&str] = &["avengers", "vengadores", "spider-man", "iron man", "thor"];

/// Minimum matching titles for a franchise achievement
const FRANCHISE_THRESHOLD: usize = 4;

/// The ordered, immutable set of achievement definitions.
///
/// Insertion order drives default display ordering and breaks progress ties
/// in the upcoming list; it carries no other meaning. The catalog is
/// append-only across releases: an id, once shipped, is never renamed or
/// removed, or persisted unlock records would orphan.
pub struct AchievementCatalog {
    definitions: Vec<AchievementDefinition>,
}

impl AchievementCatalog {
    /// Builds a catalog from explicit definitions. Used directly by tests
    /// with small synthetic catalogs.
    pub fn new(definitions: Vec<AchievementDefinition>) -> Self {
        debug_assert!(
            {
                let mut seen = HashSet::new();
                definitions.iter().all(|d| seen.insert(d.id))
            },
            "achievement ids must be unique"
        );
        Self { definitions }
    }

    /// All definitions in insertion order
    pub fn all(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Looks up a definition by its stable id
    pub fn get(&self, id: &str) -> Option<&AchievementDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// The full production catalog, built once at startup
    pub fn standard() -> Self {
        let mut defs: Vec<AchievementDefinition> = Vec::new();

        // -- Collection --------------------------------------------------
        defs.push(def(
            "first-series",
            "First Steps",
            "Add your first series to the library",
            "🌱",
            "bg-green-500",
            Category::Collection,
            |s| s.series.total >= 1,
            Some(metric("series.total", 1)),
        ));
        defs.push(def(
            "series-collector-10",
            "Getting Serious",
            "Add 10 series to the library",
            "📚",
            "bg-green-500",
            Category::Collection,
            |s| s.series.total >= 10,
            Some(metric("series.total", 10)),
        ));
        defs.push(def(
            "series-collector-25",
            "Shelf Space",
            "Add 25 series to the library",
            "🗂️",
            "bg-green-600",
            Category::Collection,
            |s| s.series.total >= 25,
            Some(metric("series.total", 25)),
        ));
        defs.push(def(
            "series-collector-50",
            "Serial Collector",
            "Add 50 series to the library",
            "🏛️",
            "bg-green-700",
            Category::Collection,
            |s| s.series.total >= 50,
            Some(metric("series.total", 50)),
        ));
        defs.push(def(
            "series-collector-100",
            "The Archivist",
            "Add 100 series to the library",
            "🏰",
            "bg-green-800",
            Category::Collection,
            |s| s.series.total >= 100,
            Some(metric("series.total", 100)),
        ));
        defs.push(def(
            "first-movie",
            "Opening Night",
            "Watch your first movie",
            "🎬",
            "bg-blue-500",
            Category::Collection,
            |s| s.movies.watched >= 1,
            Some(metric("movies.watched", 1)),
        ));
        defs.push(def(
            "movie-buff-25",
            "Movie Buff",
            "Watch 25 movies",
            "🍿",
            "bg-blue-600",
            Category::Collection,
            |s| s.movies.watched >= 25,
            Some(metric("movies.watched", 25)),
        ));
        defs.push(def(
            "movie-buff-100",
            "Cinephile",
            "Watch 100 movies",
            "🎥",
            "bg-blue-800",
            Category::Collection,
            |s| s.movies.watched >= 100,
            Some(metric("movies.watched", 100)),
        ));

        // -- Viewing -----------------------------------------------------
        defs.push(def(
            "first-completed-series",
            "The End",
            "Complete your first series",
            "🏁",
            "bg-purple-500",
            Category::Viewing,
            |s| s.series.completed >= 1,
            Some(metric("series.completed", 1)),
        ));
        defs.push(def(
            "series-finisher-10",
            "Closure Seeker",
            "Complete 10 series",
            "✅",
            "bg-purple-600",
            Category::Viewing,
            |s| s.series.completed >= 10,
            Some(metric("series.completed", 10)),
        ));
        defs.push(def(
            "episodes-100",
            "Century Club",
            "Watch 100 episodes",
            "💯",
            "bg-red-500",
            Category::Viewing,
            |s| s.episodes.watched >= 100,
            Some(metric("episodes.watched", 100)),
        ));
        defs.push(def(
            "episodes-500",
            "Binge Mode",
            "Watch 500 episodes",
            "📺",
            "bg-red-600",
            Category::Viewing,
            |s| s.episodes.watched >= 500,
            Some(metric("episodes.watched", 500)),
        ));
        defs.push(def(
            "episodes-1000",
            "Thousand-Yard Stare",
            "Watch 1,000 episodes",
            "🔥",
            "bg-red-700",
            Category::Viewing,
            |s| s.episodes.watched >= 1000,
            Some(metric("episodes.watched", 1000)),
        ));
        defs.push(def(
            "episodes-5000",
            "Beyond Counting",
            "Watch 5,000 episodes",
            "🌌",
            "bg-red-800",
            Category::Viewing,
            |s| s.episodes.watched >= 5000,
            Some(metric("episodes.watched", 5000)),
        ));

        // -- Streak ------------------------------------------------------
        defs.push(def(
            "streak-3",
            "Warming Up",
            "Watch something 3 days in a row",
            "✨",
            "bg-orange-400",
            Category::Streak,
            |s| s.streak.best_days >= 3,
            Some(metric("streak.best_days", 3)),
        ));
        defs.push(def(
            "streak-7",
            "Week Strong",
            "Watch something 7 days in a row",
            "📅",
            "bg-orange-500",
            Category::Streak,
            |s| s.streak.best_days >= 7,
            Some(metric("streak.best_days", 7)),
        ));
        defs.push(def(
            "streak-30",
            "Habitual",
            "Watch something 30 days in a row",
            "🗓️",
            "bg-orange-600",
            Category::Streak,
            |s| s.streak.best_days >= 30,
            Some(metric("streak.best_days", 30)),
        ));
        defs.push(def(
            "streak-100",
            "Unstoppable",
            "Watch something 100 days in a row",
            "⚡",
            "bg-orange-700",
            Category::Streak,
            |s| s.streak.best_days >= 100,
            Some(metric("streak.best_days", 100)),
        ));

        // -- Genres (list-based conditions, no numeric metric) -----------
        defs.push(def(
            "genre-explorer",
            "Genre Explorer",
            "Have titles across 5 different genres",
            "🧭",
            "bg-teal-500",
            Category::Genres,
            |s| s.top_genres.len() >= 5,
            None,
        ));
        defs.push(def(
            "genre-devotee",
            "Devoted Fan",
            "Have 20 titles in a single genre",
            "❤️",
            "bg-teal-600",
            Category::Genres,
            |s| s.top_genres.iter().any(|g| g.count >= 20),
            None,
        ));

        // -- Time --------------------------------------------------------
        defs.push(def(
            "watch-time-day",
            "A Full Day",
            "Accumulate 24 hours of watch time",
            "⏰",
            "bg-indigo-500",
            Category::Time,
            |s| s.episodes.minutes >= 1_440,
            Some(metric("episodes.minutes", 1_440)),
        ));
        defs.push(def(
            "watch-time-week",
            "A Full Week",
            "Accumulate 168 hours of watch time",
            "🕰️",
            "bg-indigo-600",
            Category::Time,
            |s| s.episodes.minutes >= 10_080,
            Some(metric("episodes.minutes", 10_080)),
        ));
        defs.push(def(
            "fresh-hauler",
            "Fresh Haul",
            "Add 5 titles in a single month",
            "🛒",
            "bg-indigo-400",
            Category::Time,
            |s| s.added_this_month >= 5,
            Some(metric("added_this_month", 5)),
        ));

        // -- Special (franchise substring matching, no metric) -----------
        defs.push(def(
            "franchise-star-wars",
            "A Galaxy Far Away",
            "Watch 4 Star Wars titles",
            "🌠",
            "bg-yellow-500",
            Category::Special,
            |s| s.franchise_title_count(STAR_WARS) >= FRANCHISE_THRESHOLD,
            None,
        ));
        defs.push(def(
            "franchise-wizarding",
            "Wizarding Scholar",
            "Watch 4 Wizarding World titles",
            "🪄",
            "bg-yellow-600",
            Category::Special,
            |s| s.franchise_title_count(HARRY_POTTER) >= FRANCHISE_THRESHOLD,
            None,
        ));
        defs.push(def(
            "franchise-middle-earth",
            "There and Back Again",
            "Watch 4 Middle-earth titles",
            "💍",
            "bg-yellow-700",
            Category::Special,
            |s| s.franchise_title_count(LORD_OF_THE_RINGS) >= FRANCHISE_THRESHOLD,
            None,
        ));
        defs.push(def(
            "franchise-marvel",
            "Assembled",
            "Watch 4 Marvel titles",
            "🦸",
            "bg-yellow-800",
            Category::Special,
            |s| s.franchise_title_count(MARVEL) >= FRANCHISE_THRESHOLD,
            None,
        ));

        Self::new(defs)
    }
}

#[allow(clippy::too_many_arguments)]
fn def(
    id: &'static str,
    display_name: &'static str,
    description: &'static str,
    emoji: &'static str,
    color_class: &'static str,
    category: Category,
    predicate: fn(&UserStats) -> bool,
    progress_metric: Option<ProgressMetric>,
) -> AchievementDefinition {
    AchievementDefinition {
        id,
        display_name,
        description,
        emoji,
        color_class,
        category,
        predicate,
        progress_metric,
    }
}

fn metric(path: &'static str, target: u64) -> ProgressMetric {
    ProgressMetric { path, target }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_ids_are_unique() {
        let catalog = AchievementCatalog::standard();
        let mut seen = HashSet::new();
        for definition in catalog.all() {
            assert!(
                seen.insert(definition.id),
                "duplicate achievement id: {}",
                definition.id
            );
        }
    }

    #[test]
    fn test_standard_catalog_covers_every_category() {
        let catalog = AchievementCatalog::standard();
        let categories: HashSet<_> = catalog.all().iter().map(|d| d.category).collect();
        assert!(categories.contains(&Category::Collection));
        assert!(categories.contains(&Category::Viewing));
        assert!(categories.contains(&Category::Streak));
        assert!(categories.contains(&Category::Genres));
        assert!(categories.contains(&Category::Time));
        assert!(categories.contains(&Category::Special));
    }

    #[test]
    fn test_metric_paths_resolve_against_stats() {
        // Every declared progress path must reach a numeric field, otherwise
        // progress for that achievement silently flatlines at 0.
        let catalog = AchievementCatalog::standard();
        let value = serde_json::to_value(UserStats::default()).unwrap();

        for definition in catalog.all() {
            if let Some(m) = definition.progress_metric {
                assert!(
                    crate::achievements::metric::resolve(&value, m.path).is_some(),
                    "metric path {} for {} does not resolve",
                    m.path,
                    definition.id
                );
                assert!(m.target > 0, "zero target for {}", definition.id);
            }
        }
    }

    #[test]
    fn test_get_by_id() {
        let catalog = AchievementCatalog::standard();
        assert!(catalog.get("first-series").is_some());
        assert!(catalog.get("no-such-achievement").is_none());
    }
}
