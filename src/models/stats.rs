use serde::{Deserialize, Serialize};

/// Aggregated viewing statistics for a single user.
///
/// Built fresh for every evaluation by a [`StatsProvider`] and never
/// persisted; it is a derived read model over the user's library.
///
/// [`StatsProvider`]: crate::services::StatsProvider
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub series: SeriesCounts,
    pub movies: MovieCounts,
    pub episodes: EpisodeCounts,
    /// Most-watched genres, largest first (at most a handful)
    #[serde(default)]
    pub top_genres: Vec<GenreCount>,
    pub streak: StreakStats,
    /// Titles added to the library during the current calendar month
    #[serde(default)]
    pub added_this_month: u64,
    /// Watched movies with enough descriptive fields for franchise matching
    #[serde(default)]
    pub watched_movies: Vec<WatchedTitle>,
    /// Fully completed series, same shape as `watched_movies`
    #[serde(default)]
    pub completed_series: Vec<WatchedTitle>,
}

/// Series counts broken down by library status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeriesCounts {
    pub total: u64,
    pub watching: u64,
    pub completed: u64,
    pub pending: u64,
}

/// Movie counts broken down by library status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieCounts {
    pub total: u64,
    pub watched: u64,
    pub pending: u64,
}

/// Episode-level viewing totals
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeCounts {
    /// Episodes marked as watched
    pub watched: u64,
    /// Cumulative watched runtime in minutes
    pub minutes: u64,
}

/// A genre and how many library titles carry it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenreCount {
    pub name: String,
    pub count: u64,
}

/// Consecutive-active-day streaks
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakStats {
    pub current_days: u64,
    pub best_days: u64,
}

/// A watched title with the fields franchise detection needs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchedTitle {
    pub name: String,
    /// Original-language name, when it differs from the display name
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub runtime_minutes: Option<u64>,
}

impl WatchedTitle {
    /// True when the display or original-language name contains any of the
    /// given keywords, case-insensitively. Matching is deliberately naive
    /// substring comparison with no diacritic normalization; franchise
    /// keyword lists carry both Spanish and English spellings to compensate.
    pub fn matches_any(&self, keywords: &[&str]) -> bool {
        let name = self.name.to_lowercase();
        let original = self
            .original_name
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();

        keywords.iter().any(|kw| {
            let kw = kw.to_lowercase();
            name.contains(&kw) || original.contains(&kw)
        })
    }
}

impl UserStats {
    /// Counts watched titles (movies and completed series) whose name matches
    /// any of the given franchise keywords.
    pub fn franchise_title_count(&self, keywords: &[&str]) -> usize {
        self.watched_movies
            .iter()
            .chain(self.completed_series.iter())
            .filter(|title| title.matches_any(keywords))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(name: &str, original: Option<&str>) -> WatchedTitle {
        WatchedTitle {
            name: name.to_string(),
            original_name: original.map(String::from),
            runtime_minutes: None,
        }
    }

    #[test]
    fn test_matches_any_is_case_insensitive() {
        let t = title("STAR WARS: A New Hope", None);
        assert!(t.matches_any(&["star wars"]));
    }

    #[test]
    fn test_matches_any_checks_original_name() {
        let t = title("La guerra de las galaxias", Some("Star Wars"));
        assert!(t.matches_any(&["star wars"]));
    }

    #[test]
    fn test_matches_any_does_not_normalize_diacritics() {
        // "senor" without the tilde must NOT match "señor"
        let t = title("El Señor de los Anillos", None);
        assert!(!t.matches_any(&["senor de los anillos"]));
        assert!(t.matches_any(&["señor de los anillos"]));
    }

    #[test]
    fn test_franchise_title_count_spans_movies_and_series() {
        let stats = UserStats {
            watched_movies: vec![
                title("Harry Potter and the Philosopher's Stone", None),
                title("Harry Potter and the Chamber of Secrets", None),
                title("The Matrix", None),
            ],
            completed_series: vec![title("Harry Potter: Wizards of Baking", None)],
            ..Default::default()
        };

        assert_eq!(stats.franchise_title_count(&["harry potter"]), 3);
    }
}
