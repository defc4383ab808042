use chrono::{Datelike, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    EpisodeCounts, GenreCount, MovieCounts, SeriesCounts, StreakStats, UserStats, WatchedTitle,
};

/// How many favorite genres the snapshot carries
const TOP_GENRE_LIMIT: i64 = 5;

/// Produces the aggregated [`UserStats`] snapshot the evaluator consumes.
///
/// A fresh snapshot is built for every call; nothing here is cached or
/// persisted. A read failure propagates to the caller so reconciliation
/// never runs against partial or defaulted stats.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StatsProvider: Send + Sync {
    async fn stats_for(&self, user_id: Uuid) -> AppResult<UserStats>;
}

/// Aggregates stats from the user's library tables in Postgres
#[derive(Clone)]
pub struct PgStatsProvider {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct TitleRow {
    name: String,
    original_name: Option<String>,
    runtime_minutes: Option<i64>,
}

impl PgStatsProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn series_counts(&self, user_id: Uuid) -> AppResult<SeriesCounts> {
        let (total, watching, completed, pending): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'watching'), \
                    COUNT(*) FILTER (WHERE status = 'completed'), \
                    COUNT(*) FILTER (WHERE status = 'pending') \
             FROM library_entries \
             WHERE user_id = $1 AND kind = 'series'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SeriesCounts {
            total: total as u64,
            watching: watching as u64,
            completed: completed as u64,
            pending: pending as u64,
        })
    }

    async fn movie_counts(&self, user_id: Uuid) -> AppResult<MovieCounts> {
        let (total, watched, pending): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status = 'watched'), \
                    COUNT(*) FILTER (WHERE status = 'pending') \
             FROM library_entries \
             WHERE user_id = $1 AND kind = 'movie'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(MovieCounts {
            total: total as u64,
            watched: watched as u64,
            pending: pending as u64,
        })
    }

    async fn episode_counts(&self, user_id: Uuid) -> AppResult<EpisodeCounts> {
        let (watched, minutes): (i64, Option<i64>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(runtime_minutes) \
             FROM episode_watches \
             WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EpisodeCounts {
            watched: watched as u64,
            minutes: minutes.unwrap_or(0) as u64,
        })
    }

    async fn top_genres(&self, user_id: Uuid) -> AppResult<Vec<GenreCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT g.name, COUNT(*) AS titles \
             FROM library_entries e \
             JOIN entry_genres g ON g.entry_id = e.id \
             WHERE e.user_id = $1 \
             GROUP BY g.name \
             ORDER BY titles DESC, g.name \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(TOP_GENRE_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| GenreCount {
                name,
                count: count as u64,
            })
            .collect())
    }

    async fn streaks(&self, user_id: Uuid) -> AppResult<StreakStats> {
        let rows: Vec<(chrono::NaiveDate,)> = sqlx::query_as(
            "SELECT DISTINCT watched_at::date AS day \
             FROM episode_watches \
             WHERE user_id = $1 \
             ORDER BY day",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let days: Vec<chrono::NaiveDate> = rows.into_iter().map(|(day,)| day).collect();
        Ok(compute_streaks(&days, Utc::now().date_naive()))
    }

    async fn added_this_month(&self, user_id: Uuid) -> AppResult<u64> {
        let now = Utc::now();
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) \
             FROM library_entries \
             WHERE user_id = $1 \
               AND EXTRACT(YEAR FROM added_at) = $2 \
               AND EXTRACT(MONTH FROM added_at) = $3",
        )
        .bind(user_id)
        .bind(now.year())
        .bind(now.month() as i32)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    async fn watched_titles(&self, user_id: Uuid, kind: &str, status: &str) -> AppResult<Vec<WatchedTitle>> {
        let rows: Vec<TitleRow> = sqlx::query_as(
            "SELECT name, original_name, runtime_minutes \
             FROM library_entries \
             WHERE user_id = $1 AND kind = $2 AND status = $3",
        )
        .bind(user_id)
        .bind(kind)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| WatchedTitle {
                name: row.name,
                original_name: row.original_name,
                runtime_minutes: row.runtime_minutes.map(|m| m as u64),
            })
            .collect())
    }
}

/// Computes best and current consecutive-day streaks from sorted, distinct
/// activity dates. A run still counts as current if its last day is today
/// or yesterday.
fn compute_streaks(days: &[chrono::NaiveDate], today: chrono::NaiveDate) -> StreakStats {
    let mut best: u64 = 0;
    let mut run: u64 = 0;
    let mut run_end: Option<chrono::NaiveDate> = None;

    for &day in days {
        run = match run_end {
            Some(prev) if (day - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        run_end = Some(day);
        best = best.max(run);
    }

    let current = match run_end {
        Some(end) if (today - end).num_days() <= 1 => run,
        _ => 0,
    };

    StreakStats {
        current_days: current,
        best_days: best,
    }
}

#[async_trait::async_trait]
impl StatsProvider for PgStatsProvider {
    async fn stats_for(&self, user_id: Uuid) -> AppResult<UserStats> {
        let series = self.series_counts(user_id).await?;
        let movies = self.movie_counts(user_id).await?;
        let episodes = self.episode_counts(user_id).await?;
        let top_genres = self.top_genres(user_id).await?;
        let streak = self.streaks(user_id).await?;
        let added_this_month = self.added_this_month(user_id).await?;
        let watched_movies = self.watched_titles(user_id, "movie", "watched").await?;
        let completed_series = self.watched_titles(user_id, "series", "completed").await?;

        tracing::debug!(
            user_id = %user_id,
            series_total = series.total,
            movies_total = movies.total,
            episodes_watched = episodes.watched,
            "Built user stats snapshot"
        );

        Ok(UserStats {
            series,
            movies,
            episodes,
            top_genres,
            streak,
            added_this_month,
            watched_movies,
            completed_series,
        })
    }
}
