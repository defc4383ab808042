use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::achievements::{Notifier, UnlockStore};
use crate::error::AppResult;
use crate::models::Notification;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Postgres-backed unlock record store
///
/// The `achievement_unlocks` table carries a primary key on
/// `(user_id, achievement_id)`; `ON CONFLICT DO NOTHING` turns a concurrent
/// duplicate insert into a reported no-op, which is the whole concurrency
/// story for racing reconciliations.
#[derive(Clone)]
pub struct PgUnlockStore {
    pool: PgPool,
}

impl PgUnlockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UnlockStore for PgUnlockStore {
    async fn unlocked_ids(&self, user_id: Uuid) -> AppResult<HashSet<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT achievement_id FROM achievement_unlocks WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn insert_if_absent(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO achievement_unlocks (user_id, achievement_id, unlocked_at) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, achievement_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(achievement_id)
        .bind(unlocked_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Notifier that writes into the `notifications` table, from which the
/// frontend polls unread entries
#[derive(Clone)]
pub struct PgNotifier {
    pool: PgPool,
}

impl PgNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Notifier for PgNotifier {
    async fn notify(&self, user_id: Uuid, notification: Notification) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications (user_id, title, body, link, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(&notification.link)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, link = %notification.link, "Notification queued");

        Ok(())
    }
}
