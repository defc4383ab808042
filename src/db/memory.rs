use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::achievements::{Notifier, UnlockStore};
use crate::error::{AppError, AppResult};
use crate::models::{Notification, UserStats};
use crate::services::StatsProvider;

/// In-memory unlock store for tests and local runs without Postgres.
///
/// Mirrors the Postgres semantics: inserts are keyed on
/// `(user_id, achievement_id)` and a duplicate insert reports `false`.
#[derive(Default)]
pub struct MemoryUnlockStore {
    records: Mutex<HashSet<(Uuid, String)>>,
}

impl MemoryUnlockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UnlockStore for MemoryUnlockStore {
    async fn unlocked_ids(&self, user_id: Uuid) -> AppResult<HashSet<String>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, id)| id.clone())
            .collect())
    }

    async fn insert_if_absent(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        _unlocked_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut records = self.records.lock().unwrap();
        Ok(records.insert((user_id, achievement_id.to_string())))
    }
}

/// Notifier that collects messages in memory for inspection
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<(Uuid, Notification)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(Uuid, Notification)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, user_id: Uuid, notification: Notification) -> AppResult<()> {
        self.sent.lock().unwrap().push((user_id, notification));
        Ok(())
    }
}

/// Stats provider serving pre-seeded snapshots, keyed by user
#[derive(Default)]
pub struct MemoryStatsProvider {
    stats: Mutex<HashMap<Uuid, UserStats>>,
}

impl MemoryStatsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, user_id: Uuid, stats: UserStats) {
        self.stats.lock().unwrap().insert(user_id, stats);
    }
}

#[async_trait::async_trait]
impl StatsProvider for MemoryStatsProvider {
    async fn stats_for(&self, user_id: Uuid) -> AppResult<UserStats> {
        self.stats
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("no stats for user {}", user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_duplicate_insert_is_noop() {
        let store = MemoryUnlockStore::new();
        let user = Uuid::new_v4();

        assert!(store
            .insert_if_absent(user, "first-series", Utc::now())
            .await
            .unwrap());
        assert!(!store
            .insert_if_absent(user, "first-series", Utc::now())
            .await
            .unwrap());

        let ids = store.unlocked_ids(user).await.unwrap();
        assert_eq!(ids, HashSet::from(["first-series".to_string()]));
    }

    #[tokio::test]
    async fn test_memory_store_isolates_users() {
        let store = MemoryUnlockStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .insert_if_absent(alice, "first-movie", Utc::now())
            .await
            .unwrap();

        assert!(store.unlocked_ids(bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_stats_provider_missing_user() {
        let provider = MemoryStatsProvider::new();
        let result = provider.stats_for(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
