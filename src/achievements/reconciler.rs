use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Notification, UserStats};

use super::catalog::AchievementCatalog;
use super::evaluator::Evaluator;

/// Persistence seam for unlock records.
///
/// Backed by Postgres in production and an in-memory map in tests. The store
/// is the sole concurrency-correctness mechanism for racing reconciliations:
/// `insert_if_absent` must treat a uniqueness conflict as a successful no-op
/// and report `false`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UnlockStore: Send + Sync {
    /// Achievement ids already persisted for the user
    async fn unlocked_ids(&self, user_id: Uuid) -> AppResult<HashSet<String>>;

    /// Inserts one unlock record unless `(user_id, achievement_id)` already
    /// exists. Returns whether a row was actually inserted.
    async fn insert_if_absent(
        &self,
        user_id: Uuid,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Outbound notification seam; delivery is best-effort
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: Uuid, notification: Notification) -> AppResult<()>;
}

/// Result of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Ids persisted (and notified) by this call
    pub newly_unlocked: Vec<String>,
    /// Ids whose insert failed with a non-conflict error; the next
    /// reconciliation run will retry them from scratch
    pub failed: Vec<String>,
}

/// Turns evaluator output into persisted unlock records and notifications.
///
/// Unlocking is monotonic: an achievement present in the store but no longer
/// satisfied by current stats (after a data correction, say) is never
/// revoked. Reconciliation is idempotent and safe to re-run or race at any
/// time; the store's uniqueness constraint absorbs duplicate inserts.
pub struct Reconciler {
    catalog: Arc<AchievementCatalog>,
    store: Arc<dyn UnlockStore>,
    notifier: Arc<dyn Notifier>,
}

impl Reconciler {
    pub fn new(
        catalog: Arc<AchievementCatalog>,
        store: Arc<dyn UnlockStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            store,
            notifier,
        }
    }

    /// Evaluates `stats`, persists the delta against already-recorded
    /// unlocks, and sends one notification per genuinely new record.
    ///
    /// A failed read of existing records aborts the whole call with no
    /// writes. A failed insert is logged and reported in the outcome without
    /// blocking the remaining delta members. Notification failures are
    /// logged and swallowed; the unlock record is the durable fact.
    pub async fn reconcile(&self, user_id: Uuid, stats: &UserStats) -> AppResult<ReconcileOutcome> {
        let evaluator = Evaluator::new(&self.catalog);
        let currently_unlocked = evaluator.unlocked(stats);

        let already_persisted = self.store.unlocked_ids(user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Failed to read unlock records");
            e
        })?;

        // Catalog order keeps notification order stable across runs
        let delta: Vec<&'static str> = self
            .catalog
            .all()
            .iter()
            .map(|d| d.id)
            .filter(|id| currently_unlocked.contains(id) && !already_persisted.contains(*id))
            .collect();

        if delta.is_empty() {
            tracing::debug!(user_id = %user_id, "No new achievements to reconcile");
            return Ok(ReconcileOutcome::default());
        }

        tracing::info!(
            user_id = %user_id,
            delta_count = delta.len(),
            "Reconciling newly unlocked achievements"
        );

        let mut outcome = ReconcileOutcome::default();

        for id in delta {
            let inserted = match self.store.insert_if_absent(user_id, id, Utc::now()).await {
                Ok(inserted) => inserted,
                Err(e) => {
                    tracing::error!(
                        user_id = %user_id,
                        achievement_id = id,
                        error = %e,
                        "Failed to persist unlock record"
                    );
                    outcome.failed.push(id.to_string());
                    continue;
                }
            };

            if !inserted {
                // Lost a race with a concurrent reconciliation; the other
                // call owns the notification.
                tracing::debug!(
                    user_id = %user_id,
                    achievement_id = id,
                    "Unlock already persisted, skipping"
                );
                continue;
            }

            outcome.newly_unlocked.push(id.to_string());
            self.send_notification(user_id, id).await;
        }

        Ok(outcome)
    }

    async fn send_notification(&self, user_id: Uuid, achievement_id: &str) {
        let Some(definition) = self.catalog.get(achievement_id) else {
            return;
        };

        let notification = Notification::for_unlock(definition);
        if let Err(e) = self.notifier.notify(user_id, notification).await {
            tracing::warn!(
                user_id = %user_id,
                achievement_id,
                error = %e,
                "Failed to send unlock notification"
            );
        }
    }
}
