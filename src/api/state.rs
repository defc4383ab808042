use std::sync::Arc;

use crate::achievements::{AchievementCatalog, Notifier, Reconciler, UnlockStore};
use crate::services::{MetadataClient, StatsProvider};

/// Shared application state
///
/// The catalog is immutable process-wide state; the store, notifier, and
/// stats provider are seams with Postgres implementations in production and
/// in-memory ones in tests.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<AchievementCatalog>,
    pub stats: Arc<dyn StatsProvider>,
    pub reconciler: Arc<Reconciler>,
    /// Absent when no metadata API key is configured; the search route then
    /// reports 404
    pub metadata: Option<MetadataClient>,
}

impl AppState {
    pub fn new(
        catalog: Arc<AchievementCatalog>,
        stats: Arc<dyn StatsProvider>,
        store: Arc<dyn UnlockStore>,
        notifier: Arc<dyn Notifier>,
        metadata: Option<MetadataClient>,
    ) -> Self {
        let reconciler = Arc::new(Reconciler::new(catalog.clone(), store, notifier));
        Self {
            catalog,
            stats,
            reconciler,
            metadata,
        }
    }
}
