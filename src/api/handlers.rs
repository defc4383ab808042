use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::achievements::{
    AchievementSummary, Evaluator, ReconcileOutcome, UpcomingAchievement, DEFAULT_UPCOMING_LIMIT,
};
use crate::error::{AppError, AppResult};
use crate::models::{AchievementDefinition, Category};
use crate::services::TitleSummary;

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct AchievementView {
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub emoji: &'static str,
    pub color_class: &'static str,
    pub category: Category,
}

impl From<&AchievementDefinition> for AchievementView {
    fn from(definition: &AchievementDefinition) -> Self {
        Self {
            id: definition.id,
            display_name: definition.display_name,
            description: definition.description,
            emoji: definition.emoji,
            color_class: definition.color_class,
            category: definition.category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserAchievementsResponse {
    pub summary: AchievementSummary,
    /// Live evaluator output; authoritative for display regardless of
    /// whether persistence has caught up
    pub unlocked: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Lists the full achievement catalog (display metadata only)
pub async fn get_catalog(State(state): State<AppState>) -> Json<Vec<AchievementView>> {
    let views = state.catalog.all().iter().map(AchievementView::from).collect();
    Json(views)
}

/// Current unlock state for a user, derived live from their stats
pub async fn get_user_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserAchievementsResponse>> {
    let stats = state.stats.stats_for(user_id).await?;
    let evaluator = Evaluator::new(&state.catalog);

    let unlocked_set = evaluator.unlocked(&stats);
    // Catalog order, not set order, for a stable response
    let unlocked = state
        .catalog
        .all()
        .iter()
        .map(|d| d.id)
        .filter(|id| unlocked_set.contains(id))
        .collect();

    Ok(Json(UserAchievementsResponse {
        summary: evaluator.summary(&stats),
        unlocked,
    }))
}

/// Locked achievements closest to unlocking, best-first
pub async fn get_upcoming_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<UpcomingParams>,
) -> AppResult<Json<Vec<UpcomingAchievement>>> {
    let stats = state.stats.stats_for(user_id).await?;
    let evaluator = Evaluator::new(&state.catalog);
    let limit = params.limit.unwrap_or(DEFAULT_UPCOMING_LIMIT);

    Ok(Json(evaluator.upcoming(&stats, limit)))
}

/// Re-evaluates the user's stats and persists newly earned achievements
pub async fn reconcile_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ReconcileOutcome>> {
    let stats = state.stats.stats_for(user_id).await?;
    let outcome = state.reconciler.reconcile(user_id, &stats).await?;

    Ok(Json(outcome))
}

/// Proxies title search to the metadata API
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<TitleSummary>>> {
    let Some(metadata) = &state.metadata else {
        return Err(AppError::NotFound("metadata search not configured".to_string()));
    };

    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput("query must not be empty".to_string()));
    }

    let titles = metadata.search_titles(params.q.trim()).await?;
    Ok(Json(titles))
}
