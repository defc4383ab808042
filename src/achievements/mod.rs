//! Achievement evaluation engine
//!
//! A rule-based classifier that maps a user's aggregated viewing statistics
//! to a set of unlocked achievements, computes partial progress toward locked
//! ones, and reconciles the result against persisted unlock history exactly
//! once per achievement per user.
//!
//! Flow: raw records → stats aggregation → [`Evaluator`] →
//! `{unlocked, upcoming, summary}` → [`Reconciler`] → unlock rows +
//! notifications.

pub mod catalog;
pub mod evaluator;
pub mod metric;
pub mod reconciler;

pub use catalog::AchievementCatalog;
pub use evaluator::{AchievementSummary, Evaluator, UpcomingAchievement, DEFAULT_UPCOMING_LIMIT};
pub use reconciler::{Notifier, Reconciler, ReconcileOutcome, UnlockStore};
