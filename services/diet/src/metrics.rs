//! Adherence metrics over a user's meal history
//!
//! Metrics are folded on demand from a full scan of the user's meals in
//! registration order. The streak depends on that order: it is the run of
//! consecutive on-diet meals as they were recorded, not as dated.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    error::ApiResult,
    models::{Meal, MealOrder, User},
    repositories::MealStore,
};

/// Aggregate adherence statistics for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdherenceMetrics {
    pub total_meals: u64,
    pub on_diet_count: u64,
    pub off_diet_count: u64,
    /// Longest run of consecutive on-diet meals
    pub best_streak: u64,
    /// Run of on-diet meals ending at the latest registered meal
    pub current_streak: u64,
    /// `on_diet / total`, two decimals, half-up, e.g. `"42.86%"`.
    /// `"0.00%"` when there are no meals.
    pub adherence_percentage: String,
}

impl AdherenceMetrics {
    /// Fold meals, in the order given, into a snapshot
    pub fn from_meals<'a>(meals: impl IntoIterator<Item = &'a Meal>) -> Self {
        let mut total_meals: u64 = 0;
        let mut on_diet_count: u64 = 0;
        let mut current: u64 = 0;
        let mut best: u64 = 0;

        for meal in meals {
            total_meals += 1;
            if meal.is_on_diet {
                on_diet_count += 1;
                current += 1;
            } else {
                current = 0;
            }
            best = best.max(current);
        }

        Self {
            total_meals,
            on_diet_count,
            off_diet_count: total_meals - on_diet_count,
            best_streak: best,
            current_streak: current,
            adherence_percentage: format_percentage(on_diet_count, total_meals),
        }
    }
}

/// Render `part / whole` as a percentage with two decimals, rounding half up
fn format_percentage(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0.00%".to_string();
    }

    // Hundredths of a percent, rounded half up in integer arithmetic.
    let basis_points = (part * 20_000 + whole) / (2 * whole);
    format!("{}.{:02}%", basis_points / 100, basis_points % 100)
}

/// Computes metrics snapshots from the meal store
#[derive(Clone)]
pub struct AdherenceEngine {
    meals: Arc<dyn MealStore>,
}

impl AdherenceEngine {
    /// Create a new adherence engine
    pub fn new(meals: Arc<dyn MealStore>) -> Self {
        Self { meals }
    }

    /// Current metrics for `owner`
    pub async fn snapshot(&self, owner: &User) -> ApiResult<AdherenceMetrics> {
        let meals = self
            .meals
            .list_by_owner(owner.id, MealOrder::Insertion)
            .await?;

        Ok(AdherenceMetrics::from_meals(&meals))
    }
}
