//! Meal ledger: CRUD over meals, always scoped to the session's user

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Meal, MealFields, MealOrder, User, stored_now},
    repositories::MealStore,
};

/// What the caller intends to do with a meal it asked for by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealAccess {
    Read,
    Mutate,
}

impl MealAccess {
    /// Outcome when the meal is missing or owned by someone else. The two
    /// cases are never told apart.
    fn denied(self) -> ApiError {
        match self {
            MealAccess::Read => ApiError::NotFound("Meal not found".to_string()),
            MealAccess::Mutate => ApiError::Unauthorized,
        }
    }
}

/// Meal ledger
#[derive(Clone)]
pub struct MealLedger {
    meals: Arc<dyn MealStore>,
}

impl MealLedger {
    /// Create a new meal ledger
    pub fn new(meals: Arc<dyn MealStore>) -> Self {
        Self { meals }
    }

    /// Load `meal_id` if and only if it belongs to `owner`
    pub async fn authorize(
        &self,
        owner: &User,
        meal_id: Uuid,
        access: MealAccess,
    ) -> ApiResult<Meal> {
        match self.meals.find_by_id(meal_id).await? {
            Some(meal) if meal.owner_id == owner.id => Ok(meal),
            _ => Err(access.denied()),
        }
    }

    /// Record a new meal for `owner`
    pub async fn create(&self, owner: &User, fields: MealFields) -> ApiResult<Meal> {
        let meal = Meal::new(owner.id, fields, stored_now());
        self.meals.insert(&meal).await?;
        Ok(meal)
    }

    /// Overwrite name, description, date and diet flag of an owned meal
    pub async fn update(
        &self,
        owner: &User,
        meal_id: Uuid,
        fields: MealFields,
    ) -> ApiResult<Meal> {
        let meal = self.authorize(owner, meal_id, MealAccess::Mutate).await?;

        // Never move updated_at backwards, even if the clock does.
        let now = stored_now().max(meal.updated_at);
        self.meals
            .update(meal.id, &fields, now)
            .await?
            .ok_or_else(|| MealAccess::Mutate.denied())
    }

    /// Permanently remove an owned meal
    pub async fn delete(&self, owner: &User, meal_id: Uuid) -> ApiResult<()> {
        let meal = self.authorize(owner, meal_id, MealAccess::Mutate).await?;

        if self.meals.delete(meal.id).await? {
            Ok(())
        } else {
            Err(MealAccess::Mutate.denied())
        }
    }

    /// Fetch an owned meal
    pub async fn get(&self, owner: &User, meal_id: Uuid) -> ApiResult<Meal> {
        self.authorize(owner, meal_id, MealAccess::Read).await
    }

    /// Every meal of `owner`, most recent first
    pub async fn list(&self, owner: &User) -> ApiResult<Vec<Meal>> {
        Ok(self
            .meals
            .list_by_owner(owner.id, MealOrder::RecentFirst)
            .await?)
    }
}
