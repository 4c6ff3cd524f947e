//! In-memory record store used by tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{MealStore, UserStore};
use crate::models::{Meal, MealFields, MealOrder, User, stored_now, stored_precision};

/// Vectors keep insertion order, which the `Insertion` scan relies on.
/// Timestamps are kept at `TIMESTAMPTZ` precision.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    meals: Mutex<Vec<Meal>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }
}

fn stored_user(user: &User) -> User {
    User {
        created_at: stored_precision(user.created_at),
        updated_at: stored_precision(user.updated_at),
        ..user.clone()
    }
}

fn stored_meal(meal: &Meal) -> Meal {
    Meal {
        occurred_at: stored_precision(meal.occurred_at),
        created_at: stored_precision(meal.created_at),
        updated_at: stored_precision(meal.updated_at),
        ..meal.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> DatabaseResult<()> {
        let mut users = self.users.lock().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(DatabaseError::UniqueViolation("users_pkey".to_string()));
        }
        users.push(stored_user(user));
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_session_token(&self, token: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .find(|u| u.session_token.as_deref() == Some(token))
            .cloned())
    }

    async fn update_session_token(&self, user_id: Uuid, token: &str) -> DatabaseResult<bool> {
        let mut users = self.users.lock().await;
        match users.iter_mut().find(|u| u.id == user_id) {
            Some(user) => {
                user.session_token = Some(token.to_string());
                user.updated_at = stored_now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn insert(&self, meal: &Meal) -> DatabaseResult<()> {
        let mut meals = self.meals.lock().await;
        if meals.iter().any(|m| m.id == meal.id) {
            return Err(DatabaseError::UniqueViolation("meals_pkey".to_string()));
        }
        meals.push(stored_meal(meal));
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Meal>> {
        let meals = self.meals.lock().await;
        Ok(meals.iter().find(|m| m.id == id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid, order: MealOrder) -> DatabaseResult<Vec<Meal>> {
        let meals = self.meals.lock().await;
        let mut owned: Vec<Meal> = meals
            .iter()
            .filter(|m| m.owner_id == owner_id)
            .cloned()
            .collect();

        if order == MealOrder::RecentFirst {
            // Reverse first so the stable sort leaves later insertions ahead on ties.
            owned.reverse();
            owned.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        }

        Ok(owned)
    }

    async fn update(
        &self,
        id: Uuid,
        fields: &MealFields,
        updated_at: DateTime<Utc>,
    ) -> DatabaseResult<Option<Meal>> {
        let mut meals = self.meals.lock().await;
        Ok(meals.iter_mut().find(|m| m.id == id).map(|meal| {
            meal.apply(fields, updated_at);
            *meal = stored_meal(meal);
            meal.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let mut meals = self.meals.lock().await;
        let before = meals.len();
        meals.retain(|m| m.id != id);
        Ok(meals.len() < before)
    }
}
