//! Repositories for database operations
//!
//! The core reaches storage only through [`UserStore`] and [`MealStore`].
//! [`UserRepository`] and [`meal::MealRepository`] back them with PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use crate::models::{Meal, MealFields, MealOrder, User};

pub mod meal;
#[cfg(test)]
pub mod memory;

/// Keyed storage for users
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user; duplicate email or id is a unique violation
    async fn insert(&self, user: &User) -> DatabaseResult<()>;

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_session_token(&self, token: &str) -> DatabaseResult<Option<User>>;

    /// Overwrite the user's session token. Returns false if no such user.
    async fn update_session_token(&self, user_id: Uuid, token: &str) -> DatabaseResult<bool>;
}

/// Keyed storage for meals
#[async_trait]
pub trait MealStore: Send + Sync {
    async fn insert(&self, meal: &Meal) -> DatabaseResult<()>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Meal>>;

    /// All meals owned by `owner_id`, in the requested order
    async fn list_by_owner(&self, owner_id: Uuid, order: MealOrder) -> DatabaseResult<Vec<Meal>>;

    /// Overwrite the editable fields of a meal. Returns the stored row, or
    /// `None` if no meal has this id.
    async fn update(
        &self,
        id: Uuid,
        fields: &MealFields,
        updated_at: DateTime<Utc>,
    ) -> DatabaseResult<Option<Meal>>;

    /// Returns false if no meal had this id
    async fn delete(&self, id: Uuid) -> DatabaseResult<bool>;
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        session_token: row.get("session_token"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, user: &User) -> DatabaseResult<()> {
        info!("Inserting user: {}", user.id);

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, session_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.session_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, session_token, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_session_token(&self, token: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, session_token, created_at, updated_at
            FROM users
            WHERE session_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn update_session_token(&self, user_id: Uuid, token: &str) -> DatabaseResult<bool> {
        info!("Rotating session token for user: {}", user_id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET session_token = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
