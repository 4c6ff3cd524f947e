//! Meal repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::MealStore;
use crate::models::{Meal, MealFields, MealOrder};

/// Meal repository for database operations
#[derive(Clone)]
pub struct MealRepository {
    pool: PgPool,
}

impl MealRepository {
    /// Create a new meal repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn meal_from_row(row: &PgRow) -> Meal {
    Meal {
        id: row.get("id"),
        owner_id: row.get("user_id"),
        name: row.get("name"),
        description: row.get("description"),
        occurred_at: row.get("date"),
        is_on_diet: row.get("is_on_diet"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl MealStore for MealRepository {
    async fn insert(&self, meal: &Meal) -> DatabaseResult<()> {
        info!("Inserting meal {} for user {}", meal.id, meal.owner_id);

        sqlx::query(
            r#"
            INSERT INTO meals (id, user_id, name, description, date, is_on_diet, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(meal.id)
        .bind(meal.owner_id)
        .bind(&meal.name)
        .bind(&meal.description)
        .bind(meal.occurred_at)
        .bind(meal.is_on_diet)
        .bind(meal.created_at)
        .bind(meal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Meal>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, name, description, date, is_on_diet, created_at, updated_at
            FROM meals
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(meal_from_row))
    }

    async fn list_by_owner(&self, owner_id: Uuid, order: MealOrder) -> DatabaseResult<Vec<Meal>> {
        let query = match order {
            MealOrder::RecentFirst => {
                r#"
                SELECT id, user_id, name, description, date, is_on_diet, created_at, updated_at
                FROM meals
                WHERE user_id = $1
                ORDER BY date DESC, seq DESC
                "#
            }
            MealOrder::Insertion => {
                r#"
                SELECT id, user_id, name, description, date, is_on_diet, created_at, updated_at
                FROM meals
                WHERE user_id = $1
                ORDER BY seq ASC
                "#
            }
        };

        let rows = sqlx::query(query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(meal_from_row).collect())
    }

    async fn update(
        &self,
        id: Uuid,
        fields: &MealFields,
        updated_at: DateTime<Utc>,
    ) -> DatabaseResult<Option<Meal>> {
        info!("Updating meal: {}", id);

        let row = sqlx::query(
            r#"
            UPDATE meals
            SET name = $2, description = $3, date = $4, is_on_diet = $5, updated_at = $6
            WHERE id = $1
            RETURNING id, user_id, name, description, date, is_on_diet, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.occurred_at)
        .bind(fields.is_on_diet)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(meal_from_row))
    }

    async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        info!("Deleting meal: {}", id);

        let result = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
