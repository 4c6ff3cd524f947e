//! Meal model

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Meal entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    /// When the meal was eaten, as reported by the caller
    #[serde(rename = "date")]
    pub occurred_at: DateTime<Utc>,
    pub is_on_diet: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Meal {
    /// Build a new meal owned by `owner_id`
    pub fn new(owner_id: Uuid, fields: MealFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: fields.name,
            description: fields.description,
            occurred_at: fields.occurred_at,
            is_on_diet: fields.is_on_diet,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the caller-editable fields, leaving identity and creation
    /// time untouched
    pub fn apply(&mut self, fields: &MealFields, now: DateTime<Utc>) {
        self.name = fields.name.clone();
        self.description = fields.description.clone();
        self.occurred_at = fields.occurred_at;
        self.is_on_diet = fields.is_on_diet;
        self.updated_at = now;
    }
}

/// Caller-editable meal fields, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct MealFields {
    pub name: String,
    pub description: String,
    pub occurred_at: DateTime<Utc>,
    pub is_on_diet: bool,
}

/// Scan order for a user's meals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealOrder {
    /// `occurred_at` descending, newest insertion first on ties
    RecentFirst,
    /// The order the meals were registered in
    Insertion,
}
