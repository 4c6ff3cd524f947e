//! API models for request and response payloads

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod meal;
pub mod user;

pub use meal::{Meal, MealFields, MealOrder};
pub use user::{NewUser, User};

/// Fractional second digits a `TIMESTAMPTZ` column keeps
const STORED_SUBSEC_DIGITS: u16 = 6;

/// Round `at` down to the precision the record store keeps
pub fn stored_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(STORED_SUBSEC_DIGITS)
}

/// Current time, already at record store precision
pub fn stored_now() -> DateTime<Utc> {
    stored_precision(Utc::now())
}

/// Request for user registration
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterUserRequest {
    pub name: String,
    pub email: String,
}

/// Request for a new session
#[derive(Debug, Deserialize, Serialize)]
pub struct CreateSessionRequest {
    pub email: String,
}

/// Request body shared by meal creation and update
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Accepts RFC 3339 or `YYYY-MM-DD[ HH:MM:SS]`
    pub date: String,
    pub is_on_diet: bool,
}

/// Response for user operations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Response for meal listing
#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub meals: Vec<Meal>,
}
