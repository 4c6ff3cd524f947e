//! Input validation utilities
//!
//! Request bodies are shape-checked by serde; the functions here enforce the
//! content rules before a payload is handed to the core.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::OnceLock;

use crate::{
    error::ApiError,
    models::{MealFields, MealRequest, NewUser, RegisterUserRequest, stored_precision},
};

const MAX_NAME_LEN: usize = 120;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_EMAIL_LEN: usize = 254;

/// Validate a display or meal name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("Name must be at most {MAX_NAME_LEN} characters long"));
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("Email must be at most {MAX_EMAIL_LEN} characters long"));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a meal description; empty is allowed
pub fn validate_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "Description must be at most {MAX_DESCRIPTION_LEN} characters long"
        ));
    }

    Ok(())
}

/// Parse the caller-supplied meal date
///
/// Naive forms carry no offset and are read as UTC. Sub-microsecond digits
/// are dropped.
pub fn parse_meal_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Ok(stored_precision(date.with_timezone(&Utc)));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(format!("Invalid date: {raw}"))
}

impl TryFrom<RegisterUserRequest> for NewUser {
    type Error = ApiError;

    fn try_from(request: RegisterUserRequest) -> Result<Self, Self::Error> {
        validate_name(&request.name).map_err(ApiError::Validation)?;
        validate_email(&request.email).map_err(ApiError::Validation)?;

        Ok(NewUser {
            name: request.name.trim().to_string(),
            email: request.email,
        })
    }
}

impl TryFrom<MealRequest> for MealFields {
    type Error = ApiError;

    fn try_from(request: MealRequest) -> Result<Self, Self::Error> {
        validate_name(&request.name).map_err(ApiError::Validation)?;
        validate_description(&request.description).map_err(ApiError::Validation)?;
        let occurred_at = parse_meal_date(&request.date).map_err(ApiError::Validation)?;

        Ok(MealFields {
            name: request.name,
            description: request.description,
            occurred_at,
            is_on_diet: request.is_on_diet,
        })
    }
}
