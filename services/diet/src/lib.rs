//! Diet tracking service
//!
//! Users register with a name and email, hold one rotating session token
//! and record meals as on or off their diet. The service reports adherence
//! metrics over those meals.

use sqlx::migrate::Migrator;

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

/// Schema migrations embedded from `migrations/`
pub static MIGRATOR: Migrator = sqlx::migrate!();
