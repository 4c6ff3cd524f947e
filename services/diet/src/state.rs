//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::SessionConfig,
    ledger::MealLedger,
    metrics::AdherenceEngine,
    repositories::{MealStore, UserStore},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub session_manager: SessionManager,
    pub meal_ledger: MealLedger,
    pub adherence_engine: AdherenceEngine,
    pub session_config: SessionConfig,
}

impl AppState {
    /// Wire the core components over the given stores
    pub fn new(
        users: Arc<dyn UserStore>,
        meals: Arc<dyn MealStore>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            session_manager: SessionManager::new(users),
            meal_ledger: MealLedger::new(meals.clone()),
            adherence_engine: AdherenceEngine::new(meals),
            session_config,
        }
    }
}
