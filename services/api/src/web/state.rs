//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use trip_planner_core::PlannerService;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<PlannerService>,
    pub config: Arc<Config>,
}
