//! crates/trip_planner_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete document store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Plan, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for every core and port operation.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Vote batch for {category} has {received} entries but only {expected} records exist")]
    IndexMismatch {
        category: Category,
        expected: usize,
        received: usize,
    },
    #[error("No record {id} in {category}")]
    UnknownProposal { category: Category, id: Uuid },
    #[error("Cannot change {field} from '{from}' to '{to}'")]
    InvalidTransition {
        field: &'static str,
        from: String,
        to: String,
    },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The document changed between read and write.
    #[error("Write conflict: {0}")]
    Conflict(String),
    #[error("Store failure: {0}")]
    Store(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Store Ports (Traits)
//=========================================================================================

/// Durable plan documents with version-checked replacement.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Persists a new plan. The returned copy carries the stored version.
    async fn insert_plan(&self, plan: Plan) -> PortResult<Plan>;

    async fn get_plan(&self, plan_id: Uuid) -> PortResult<Plan>;

    /// Replaces the stored document if its version still equals `plan.version`.
    ///
    /// Returns the saved plan with its version bumped, `Conflict` if another
    /// writer got there first, or `NotFound` if the plan no longer exists.
    async fn save_plan(&self, plan: Plan) -> PortResult<Plan>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: User) -> PortResult<User>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn get_user_by_auth_id(&self, auth_id: &str) -> PortResult<User>;

    /// Atomically appends `plan_id` to the user's plan list.
    async fn push_user_plan(&self, auth_id: &str, plan_id: Uuid) -> PortResult<User>;
}
