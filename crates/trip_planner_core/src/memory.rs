//! crates/trip_planner_core/src/memory.rs
//!
//! An in-process implementation of the store ports. Used by tests and by the
//! API when no database is configured. Honours the same version contract as
//! the persistent adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Plan, User};
use crate::ports::{PlanStore, PortError, PortResult, UserStore};

#[derive(Default)]
pub struct InMemoryStore {
    plans: RwLock<HashMap<Uuid, Plan>>,
    users: RwLock<Vec<User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for InMemoryStore {
    async fn insert_plan(&self, mut plan: Plan) -> PortResult<Plan> {
        let mut plans = self.plans.write().await;
        if plans.contains_key(&plan.id) {
            return Err(PortError::Conflict(format!("Plan {} already exists", plan.id)));
        }
        plan.version = 1;
        plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn get_plan(&self, plan_id: Uuid) -> PortResult<Plan> {
        self.plans
            .read()
            .await
            .get(&plan_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Plan {} not found", plan_id)))
    }

    async fn save_plan(&self, mut plan: Plan) -> PortResult<Plan> {
        let mut plans = self.plans.write().await;
        let stored = plans
            .get_mut(&plan.id)
            .ok_or_else(|| PortError::NotFound(format!("Plan {} not found", plan.id)))?;

        if stored.version != plan.version {
            return Err(PortError::Conflict(format!(
                "Plan {} is at version {}, write was based on {}",
                plan.id, stored.version, plan.version
            )));
        }
        plan.version += 1;
        *stored = plan.clone();
        Ok(plan)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> PortResult<User> {
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn get_user_by_auth_id(&self, auth_id: &str) -> PortResult<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|user| user.auth_id == auth_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", auth_id)))
    }

    async fn push_user_plan(&self, auth_id: &str, plan_id: Uuid) -> PortResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|user| user.auth_id == auth_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", auth_id)))?;
        user.plans.push(plan_id);
        Ok(user.clone())
    }
}
