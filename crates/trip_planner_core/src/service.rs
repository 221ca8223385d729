//! crates/trip_planner_core/src/service.rs
//!
//! The application service. Every boundary operation on plans and users goes
//! through [`PlannerService`], which owns the read-modify-write cycle:
//!
//! 1. take the per-plan lock, so mutations of one plan inside this process
//!    run one at a time;
//! 2. load the plan, apply the mutation in memory, and save it with a
//!    version check;
//! 3. on a version conflict (another process wrote in between), reload and
//!    re-apply, up to `max_write_retries` times.
//!
//! A mutation that fails validation is never saved.

use chrono::{Local, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{Category, DateOption, NewPlan, NewUser, Plan, User};
use crate::ledger::CategoryRecords;
use crate::lifecycle::StatusUpdate;
use crate::ports::{PlanStore, PortError, PortResult, UserStore};
use crate::votes::VoteEntry;

pub const DEFAULT_WRITE_RETRIES: u32 = 3;

//=========================================================================================
// Per-Plan Locks
//=========================================================================================

/// One async mutex per plan id, created on demand.
#[derive(Default)]
struct PlanLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl PlanLocks {
    async fn acquire(&self, plan_id: Uuid) -> PortResult<OwnedMutexGuard<()>> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| PortError::Store("plan lock table poisoned".to_string()))?;
            // Drop locks nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(plan_id).or_default().clone()
        };
        Ok(lock.lock_owned().await)
    }
}

//=========================================================================================
// The Service
//=========================================================================================

pub struct PlannerService {
    plans: Arc<dyn PlanStore>,
    users: Arc<dyn UserStore>,
    locks: PlanLocks,
    max_write_retries: u32,
}

impl PlannerService {
    pub fn new(plans: Arc<dyn PlanStore>, users: Arc<dyn UserStore>) -> Self {
        Self {
            plans,
            users,
            locks: PlanLocks::default(),
            max_write_retries: DEFAULT_WRITE_RETRIES,
        }
    }

    pub fn with_write_retries(mut self, max_write_retries: u32) -> Self {
        self.max_write_retries = max_write_retries;
        self
    }

    /// Runs `mutate` against the latest stored plan and saves the result.
    async fn mutate_plan<T, F>(&self, plan_id: Uuid, mut mutate: F) -> PortResult<(Plan, T)>
    where
        F: FnMut(&mut Plan) -> PortResult<T>,
    {
        let _guard = self.locks.acquire(plan_id).await?;
        let mut attempt = 0;
        loop {
            let mut plan = self.plans.get_plan(plan_id).await?;
            let output = mutate(&mut plan)?;
            match self.plans.save_plan(plan).await {
                Ok(saved) => return Ok((saved, output)),
                Err(PortError::Conflict(reason)) if attempt < self.max_write_retries => {
                    attempt += 1;
                    warn!(%plan_id, attempt, %reason, "Plan changed during update, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    // --- Plan Lifecycle ---

    pub async fn create_plan(&self, draft: NewPlan) -> PortResult<Plan> {
        self.create_plan_on(draft, Local::now().date_naive()).await
    }

    /// Creates a plan as if today were `today`.
    pub async fn create_plan_on(&self, draft: NewPlan, today: NaiveDate) -> PortResult<Plan> {
        let plan = self.plans.insert_plan(Plan::new(draft, today)).await?;
        info!(plan_id = %plan.id, name = %plan.name, "Plan created");
        Ok(plan)
    }

    pub async fn get_plan(&self, plan_id: Uuid) -> PortResult<Plan> {
        self.plans.get_plan(plan_id).await
    }

    pub async fn update_plan_status(&self, plan_id: Uuid, update: StatusUpdate) -> PortResult<Plan> {
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| plan.apply_status_update(update.clone()))
            .await?;
        info!(%plan_id, status = %plan.status_plan, stage = %plan.status_stage, "Plan status updated");
        Ok(plan)
    }

    pub async fn add_user_to_plan(&self, plan_id: Uuid, user_id: &str) -> PortResult<Plan> {
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| {
                plan.add_user(user_id);
                Ok(())
            })
            .await?;
        Ok(plan)
    }

    // --- Category Ledger ---

    pub async fn append_to_category(
        &self,
        plan_id: Uuid,
        records: CategoryRecords,
    ) -> PortResult<Plan> {
        let category = records.category();
        let count = records.len();
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| {
                plan.append_records(records.clone());
                Ok(())
            })
            .await?;
        debug!(%plan_id, %category, count, "Records appended");
        Ok(plan)
    }

    pub async fn replace_category(
        &self,
        plan_id: Uuid,
        records: CategoryRecords,
    ) -> PortResult<Plan> {
        let category = records.category();
        let count = records.len();
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| {
                plan.replace_records(records.clone());
                Ok(())
            })
            .await?;
        info!(%plan_id, %category, count, "Category replaced");
        Ok(plan)
    }

    pub async fn update_dates(
        &self,
        plan_id: Uuid,
        added_dates: Vec<DateOption>,
        length_stay: Vec<u32>,
        submitting_user_ids: Vec<String>,
    ) -> PortResult<Plan> {
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| {
                plan.append_dates(
                    added_dates.clone(),
                    length_stay.clone(),
                    submitting_user_ids.clone(),
                );
                Ok(())
            })
            .await?;
        Ok(plan)
    }

    pub async fn set_final_date_options(
        &self,
        plan_id: Uuid,
        options: Vec<DateOption>,
    ) -> PortResult<Plan> {
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| {
                plan.append_final_date_options(options.clone());
                Ok(())
            })
            .await?;
        Ok(plan)
    }

    /// Distinct values of a plan field. Missing plans read as empty.
    pub async fn get_category_field(&self, plan_id: Uuid, field: &str) -> PortResult<Vec<Value>> {
        match self.plans.get_plan(plan_id).await {
            Ok(plan) => plan.field_values(field),
            Err(PortError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    // --- Vote Aggregator ---

    pub async fn submit_votes(
        &self,
        plan_id: Uuid,
        category: Category,
        batch: Vec<VoteEntry>,
    ) -> PortResult<Plan> {
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| plan.apply_votes(category, &batch))
            .await?;
        info!(%plan_id, %category, entries = batch.len(), "Votes recorded");
        Ok(plan)
    }

    // --- Submission Tracker ---

    pub async fn record_submission(
        &self,
        plan_id: Uuid,
        category: Category,
        user_id: &str,
    ) -> PortResult<Plan> {
        let (plan, ()) = self
            .mutate_plan(plan_id, |plan| {
                plan.record_submission(category, user_id);
                Ok(())
            })
            .await?;
        debug!(%plan_id, %category, user_id, "Submission recorded");
        Ok(plan)
    }

    pub async fn has_submitted(
        &self,
        plan_id: Uuid,
        category: Category,
        user_id: &str,
    ) -> PortResult<bool> {
        let plan = self.plans.get_plan(plan_id).await?;
        Ok(plan.has_submitted(category, user_id))
    }

    /// False when the plan does not exist.
    pub async fn has_submitted_dates(&self, plan_id: Uuid, user_id: &str) -> PortResult<bool> {
        match self.plans.get_plan(plan_id).await {
            Ok(plan) => Ok(plan.has_submitted_dates(user_id)),
            Err(PortError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // --- Users ---

    pub async fn create_user(&self, draft: NewUser) -> PortResult<User> {
        let user = self.users.insert_user(User::new(draft)).await?;
        info!(user_id = %user.id, auth_id = %user.auth_id, "User created");
        Ok(user)
    }

    pub async fn list_users(&self) -> PortResult<Vec<User>> {
        self.users.list_users().await
    }

    pub async fn get_user(&self, auth_id: &str) -> PortResult<User> {
        self.users.get_user_by_auth_id(auth_id).await
    }

    pub async fn add_plan_to_user(&self, auth_id: &str, plan_id: Uuid) -> PortResult<User> {
        self.users.push_user_plan(auth_id, plan_id).await
    }

    /// Distinct plan ids of a user, in the order they were added.
    /// An unknown user has no plans.
    pub async fn get_user_plans(&self, auth_id: &str) -> PortResult<Vec<Uuid>> {
        let user = match self.users.get_user_by_auth_id(auth_id).await {
            Ok(user) => user,
            Err(PortError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut plans: Vec<Uuid> = Vec::with_capacity(user.plans.len());
        for plan_id in user.plans {
            if !plans.contains(&plan_id) {
                plans.push(plan_id);
            }
        }
        Ok(plans)
    }
}
