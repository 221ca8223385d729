//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the `PlanStore` and `UserStore` ports from the `core` crate. It handles all
//! interactions with PostgreSQL using `sqlx`.
//!
//! A plan is one JSONB document plus a `version` column. Saves only land when
//! the stored version still matches the one the caller read.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use trip_planner_core::domain::{Plan, User};
use trip_planner_core::ports::{PlanStore, PortError, PortResult, UserStore};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the store ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn store_error(e: sqlx::Error) -> PortError {
    PortError::Store(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct PlanRecord {
    id: Uuid,
    version: i64,
    document: Json<Plan>,
}
impl PlanRecord {
    fn to_domain(self) -> Plan {
        let mut plan = self.document.0;
        plan.id = self.id;
        plan.version = self.version as u64;
        plan
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    auth_id: String,
    plans: Vec<Uuid>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            auth_id: self.auth_id,
            plans: self.plans,
        }
    }
}

//=========================================================================================
// `PlanStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl PlanStore for DbAdapter {
    async fn insert_plan(&self, mut plan: Plan) -> PortResult<Plan> {
        plan.version = 1;
        let record = sqlx::query_as::<_, PlanRecord>(
            "INSERT INTO plans (id, version, document) VALUES ($1, $2, $3) RETURNING id, version, document",
        )
        .bind(plan.id)
        .bind(plan.version as i64)
        .bind(Json(&plan))
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(record.to_domain())
    }

    async fn get_plan(&self, plan_id: Uuid) -> PortResult<Plan> {
        let record = sqlx::query_as::<_, PlanRecord>(
            "SELECT id, version, document FROM plans WHERE id = $1",
        )
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Plan {} not found", plan_id)),
            _ => store_error(e),
        })?;
        Ok(record.to_domain())
    }

    async fn save_plan(&self, mut plan: Plan) -> PortResult<Plan> {
        let expected = plan.version as i64;
        plan.version += 1;

        let saved = sqlx::query_as::<_, PlanRecord>(
            "UPDATE plans SET document = $1, version = version + 1, updated_at = now() \
             WHERE id = $2 AND version = $3 RETURNING id, version, document",
        )
        .bind(Json(&plan))
        .bind(plan.id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        if let Some(record) = saved {
            return Ok(record.to_domain());
        }

        // Nothing matched: either the plan is gone or someone else saved first.
        let current: Option<i64> = sqlx::query_scalar("SELECT version FROM plans WHERE id = $1")
            .bind(plan.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        match current {
            Some(version) => Err(PortError::Conflict(format!(
                "Plan {} is at version {}, write was based on {}",
                plan.id, version, expected
            ))),
            None => Err(PortError::NotFound(format!("Plan {} not found", plan.id))),
        }
    }
}

//=========================================================================================
// `UserStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserStore for DbAdapter {
    async fn insert_user(&self, user: User) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, auth_id, plans) VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, auth_id, plans",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.auth_id)
        .bind(&user.plans)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(record.to_domain())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, auth_id, plans FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        let users = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(users)
    }

    async fn get_user_by_auth_id(&self, auth_id: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, auth_id, plans FROM users WHERE auth_id = $1 \
             ORDER BY created_at ASC LIMIT 1",
        )
        .bind(auth_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record
            .map(UserRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", auth_id)))
    }

    async fn push_user_plan(&self, auth_id: &str, plan_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "UPDATE users SET plans = array_append(plans, $2) \
             WHERE id = (SELECT id FROM users WHERE auth_id = $1 ORDER BY created_at ASC LIMIT 1) \
             RETURNING id, name, email, auth_id, plans",
        )
        .bind(auth_id)
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record
            .map(UserRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", auth_id)))
    }
}
