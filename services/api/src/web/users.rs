//! services/api/src/web/users.rs
//!
//! Axum handlers for the `/api/users` endpoints. Users are addressed by the
//! id their external identity provider assigned them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use trip_planner_core::{NewUser, User};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::port_error;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(alias = "auth0Id")]
    pub auth_id: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPlanRequest {
    pub plan_id: Uuid,
}

/// List every user.
#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let users = state
        .planner
        .list_users()
        .await
        .map_err(|e| port_error("Failed to list users", e))?;
    Ok(Json(users))
}

/// Register a user with no plans.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let draft = NewUser {
        name: req.name,
        email: req.email,
        auth_id: req.auth_id,
    };
    let user = state
        .planner
        .create_user(draft)
        .await
        .map_err(|e| port_error("Failed to create user", e))?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{auth_id}",
    params(("auth_id" = String, Path, description = "Identity-provider user id")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(auth_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state
        .planner
        .get_user(&auth_id)
        .await
        .map_err(|e| port_error("Failed to load user", e))?;
    Ok(Json(user))
}

/// Append a plan to the user's plan list.
#[utoipa::path(
    put,
    path = "/api/users/{auth_id}/plans",
    request_body = AddPlanRequest,
    params(("auth_id" = String, Path, description = "Identity-provider user id")),
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn add_plan_to_user_handler(
    State(state): State<Arc<AppState>>,
    Path(auth_id): Path<String>,
    Json(req): Json<AddPlanRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let user = state
        .planner
        .add_plan_to_user(&auth_id, req.plan_id)
        .await
        .map_err(|e| port_error("Failed to add plan to user", e))?;
    Ok(Json(user))
}

/// Distinct plan ids the user participates in.
#[utoipa::path(
    get,
    path = "/api/users/{auth_id}/plans",
    params(("auth_id" = String, Path, description = "Identity-provider user id")),
    responses((status = 200, description = "Plan ids", body = Vec<Uuid>))
)]
pub async fn get_user_plans_handler(
    State(state): State<Arc<AppState>>,
    Path(auth_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let plans = state
        .planner
        .get_user_plans(&auth_id)
        .await
        .map_err(|e| port_error("Failed to list user plans", e))?;
    Ok(Json(plans))
}
