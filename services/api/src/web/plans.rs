//! services/api/src/web/plans.rs
//!
//! Axum handlers for the `/api/plans` endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trip_planner_core::{
    Activity, Address, Category, CategoryRecords, DateOption, Location, NewPlan, PhoneNumber,
    Plan, PortError, Residence, StatusUpdate, Transport, VoteEntry,
};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::port_error;
use crate::web::state::AppState;

type HandlerError = (StatusCode, String);

fn parse_category(raw: &str) -> Result<Category, HandlerError> {
    raw.parse::<Category>()
        .map_err(|e| port_error("Rejected category", e))
}

//=========================================================================================
// API Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    #[serde(alias = "namePlan")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_picture: u32,
    pub input_time: u32,
    pub vote_time: u32,
    #[serde(default)]
    pub users: Vec<String>,
}

/// Identifies the acting user by their identity-provider id.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRefRequest {
    #[serde(alias = "auth0", alias = "auth0Id")]
    pub auth_id: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDatesRequest {
    #[serde(default)]
    pub dates: Vec<DateOption>,
    #[serde(default)]
    pub length_trip: Vec<u32>,
    #[serde(default, alias = "auth0Id")]
    pub user_ids: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRequest {
    pub place_name: String,
    pub motivation: String,
    pub username: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidenceRequest {
    pub location: String,
    pub motivation: String,
    pub url: String,
    pub username: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransportRequest {
    pub mode: String,
    pub time: String,
    pub url_tickets: String,
    pub url_route: String,
    pub motivation: String,
    pub username: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    pub name: String,
    pub url_site: String,
    pub url_route: String,
    pub motivation: String,
    pub username: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AddressRequest {
    pub name: String,
    pub location: String,
}

#[derive(Deserialize, ToSchema)]
pub struct PhoneNumberRequest {
    pub name: String,
    pub number: String,
}

/// A full replacement for one category. Each record must fit the category's shape.
#[derive(Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Vec<Object>)]
pub struct ReplaceRecordsRequest(pub serde_json::Value);

#[derive(Serialize, ToSchema)]
pub struct SubmittedDatesResponse {
    pub submitted: bool,
}

//=========================================================================================
// Plan Lifecycle Handlers
//=========================================================================================

/// Create a new plan with every category empty.
#[utoipa::path(
    post,
    path = "/api/plans",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created", body = Plan),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_plan_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let draft = NewPlan {
        name: req.name,
        description: req.description,
        cover_picture: req.cover_picture,
        input_time: req.input_time,
        vote_time: req.vote_time,
        users: req.users,
    };
    let plan = state
        .planner
        .create_plan(draft)
        .await
        .map_err(|e| port_error("Failed to create plan", e))?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// Fetch a whole plan. Any failure, including a malformed id, answers with
/// the JSON string `"failed"`.
#[utoipa::path(
    get,
    path = "/api/plans/{id}",
    params(("id" = String, Path, description = "Plan id")),
    responses(
        (status = 200, description = "The plan document", body = Plan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn get_plan_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let loaded = match raw_id.parse::<Uuid>() {
        Ok(id) => state.planner.get_plan(id).await,
        Err(_) => Err(PortError::NotFound(format!("Plan '{}' not found", raw_id))),
    };
    match loaded {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => {
            let (status, _) = port_error("Failed to load plan", e);
            (status, Json("failed")).into_response()
        }
    }
}

/// Update any of `statusPlan`, `statusStage`, `statusInputVote`, `lastCheck`.
#[utoipa::path(
    put,
    path = "/api/plans/{id}",
    request_body = StatusUpdate,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 404, description = "Plan not found"),
        (status = 409, description = "Transition not allowed")
    )
)]
pub async fn update_plan_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Result<impl IntoResponse, HandlerError> {
    let plan = state
        .planner
        .update_plan_status(id, update)
        .await
        .map_err(|e| port_error("Failed to update plan status", e))?;
    Ok(Json(plan))
}

/// Grant a user edit access to the plan.
#[utoipa::path(
    put,
    path = "/api/plans/{id}/addUser",
    request_body = UserRefRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn add_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UserRefRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let plan = state
        .planner
        .add_user_to_plan(id, &req.auth_id)
        .await
        .map_err(|e| port_error("Failed to add user to plan", e))?;
    Ok(Json(plan))
}

//=========================================================================================
// Date Handlers
//=========================================================================================

/// Append date availability, stay lengths and submitters in one write.
#[utoipa::path(
    put,
    path = "/api/plans/{id}/updateDates",
    request_body = UpdateDatesRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn update_dates_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDatesRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let plan = state
        .planner
        .update_dates(id, req.dates, req.length_trip, req.user_ids)
        .await
        .map_err(|e| port_error("Failed to update dates", e))?;
    Ok(Json(plan))
}

/// Append options to the date shortlist that is open for voting.
#[utoipa::path(
    put,
    path = "/api/plans/{id}/datesVotesOptions",
    request_body = Vec<DateOption>,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn set_date_vote_options_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(options): Json<Vec<DateOption>>,
) -> Result<impl IntoResponse, HandlerError> {
    let plan = state
        .planner
        .set_final_date_options(id, options)
        .await
        .map_err(|e| port_error("Failed to set date vote options", e))?;
    Ok(Json(plan))
}

/// The current date shortlist.
#[utoipa::path(
    get,
    path = "/api/plans/{id}/datesVotesOptions",
    params(("id" = Uuid, Path, description = "Plan id")),
    responses((status = 200, description = "Distinct date options", body = [DateOption]))
)]
pub async fn get_date_vote_options_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let options = state
        .planner
        .get_category_field(id, Category::Dates.as_str())
        .await
        .map_err(|e| port_error("Failed to read date vote options", e))?;
    Ok(Json(options))
}

//=========================================================================================
// Voting and Submission Handlers
//=========================================================================================

/// Add a batch of points to a category's records.
#[utoipa::path(
    put,
    path = "/api/plans/{id}/submitVotes/{category}",
    request_body = Vec<VoteEntry>,
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("category" = String, Path, description = "Category name, e.g. `dates`")
    ),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 404, description = "Plan not found"),
        (status = 422, description = "Batch does not match the category")
    )
)]
pub async fn submit_votes_handler(
    State(state): State<Arc<AppState>>,
    Path((id, category)): Path<(Uuid, String)>,
    Json(batch): Json<Vec<VoteEntry>>,
) -> Result<impl IntoResponse, HandlerError> {
    let category = parse_category(&category)?;
    let plan = state
        .planner
        .submit_votes(id, category, batch)
        .await
        .map_err(|e| port_error("Failed to submit votes", e))?;
    Ok(Json(plan))
}

/// Record that a user has submitted or voted in a category.
#[utoipa::path(
    put,
    path = "/api/plans/{id}/submitted/{category}",
    request_body = UserRefRequest,
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("category" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn record_submission_handler(
    State(state): State<Arc<AppState>>,
    Path((id, category)): Path<(Uuid, String)>,
    Json(req): Json<UserRefRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let category = parse_category(&category)?;
    let plan = state
        .planner
        .record_submission(id, category, &req.auth_id)
        .await
        .map_err(|e| port_error("Failed to record submission", e))?;
    Ok(Json(plan))
}

/// Whether the user has already submitted in the category.
#[utoipa::path(
    get,
    path = "/api/plans/{id}/submissions/{category}/{auth_id}",
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("category" = String, Path, description = "Category name"),
        ("auth_id" = String, Path, description = "Identity-provider user id")
    ),
    responses(
        (status = 200, description = "Submission flag", body = bool),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn has_submitted_handler(
    State(state): State<Arc<AppState>>,
    Path((id, category, auth_id)): Path<(Uuid, String, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let category = parse_category(&category)?;
    let submitted = state
        .planner
        .has_submitted(id, category, &auth_id)
        .await
        .map_err(|e| port_error("Failed to check submission", e))?;
    Ok(Json(submitted))
}

/// Whether the user appears in the plan's date submitters.
#[utoipa::path(
    get,
    path = "/api/plans/{id}/submittedDates/{auth_id}",
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("auth_id" = String, Path, description = "Identity-provider user id")
    ),
    responses((status = 200, description = "Submission flag", body = SubmittedDatesResponse))
)]
pub async fn has_submitted_dates_handler(
    State(state): State<Arc<AppState>>,
    Path((id, auth_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let submitted = state
        .planner
        .has_submitted_dates(id, &auth_id)
        .await
        .map_err(|e| port_error("Failed to check date submission", e))?;
    Ok(Json(SubmittedDatesResponse { submitted }))
}

//=========================================================================================
// Category Handlers
//=========================================================================================

/// Distinct values of any top-level plan field.
#[utoipa::path(
    get,
    path = "/api/plans/{id}/{field}",
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("field" = String, Path, description = "Field name, e.g. `locations` or `users`")
    ),
    responses((status = 200, description = "Distinct values; empty when the plan or field is absent"))
)]
pub async fn get_field_handler(
    State(state): State<Arc<AppState>>,
    Path((id, field)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, HandlerError> {
    let values = state
        .planner
        .get_category_field(id, &field)
        .await
        .map_err(|e| port_error("Failed to read plan field", e))?;
    Ok(Json(values))
}

async fn append_one(
    state: &AppState,
    id: Uuid,
    records: CategoryRecords,
) -> Result<Json<Plan>, HandlerError> {
    let category = records.category();
    let plan = state
        .planner
        .append_to_category(id, records)
        .await
        .map_err(|e| port_error(&format!("Failed to append to {}", category), e))?;
    Ok(Json(plan))
}

#[utoipa::path(
    put,
    path = "/api/plans/{id}/updateLocations",
    request_body = LocationRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses((status = 200, description = "Updated plan", body = Plan), (status = 404, description = "Plan not found"))
)]
pub async fn add_location_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<LocationRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let location = Location {
        id: Uuid::new_v4(),
        name: req.place_name,
        motivation: req.motivation,
        username: req.username,
        points: None,
    };
    append_one(&state, id, CategoryRecords::Locations(vec![location])).await
}

#[utoipa::path(
    put,
    path = "/api/plans/{id}/updateResidences",
    request_body = ResidenceRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses((status = 200, description = "Updated plan", body = Plan), (status = 404, description = "Plan not found"))
)]
pub async fn add_residence_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResidenceRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let residence = Residence {
        id: Uuid::new_v4(),
        location: req.location,
        motivation: req.motivation,
        url: req.url,
        username: req.username,
        points: None,
    };
    append_one(&state, id, CategoryRecords::Residences(vec![residence])).await
}

#[utoipa::path(
    put,
    path = "/api/plans/{id}/updateTransport",
    request_body = TransportRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses((status = 200, description = "Updated plan", body = Plan), (status = 404, description = "Plan not found"))
)]
pub async fn add_transport_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<TransportRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let transport = Transport {
        id: Uuid::new_v4(),
        mode: req.mode,
        time: req.time,
        url_tickets: req.url_tickets,
        url_route: req.url_route,
        motivation: req.motivation,
        username: req.username,
        points: None,
    };
    append_one(&state, id, CategoryRecords::Transport(vec![transport])).await
}

#[utoipa::path(
    put,
    path = "/api/plans/{id}/updateActivity",
    request_body = ActivityRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses((status = 200, description = "Updated plan", body = Plan), (status = 404, description = "Plan not found"))
)]
pub async fn add_activity_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ActivityRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let activity = Activity {
        id: Uuid::new_v4(),
        name: req.name,
        url_site: req.url_site,
        url_route: req.url_route,
        motivation: req.motivation,
        username: req.username,
        points: None,
    };
    append_one(&state, id, CategoryRecords::Activities(vec![activity])).await
}

#[utoipa::path(
    put,
    path = "/api/plans/{id}/updateAddresses",
    request_body = AddressRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses((status = 200, description = "Updated plan", body = Plan), (status = 404, description = "Plan not found"))
)]
pub async fn add_address_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddressRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let address = Address {
        id: Uuid::new_v4(),
        name: req.name,
        location: req.location,
        points: None,
    };
    append_one(&state, id, CategoryRecords::Addresses(vec![address])).await
}

#[utoipa::path(
    put,
    path = "/api/plans/{id}/updatePhoneNumbers",
    request_body = PhoneNumberRequest,
    params(("id" = Uuid, Path, description = "Plan id")),
    responses((status = 200, description = "Updated plan", body = Plan), (status = 404, description = "Plan not found"))
)]
pub async fn add_phone_number_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<PhoneNumberRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let phone_number = PhoneNumber {
        id: Uuid::new_v4(),
        name: req.name,
        number: req.number,
        points: None,
    };
    append_one(&state, id, CategoryRecords::PhoneNumbers(vec![phone_number])).await
}

/// Overwrite a whole category, e.g. to commit a client-side sort by points.
#[utoipa::path(
    put,
    path = "/api/plans/{id}/replace/{category}",
    request_body = ReplaceRecordsRequest,
    params(
        ("id" = Uuid, Path, description = "Plan id"),
        ("category" = String, Path, description = "Category name")
    ),
    responses(
        (status = 200, description = "Updated plan", body = Plan),
        (status = 400, description = "Records do not fit the category"),
        (status = 404, description = "Plan not found")
    )
)]
pub async fn replace_category_handler(
    State(state): State<Arc<AppState>>,
    Path((id, category)): Path<(Uuid, String)>,
    Json(ReplaceRecordsRequest(records)): Json<ReplaceRecordsRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let category = parse_category(&category)?;
    let records = CategoryRecords::from_json(category, records)
        .map_err(|e| port_error("Rejected replacement records", e))?;
    let plan = state
        .planner
        .replace_category(id, records)
        .await
        .map_err(|e| port_error("Failed to replace category", e))?;
    Ok(Json(plan))
}
