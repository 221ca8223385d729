pub mod plans;
pub mod rest;
pub mod state;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use state::AppState;

/// Builds the `/api` router. CORS and docs are layered on by the binary.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(users::list_users_handler).post(users::create_user_handler),
        )
        .route("/api/users/{auth_id}", get(users::get_user_handler))
        .route(
            "/api/users/{auth_id}/plans",
            get(users::get_user_plans_handler).put(users::add_plan_to_user_handler),
        )
        .route("/api/plans", post(plans::create_plan_handler))
        .route(
            "/api/plans/{id}",
            get(plans::get_plan_handler).put(plans::update_plan_status_handler),
        )
        .route("/api/plans/{id}/addUser", put(plans::add_user_handler))
        .route("/api/plans/{id}/updateDates", put(plans::update_dates_handler))
        .route(
            "/api/plans/{id}/datesVotesOptions",
            get(plans::get_date_vote_options_handler).put(plans::set_date_vote_options_handler),
        )
        .route(
            "/api/plans/{id}/submitVotes/{category}",
            put(plans::submit_votes_handler),
        )
        .route(
            "/api/plans/{id}/submitted/{category}",
            put(plans::record_submission_handler),
        )
        .route(
            "/api/plans/{id}/submissions/{category}/{auth_id}",
            get(plans::has_submitted_handler),
        )
        .route(
            "/api/plans/{id}/submittedDates/{auth_id}",
            get(plans::has_submitted_dates_handler),
        )
        .route("/api/plans/{id}/updateLocations", put(plans::add_location_handler))
        .route("/api/plans/{id}/updateResidences", put(plans::add_residence_handler))
        .route("/api/plans/{id}/updateTransport", put(plans::add_transport_handler))
        .route("/api/plans/{id}/updateActivity", put(plans::add_activity_handler))
        .route("/api/plans/{id}/updateAddresses", put(plans::add_address_handler))
        .route(
            "/api/plans/{id}/updatePhoneNumbers",
            put(plans::add_phone_number_handler),
        )
        .route(
            "/api/plans/{id}/replace/{category}",
            put(plans::replace_category_handler),
        )
        .route("/api/plans/{id}/{field}", get(plans::get_field_handler))
        .with_state(state)
}
