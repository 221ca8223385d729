//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification and the mapping from
//! core errors to HTTP responses shared by every handler.

use axum::http::StatusCode;
use tracing::{error, warn};
use trip_planner_core::ports::PortError;
use trip_planner_core::{Plan, StatusUpdate, User, VoteEntry};
use utoipa::OpenApi;

use crate::web::{plans, users};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        plans::create_plan_handler,
        plans::get_plan_handler,
        plans::update_plan_status_handler,
        plans::add_user_handler,
        plans::update_dates_handler,
        plans::set_date_vote_options_handler,
        plans::get_date_vote_options_handler,
        plans::submit_votes_handler,
        plans::record_submission_handler,
        plans::has_submitted_handler,
        plans::has_submitted_dates_handler,
        plans::get_field_handler,
        plans::add_location_handler,
        plans::add_residence_handler,
        plans::add_transport_handler,
        plans::add_activity_handler,
        plans::add_address_handler,
        plans::add_phone_number_handler,
        plans::replace_category_handler,
        users::list_users_handler,
        users::create_user_handler,
        users::get_user_handler,
        users::add_plan_to_user_handler,
        users::get_user_plans_handler,
    ),
    components(
        schemas(
            plans::CreatePlanRequest,
            plans::UserRefRequest,
            plans::LocationRequest,
            plans::ResidenceRequest,
            plans::TransportRequest,
            plans::ActivityRequest,
            plans::AddressRequest,
            plans::PhoneNumberRequest,
            plans::UpdateDatesRequest,
            plans::ReplaceRecordsRequest,
            plans::SubmittedDatesResponse,
            Plan,
            User,
            StatusUpdate,
            VoteEntry,
            users::CreateUserRequest,
            users::AddPlanRequest,
        )
    ),
    tags(
        (name = "Trip Planner API", description = "Collaborative trip plans: proposals, votes and status.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Converts a core error into the status code and body returned to the client.
///
/// Store failures are logged and answered with a generic message.
pub(crate) fn port_error(context: &str, e: PortError) -> (StatusCode, String) {
    let status = match &e {
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::IndexMismatch { .. } | PortError::UnknownProposal { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PortError::InvalidTransition { .. } | PortError::Conflict(_) => StatusCode::CONFLICT,
        PortError::Store(_) => {
            error!("{}: {:?}", context, e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred".to_string(),
            );
        }
    };
    warn!("{}: {}", context, e);
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trip_planner_core::domain::Category;

    #[test]
    fn store_failures_hide_details() {
        let (status, body) = port_error("test", PortError::Store("connection refused".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("connection refused"));
    }

    #[test]
    fn client_errors_keep_their_message() {
        let (status, body) = port_error(
            "test",
            PortError::IndexMismatch {
                category: Category::Dates,
                expected: 1,
                received: 3,
            },
        );
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body.contains("dates"));

        let (status, _) = port_error("test", PortError::NotFound("Plan".to_string()));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn openapi_lists_plan_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/plans/{id}/submitVotes/{category}"));
        assert!(doc.paths.paths.contains_key("/api/users/{auth_id}/plans"));
    }
}
