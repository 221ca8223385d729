//! crates/trip_planner_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs carry serde derives so the same shapes travel over HTTP and
//! into the document store, but they know nothing about either.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::lifecycle::{DateStamp, PlanStage, PlanStatus};
use crate::ports::PortError;

//=========================================================================================
// Categories
//=========================================================================================

/// A named, ordered collection of proposal records attached to a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum Category {
    DatesAvailable,
    Dates,
    Locations,
    Residences,
    Transport,
    Activities,
    Addresses,
    PhoneNumbers,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::DatesAvailable,
        Category::Dates,
        Category::Locations,
        Category::Residences,
        Category::Transport,
        Category::Activities,
        Category::Addresses,
        Category::PhoneNumbers,
    ];

    /// The field name used for this category in plan documents and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DatesAvailable => "datesAvailable",
            Self::Dates => "dates",
            Self::Locations => "locations",
            Self::Residences => "residences",
            Self::Transport => "transport",
            Self::Activities => "activities",
            Self::Addresses => "addresses",
            Self::PhoneNumbers => "phoneNumbers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| PortError::InvalidInput(format!("Unknown category '{}'", s)))
    }
}

//=========================================================================================
// Proposal Records
//=========================================================================================

/// Common access to the fields every proposal record shares.
pub trait Proposal {
    fn id(&self) -> Uuid;
    fn points(&self) -> Option<u64>;
    fn points_mut(&mut self) -> &mut Option<u64>;
}

macro_rules! impl_proposal {
    ($($record:ty),+ $(,)?) => {
        $(
            impl Proposal for $record {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn points(&self) -> Option<u64> {
                    self.points
                }

                fn points_mut(&mut self) -> &mut Option<u64> {
                    &mut self.points
                }
            }
        )+
    };
}

/// A candidate date, either raw availability or a shortlisted vote option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DateOption {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub motivation: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Residence {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub location: String,
    pub motivation: String,
    pub url: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub mode: String,
    pub time: String,
    pub url_tickets: String,
    pub url_route: String,
    pub motivation: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub url_site: String,
    pub url_route: String,
    pub motivation: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
}

impl_proposal!(DateOption, Location, Residence, Transport, Activity, Address, PhoneNumber);

//=========================================================================================
// Plan Aggregate
//=========================================================================================

/// The users who have acted on one category of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub category: Category,
    pub submissions: Vec<String>,
}

/// The fields a client supplies when creating a plan.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    pub name: String,
    pub description: String,
    pub cover_picture: u32,
    pub input_time: u32,
    pub vote_time: u32,
    pub users: Vec<String>,
}

/// The central aggregate: one trip being planned by a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    /// Incremented by the store on every successful save.
    #[serde(default)]
    pub version: u64,
    pub name: String,
    pub description: String,
    pub cover_picture: u32,
    pub users: Vec<String>,
    pub start_date: NaiveDate,
    pub vote_time: u32,
    pub input_time: u32,
    pub dates_available: Vec<DateOption>,
    pub dates_submitted: Vec<String>,
    pub dates: Vec<DateOption>,
    pub length_stay: Vec<u32>,
    pub locations: Vec<Location>,
    pub residences: Vec<Residence>,
    pub transport: Vec<Transport>,
    pub activities: Vec<Activity>,
    pub addresses: Vec<Address>,
    pub phone_numbers: Vec<PhoneNumber>,
    pub status_plan: PlanStatus,
    pub status_stage: PlanStage,
    pub status_input_vote: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2024/3/7"))]
    pub last_check: DateStamp,
    pub submitted: Vec<Submission>,
}

impl Plan {
    /// Builds a fresh plan with every collection empty, dated `today`.
    pub fn new(draft: NewPlan, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: 0,
            status_input_vote: format!("{} days to", draft.input_time),
            name: draft.name,
            description: draft.description,
            cover_picture: draft.cover_picture,
            users: draft.users,
            start_date: today,
            vote_time: draft.vote_time,
            input_time: draft.input_time,
            dates_available: Vec::new(),
            dates_submitted: Vec::new(),
            dates: Vec::new(),
            length_stay: Vec::new(),
            locations: Vec::new(),
            residences: Vec::new(),
            transport: Vec::new(),
            activities: Vec::new(),
            addresses: Vec::new(),
            phone_numbers: Vec::new(),
            status_plan: PlanStatus::InProgress,
            status_stage: PlanStage::InputDatesAndLocation,
            last_check: DateStamp::from(today),
            submitted: Vec::new(),
        }
    }

    /// Grants a user edit access. Duplicates are kept.
    pub fn add_user(&mut self, user_id: impl Into<String>) {
        self.users.push(user_id.into());
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// Represents a user, identified externally by their identity-provider id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub auth_id: String,
    pub plans: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub auth_id: String,
}

impl User {
    pub fn new(draft: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            email: draft.email,
            auth_id: draft.auth_id,
            plans: Vec::new(),
        }
    }
}
