//! crates/trip_planner_core/src/lifecycle.rs
//!
//! Plan status fields and the rules for moving between them.
//!
//! Nothing here runs on a timer. Every transition is requested explicitly by
//! the orchestrating client through [`StatusUpdate`]; this module only decides
//! whether the requested move is allowed.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::domain::Plan;
use crate::ports::{PortError, PortResult};

/// Overall lifecycle of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PlanStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Cancelled")]
    Cancelled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }

    pub fn can_transition_to(&self, next: PlanStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The planning step currently open to the group. Ordered by progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PlanStage {
    #[serde(rename = "Input Dates & Location")]
    InputDatesAndLocation,
    #[serde(rename = "Voting")]
    Voting,
    #[serde(rename = "Itinerary")]
    Itinerary,
}

impl PlanStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputDatesAndLocation => "Input Dates & Location",
            Self::Voting => "Voting",
            Self::Itinerary => "Itinerary",
        }
    }

    /// Stages only move forward.
    pub fn can_advance_to(&self, next: PlanStage) -> bool {
        next >= *self
    }
}

impl fmt::Display for PlanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Date Stamp
//=========================================================================================

/// A calendar date rendered as `YYYY/M/D` without leading zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateStamp(NaiveDate);

impl DateStamp {
    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for DateStamp {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.0.year(), self.0.month(), self.0.day())
    }
}

impl FromStr for DateStamp {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PortError::InvalidInput(format!("'{}' is not a YYYY/M/D date", s));

        let mut parts = s.trim().split('/');
        let (Some(year), Some(month), Some(day), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        let day = day.parse::<u32>().map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for DateStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateStamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

//=========================================================================================
// Status Updates
//=========================================================================================

/// A partial status update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status_plan: Option<PlanStatus>,
    pub status_stage: Option<PlanStage>,
    pub status_input_vote: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, example = "2024/3/7"))]
    pub last_check: Option<DateStamp>,
}

impl Plan {
    /// Validates the whole update against the current state, then applies it.
    pub fn apply_status_update(&mut self, update: StatusUpdate) -> PortResult<()> {
        if let Some(next) = update.status_plan {
            if !self.status_plan.can_transition_to(next) {
                return Err(PortError::InvalidTransition {
                    field: "statusPlan",
                    from: self.status_plan.to_string(),
                    to: next.to_string(),
                });
            }
        }

        if let Some(next) = update.status_stage {
            let closed = next != self.status_stage && self.status_plan.is_terminal();
            if closed || !self.status_stage.can_advance_to(next) {
                return Err(PortError::InvalidTransition {
                    field: "statusStage",
                    from: self.status_stage.to_string(),
                    to: next.to_string(),
                });
            }
        }

        if let Some(status) = update.status_plan {
            self.status_plan = status;
        }
        if let Some(stage) = update.status_stage {
            self.status_stage = stage;
        }
        if let Some(descriptor) = update.status_input_vote {
            self.status_input_vote = descriptor;
        }
        if let Some(stamp) = update.last_check {
            self.last_check = stamp;
        }
        Ok(())
    }
}
