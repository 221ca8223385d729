//! crates/trip_planner_core/src/votes.rs
//!
//! Merges incoming point deltas into a category's records.
//!
//! Each entry in a vote batch names its target record by `id`. Entries without
//! an id fall back to position: entry `i` goes to record `i`. A batch longer
//! than the category is always rejected, and the whole batch is resolved
//! before any points move, so a bad entry leaves the plan untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, Plan, Proposal};
use crate::ports::{PortError, PortResult};

/// One voter's points for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VoteEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub points: u32,
}

impl VoteEntry {
    pub fn positional(points: u32) -> Self {
        Self { id: None, points }
    }

    pub fn for_record(id: Uuid, points: u32) -> Self {
        Self {
            id: Some(id),
            points,
        }
    }
}

impl Plan {
    /// Adds every entry's points to its record's running total.
    pub fn apply_votes(&mut self, category: Category, batch: &[VoteEntry]) -> PortResult<()> {
        match category {
            Category::DatesAvailable => accumulate(category, &mut self.dates_available, batch),
            Category::Dates => accumulate(category, &mut self.dates, batch),
            Category::Locations => accumulate(category, &mut self.locations, batch),
            Category::Residences => accumulate(category, &mut self.residences, batch),
            Category::Transport => accumulate(category, &mut self.transport, batch),
            Category::Activities => accumulate(category, &mut self.activities, batch),
            Category::Addresses => accumulate(category, &mut self.addresses, batch),
            Category::PhoneNumbers => accumulate(category, &mut self.phone_numbers, batch),
        }
    }
}

fn accumulate<P: Proposal>(
    category: Category,
    records: &mut [P],
    batch: &[VoteEntry],
) -> PortResult<()> {
    if batch.len() > records.len() {
        return Err(PortError::IndexMismatch {
            category,
            expected: records.len(),
            received: batch.len(),
        });
    }

    let targets = batch
        .iter()
        .enumerate()
        .map(|(position, entry)| match entry.id {
            Some(id) => records
                .iter()
                .position(|record| record.id() == id)
                .ok_or(PortError::UnknownProposal { category, id }),
            None => Ok(position),
        })
        .collect::<PortResult<Vec<usize>>>()?;

    for (index, entry) in targets.into_iter().zip(batch) {
        let points = records[index].points_mut();
        *points = Some(points.unwrap_or(0).saturating_add(u64::from(entry.points)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateOption, NewPlan};
    use chrono::NaiveDate;

    fn plan_with_dates(count: usize) -> Plan {
        let mut plan = Plan::new(
            NewPlan {
                name: "Weekend".to_string(),
                description: String::new(),
                cover_picture: 0,
                input_time: 3,
                vote_time: 3,
                users: Vec::new(),
            },
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        );
        let options = (0..count)
            .map(|day| DateOption {
                id: Uuid::new_v4(),
                date: format!("2024/8/{}", day + 1),
                username: None,
                points: None,
            })
            .collect();
        plan.append_final_date_options(options);
        plan
    }

    fn points(plan: &Plan) -> Vec<Option<u64>> {
        plan.dates.iter().map(|d| d.points).collect()
    }

    #[test]
    fn sequential_batches_accumulate() {
        let mut plan = plan_with_dates(2);

        plan.apply_votes(
            Category::Dates,
            &[VoteEntry::positional(2), VoteEntry::positional(3)],
        )
        .unwrap();
        plan.apply_votes(
            Category::Dates,
            &[VoteEntry::positional(1), VoteEntry::positional(0)],
        )
        .unwrap();

        assert_eq!(points(&plan), vec![Some(3), Some(3)]);
    }

    #[test]
    fn shorter_batch_only_touches_leading_records() {
        let mut plan = plan_with_dates(3);
        plan.apply_votes(Category::Dates, &[VoteEntry::positional(4)])
            .unwrap();

        assert_eq!(points(&plan), vec![Some(4), None, None]);
    }

    #[test]
    fn longer_batch_is_rejected_without_changes() {
        let mut plan = plan_with_dates(1);
        let before = plan.clone();

        let err = plan
            .apply_votes(
                Category::Dates,
                &[VoteEntry::positional(1), VoteEntry::positional(1)],
            )
            .unwrap_err();

        assert!(matches!(
            err,
            PortError::IndexMismatch {
                category: Category::Dates,
                expected: 1,
                received: 2
            }
        ));
        assert_eq!(plan, before);
    }

    #[test]
    fn identified_entries_survive_reordering() {
        let mut plan = plan_with_dates(3);
        let first = plan.dates[0].id;
        let last = plan.dates[2].id;

        plan.apply_votes(
            Category::Dates,
            &[VoteEntry::for_record(last, 5), VoteEntry::for_record(first, 1)],
        )
        .unwrap();

        // Sort by points client-side and commit the new order.
        let mut sorted = plan.dates.clone();
        sorted.sort_by_key(|d| std::cmp::Reverse(d.points.unwrap_or(0)));
        plan.dates = sorted;

        plan.apply_votes(Category::Dates, &[VoteEntry::for_record(first, 2)])
            .unwrap();

        let by_id = |id| plan.dates.iter().find(|d| d.id == id).unwrap().points;
        assert_eq!(by_id(last), Some(5));
        assert_eq!(by_id(first), Some(3));
    }

    #[test]
    fn unknown_id_rejects_the_whole_batch() {
        let mut plan = plan_with_dates(2);
        let before = plan.clone();
        let stray = Uuid::new_v4();

        let err = plan
            .apply_votes(
                Category::Dates,
                &[VoteEntry::positional(1), VoteEntry::for_record(stray, 1)],
            )
            .unwrap_err();

        assert!(matches!(err, PortError::UnknownProposal { id, .. } if id == stray));
        assert_eq!(plan, before);
    }

    #[test]
    fn votes_reach_any_category() {
        let mut plan = plan_with_dates(0);
        plan.append_records(crate::ledger::CategoryRecords::Activities(
            serde_json::from_value(serde_json::json!([{
                "name": "Kayak",
                "urlSite": "https://example.org",
                "urlRoute": "https://example.org/route",
                "motivation": "fun",
                "username": "alice"
            }]))
            .unwrap(),
        ));

        plan.apply_votes(Category::Activities, &[VoteEntry::positional(7)])
            .unwrap();
        assert_eq!(plan.activities[0].points, Some(7));
    }
}
