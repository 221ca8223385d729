//! crates/trip_planner_core/src/submissions.rs
//!
//! Tracks which users have submitted or voted in each category of a plan.

use crate::domain::{Category, Plan, Submission};

impl Submission {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            submissions: Vec::new(),
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.submissions.iter().any(|user| user == user_id)
    }
}

impl Plan {
    pub fn submission(&self, category: Category) -> Option<&Submission> {
        self.submitted.iter().find(|s| s.category == category)
    }

    /// Returns the record for `category`, inserting an empty one first if absent.
    pub fn submission_entry(&mut self, category: Category) -> &mut Submission {
        let index = match self.submitted.iter().position(|s| s.category == category) {
            Some(index) => index,
            None => {
                self.submitted.push(Submission::new(category));
                self.submitted.len() - 1
            }
        };
        &mut self.submitted[index]
    }

    /// Appends `user_id` to the category's submitters.
    ///
    /// Repeated calls append duplicates; callers check [`Plan::has_submitted`]
    /// first if they want one entry per user.
    pub fn record_submission(&mut self, category: Category, user_id: impl Into<String>) {
        self.submission_entry(category).submissions.push(user_id.into());
    }

    pub fn has_submitted(&self, category: Category, user_id: &str) -> bool {
        self.submission(category)
            .is_some_and(|submission| submission.contains(user_id))
    }

    /// Date availability has its own submitter list, separate from `submitted`.
    pub fn has_submitted_dates(&self, user_id: &str) -> bool {
        self.dates_submitted.iter().any(|user| user == user_id)
    }
}
