//! crates/trip_planner_core/src/ledger.rs
//!
//! The category ledger: appending proposals to a plan's named collections,
//! overwriting a collection wholesale, and reading field values back out.

use serde_json::Value;

use crate::domain::{
    Activity, Address, Category, DateOption, Location, PhoneNumber, Plan, Residence, Transport,
};
use crate::ports::{PortError, PortResult};

/// A batch of typed records destined for one category.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryRecords {
    DatesAvailable(Vec<DateOption>),
    Dates(Vec<DateOption>),
    Locations(Vec<Location>),
    Residences(Vec<Residence>),
    Transport(Vec<Transport>),
    Activities(Vec<Activity>),
    Addresses(Vec<Address>),
    PhoneNumbers(Vec<PhoneNumber>),
}

impl CategoryRecords {
    /// Decodes an untyped JSON array into the record type `category` holds.
    pub fn from_json(category: Category, records: Value) -> PortResult<Self> {
        fn decode<T: serde::de::DeserializeOwned>(
            category: Category,
            records: Value,
        ) -> PortResult<Vec<T>> {
            serde_json::from_value(records).map_err(|e| {
                PortError::InvalidInput(format!("Malformed {} records: {}", category, e))
            })
        }

        Ok(match category {
            Category::DatesAvailable => Self::DatesAvailable(decode(category, records)?),
            Category::Dates => Self::Dates(decode(category, records)?),
            Category::Locations => Self::Locations(decode(category, records)?),
            Category::Residences => Self::Residences(decode(category, records)?),
            Category::Transport => Self::Transport(decode(category, records)?),
            Category::Activities => Self::Activities(decode(category, records)?),
            Category::Addresses => Self::Addresses(decode(category, records)?),
            Category::PhoneNumbers => Self::PhoneNumbers(decode(category, records)?),
        })
    }

    pub fn category(&self) -> Category {
        match self {
            Self::DatesAvailable(_) => Category::DatesAvailable,
            Self::Dates(_) => Category::Dates,
            Self::Locations(_) => Category::Locations,
            Self::Residences(_) => Category::Residences,
            Self::Transport(_) => Category::Transport,
            Self::Activities(_) => Category::Activities,
            Self::Addresses(_) => Category::Addresses,
            Self::PhoneNumbers(_) => Category::PhoneNumbers,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::DatesAvailable(r) | Self::Dates(r) => r.len(),
            Self::Locations(r) => r.len(),
            Self::Residences(r) => r.len(),
            Self::Transport(r) => r.len(),
            Self::Activities(r) => r.len(),
            Self::Addresses(r) => r.len(),
            Self::PhoneNumbers(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Plan {
    /// Appends the batch to the end of its category, preserving input order.
    pub fn append_records(&mut self, records: CategoryRecords) {
        match records {
            CategoryRecords::DatesAvailable(r) => self.dates_available.extend(r),
            CategoryRecords::Dates(r) => self.dates.extend(r),
            CategoryRecords::Locations(r) => self.locations.extend(r),
            CategoryRecords::Residences(r) => self.residences.extend(r),
            CategoryRecords::Transport(r) => self.transport.extend(r),
            CategoryRecords::Activities(r) => self.activities.extend(r),
            CategoryRecords::Addresses(r) => self.addresses.extend(r),
            CategoryRecords::PhoneNumbers(r) => self.phone_numbers.extend(r),
        }
    }

    /// Overwrites the whole category with the batch.
    pub fn replace_records(&mut self, records: CategoryRecords) {
        match records {
            CategoryRecords::DatesAvailable(r) => self.dates_available = r,
            CategoryRecords::Dates(r) => self.dates = r,
            CategoryRecords::Locations(r) => self.locations = r,
            CategoryRecords::Residences(r) => self.residences = r,
            CategoryRecords::Transport(r) => self.transport = r,
            CategoryRecords::Activities(r) => self.activities = r,
            CategoryRecords::Addresses(r) => self.addresses = r,
            CategoryRecords::PhoneNumbers(r) => self.phone_numbers = r,
        }
    }

    /// Appends to availability, stay lengths and submitters in one step.
    /// The three batches are independent and need not line up.
    pub fn append_dates(
        &mut self,
        added_dates: Vec<DateOption>,
        length_stay: Vec<u32>,
        submitting_user_ids: Vec<String>,
    ) {
        self.dates_available.extend(added_dates);
        self.length_stay.extend(length_stay);
        self.dates_submitted.extend(submitting_user_ids);
    }

    /// Adds options to the shortlist that is open for point voting.
    pub fn append_final_date_options(&mut self, options: Vec<DateOption>) {
        self.dates.extend(options);
    }

    pub fn category_len(&self, category: Category) -> usize {
        match category {
            Category::DatesAvailable => self.dates_available.len(),
            Category::Dates => self.dates.len(),
            Category::Locations => self.locations.len(),
            Category::Residences => self.residences.len(),
            Category::Transport => self.transport.len(),
            Category::Activities => self.activities.len(),
            Category::Addresses => self.addresses.len(),
            Category::PhoneNumbers => self.phone_numbers.len(),
        }
    }

    /// Distinct values held by a top-level field, in first-seen order.
    ///
    /// Array fields yield their elements, scalar fields a single value, and
    /// unknown fields nothing. The store's `version` counter is not a plan
    /// field and reads as unknown.
    pub fn field_values(&self, field: &str) -> PortResult<Vec<Value>> {
        if field == "version" {
            return Ok(Vec::new());
        }
        let document =
            serde_json::to_value(self).map_err(|e| PortError::Store(e.to_string()))?;

        let values = match document.get(field) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(scalar) => vec![scalar.clone()],
        };

        let mut distinct: Vec<Value> = Vec::with_capacity(values.len());
        for value in values {
            if !distinct.contains(&value) {
                distinct.push(value);
            }
        }
        Ok(distinct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewPlan;
    use chrono::NaiveDate;
    use serde_json::json;

    fn plan() -> Plan {
        Plan::new(
            NewPlan {
                name: "Road trip".to_string(),
                description: String::new(),
                cover_picture: 1,
                input_time: 3,
                vote_time: 3,
                users: vec!["alice".to_string()],
            },
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
    }

    fn location(name: &str, user: &str) -> Location {
        serde_json::from_value(json!({ "name": name, "motivation": "why not", "username": user }))
            .unwrap()
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut plan = plan();
        let first = vec![location("Lisbon", "alice"), location("Porto", "bob")];
        let second = vec![location("Lisbon", "carol")];

        plan.append_records(CategoryRecords::Locations(first.clone()));
        plan.append_records(CategoryRecords::Locations(second.clone()));

        let expected: Vec<Location> = first.into_iter().chain(second).collect();
        assert_eq!(plan.locations, expected);
        assert!(plan.residences.is_empty());
    }

    #[test]
    fn replace_overwrites_regardless_of_prior_content() {
        let mut plan = plan();
        plan.append_records(CategoryRecords::Locations(vec![
            location("Lisbon", "alice"),
            location("Porto", "bob"),
        ]));

        let sorted = vec![plan.locations[1].clone()];
        plan.replace_records(CategoryRecords::Locations(sorted.clone()));
        assert_eq!(plan.locations, sorted);

        plan.replace_records(CategoryRecords::Locations(Vec::new()));
        assert!(plan.locations.is_empty());
    }

    #[test]
    fn append_dates_does_not_require_matching_lengths() {
        let mut plan = plan();
        let dates: Vec<DateOption> =
            serde_json::from_value(json!([{ "date": "2024/6/1" }, { "date": "2024/6/8" }]))
                .unwrap();

        plan.append_dates(dates, vec![4], vec!["alice".to_string()]);
        plan.append_dates(Vec::new(), vec![5, 6], vec!["alice".to_string()]);

        assert_eq!(plan.dates_available.len(), 2);
        assert_eq!(plan.length_stay, vec![4, 5, 6]);
        assert_eq!(plan.dates_submitted, vec!["alice", "alice"]);
        assert!(plan.dates.is_empty());
    }

    #[test]
    fn records_decode_for_their_category() {
        let records = CategoryRecords::from_json(
            Category::PhoneNumbers,
            json!([{ "name": "Hostel", "number": "+351 21 000 0000" }]),
        )
        .unwrap();
        assert_eq!(records.category(), Category::PhoneNumbers);
        assert_eq!(records.len(), 1);

        let wrong_shape =
            CategoryRecords::from_json(Category::Transport, json!([{ "name": "Hostel" }]));
        assert!(matches!(wrong_shape, Err(PortError::InvalidInput(_))));
    }

    #[test]
    fn field_values_are_distinct() {
        let mut plan = plan();
        plan.add_user("bob");
        plan.add_user("alice");
        plan.append_records(CategoryRecords::Locations(vec![location("Lisbon", "alice")]));

        assert_eq!(plan.field_values("users").unwrap(), vec![json!("alice"), json!("bob")]);
        assert_eq!(plan.field_values("name").unwrap(), vec![json!("Road trip")]);
        assert!(plan.field_values("nonsense").unwrap().is_empty());

        let locations = plan.field_values("locations").unwrap();
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0]["name"], "Lisbon");
        assert_eq!(locations[0]["motivation"], "why not");
        assert_eq!(locations[0]["username"], "alice");
    }

    #[test]
    fn store_version_is_not_a_readable_field() {
        let mut plan = plan();
        plan.version = 4;

        assert!(plan.field_values("version").unwrap().is_empty());
        assert_eq!(plan.field_values("inputTime").unwrap(), vec![json!(3)]);
    }
}
