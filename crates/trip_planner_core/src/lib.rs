pub mod domain;
pub mod ledger;
pub mod lifecycle;
pub mod memory;
pub mod ports;
pub mod service;
pub mod submissions;
pub mod votes;

pub use domain::{
    Activity, Address, Category, DateOption, Location, NewPlan, NewUser, PhoneNumber, Plan,
    Proposal, Residence, Submission, Transport, User,
};
pub use ledger::CategoryRecords;
pub use lifecycle::{DateStamp, PlanStage, PlanStatus, StatusUpdate};
pub use memory::InMemoryStore;
pub use ports::{PlanStore, PortError, PortResult, UserStore};
pub use service::PlannerService;
pub use votes::VoteEntry;
