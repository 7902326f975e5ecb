//! Activity lifecycle engine for case-management work plans.
//!
//! The engine decides and applies lifecycle transitions, the visado review,
//! transfers, reopens and bulk changes for activities stored behind an
//! [`gateway::ActivityGateway`]. It keeps no state between calls.

pub mod assignment;
pub mod authorization;
pub mod bulk;
pub mod clock;
pub mod config;
pub mod context;
pub mod deadline;
pub mod engine;
pub mod gateway;
pub mod history;
pub mod identity;
pub mod lifecycle;
pub mod memory;
pub mod reopen;
pub mod review;
pub mod state_machine;
pub mod transfer;
pub mod visibility;

#[cfg(test)]
pub(crate) mod test_utils;

pub use authorization::authorize;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, EngineConfig, JustificationPolicy};
pub use context::CallContext;
pub use deadline::{classify, classify_deadline};
pub use engine::ActivityEngine;
pub use gateway::ActivityGateway;
pub use history::BoardEntry;
pub use memory::InMemoryActivityStore;
