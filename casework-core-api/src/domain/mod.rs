pub mod activity_state;
pub mod audit_action;
pub mod bulk;
pub mod capability;
pub mod deadline;
pub mod ids;
pub mod origin_kind;
pub mod request;
pub mod review;
pub mod role;
pub mod team;

// Re-exports
pub use activity_state::*;
pub use audit_action::*;
pub use bulk::*;
pub use capability::*;
pub use deadline::*;
pub use ids::*;
pub use origin_kind::*;
pub use request::*;
pub use review::*;
pub use role::*;
pub use team::*;
