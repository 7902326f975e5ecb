pub mod activity;
pub mod audit;
pub mod auditable;
pub mod identifiable;
pub mod review;
pub mod transfer;

// Re-exports
pub use activity::*;
pub use audit::*;
pub use auditable::*;
pub use identifiable::*;
pub use review::*;
pub use transfer::*;
