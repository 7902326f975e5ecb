pub mod append_audit_record;
pub mod append_review_record;
pub mod append_transfer_record;
pub mod cas_update_state;
pub mod create_batch;
pub mod find_by_id;
pub mod find_review_records_by_activity_id;
pub mod invalidate_review_records;
pub mod load_audit_trail;
pub mod load_batch;
pub mod pagination;

/// Error type shared by every repository trait.
pub type RepositoryError = Box<dyn std::error::Error + Send + Sync>;

// Re-exports
pub use append_audit_record::*;
pub use append_review_record::*;
pub use append_transfer_record::*;
pub use cas_update_state::*;
pub use create_batch::*;
pub use find_by_id::*;
pub use find_review_records_by_activity_id::*;
pub use invalidate_review_records::*;
pub use load_audit_trail::*;
pub use load_batch::*;
pub use pagination::*;
