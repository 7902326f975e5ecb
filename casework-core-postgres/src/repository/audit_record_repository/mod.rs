pub mod repo_impl;
pub mod append;
pub mod load_audit_trail;

pub use append::insert_audit_record;
pub use repo_impl::AuditRecordRepositoryImpl;
