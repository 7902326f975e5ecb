pub mod repo_impl;
pub mod append;
pub mod find_by_activity_id;
pub mod invalidate;

pub use append::insert_review_record;
pub use invalidate::invalidate_review_rows;
pub use repo_impl::ReviewRecordRepositoryImpl;
