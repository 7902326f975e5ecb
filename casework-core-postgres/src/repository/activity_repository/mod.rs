pub mod repo_impl;
pub mod find_by_id;
pub mod load_batch;
pub mod create_batch;
pub mod cas_update_state;

pub use repo_impl::ActivityRepositoryImpl;
