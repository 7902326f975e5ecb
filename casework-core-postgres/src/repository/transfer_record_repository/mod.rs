pub mod repo_impl;
pub mod append;

pub use append::insert_transfer_record;
pub use repo_impl::TransferRecordRepositoryImpl;
