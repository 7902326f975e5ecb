pub mod activity_repository;
pub mod audit_record_repository;
pub mod db_init;
pub mod factory;
pub mod gateway;
pub mod pooled_gateway;
pub mod review_record_repository;
pub mod transfer_record_repository;

#[cfg(test)]
pub mod test_utils;

pub use activity_repository::ActivityRepositoryImpl;
pub use audit_record_repository::AuditRecordRepositoryImpl;
pub use factory::CaseworkRepoFactory;
pub use gateway::PostgresActivityGateway;
pub use pooled_gateway::PooledActivityGateway;
pub use review_record_repository::ReviewRecordRepositoryImpl;
pub use transfer_record_repository::TransferRecordRepositoryImpl;
