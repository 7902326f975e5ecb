pub mod postgres_repositories;
pub mod repository;
pub mod utils;

pub use postgres_repositories::PostgresRepositories;
pub use repository::activity_repository::ActivityRepositoryImpl;
pub use repository::gateway::PostgresActivityGateway;
pub use repository::pooled_gateway::PooledActivityGateway;

#[cfg(test)]
pub mod test_helper;
