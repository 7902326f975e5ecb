use postgres_unit_of_work::Executor;
use sqlx::PgPool;
use std::sync::Arc;

use crate::repository::{PooledActivityGateway, PostgresActivityGateway};

pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Begin a transaction and build every repository on it.
    ///
    /// Nothing is committed here; the transaction rolls back when the last
    /// repository holding the executor is dropped unless the caller commits.
    pub async fn create_gateway(&self) -> Result<PostgresActivityGateway, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(PostgresActivityGateway::on_executor(Executor::new(tx)))
    }

    /// A gateway that opens and commits its own transaction for every call.
    pub fn pooled_gateway(&self) -> PooledActivityGateway {
        PooledActivityGateway::new(self.pool.clone())
    }
}
