//! Schema setup and teardown from the SQL files shipped with this crate.
//!
//! `migrations/` is applied in ascending file order, `cleanup/` in
//! descending order so tables go before the types they use.

use sqlx::PgPool;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Create the casework schema.
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use casework_core_postgres::repository::db_init::init_database;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// init_database(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    run_schema_dir(pool, &migrations_dir, false).await
}

/// Drop the casework schema.
pub async fn cleanup_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let cleanup_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cleanup");
    run_schema_dir(pool, &cleanup_dir, true).await
}

/// Runs every `.sql` file of `dir`, sorted by file name.
async fn run_schema_dir(pool: &PgPool, dir: &Path, reverse: bool) -> Result<(), sqlx::Error> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(sqlx::Error::Io)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    files.sort();
    if reverse {
        files.reverse();
    }

    for file in &files {
        let sql = fs::read_to_string(file).map_err(sqlx::Error::Io)?;
        debug!(file = %file.display(), "executing schema file");
        sqlx::raw_sql(&sql).execute(pool).await?;
    }
    Ok(())
}
