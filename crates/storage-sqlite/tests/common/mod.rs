use std::sync::Arc;

use ratebook_storage_sqlite::db::{self, DbPool};
use ratebook_storage_sqlite::RateRepository;
use tempfile::TempDir;

pub const BASE_CURRENCY: &str = "USD";

/// A fully migrated database in a temp directory, with the writer actor
/// running. The directory lives as long as the struct.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub repository: Arc<RateRepository>,
    _dir: TempDir,
}

pub fn setup() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = db::init(dir.path().to_str().expect("Temp dir path is not valid UTF-8"))
        .expect("Failed to initialize test database");
    let pool = db::create_pool(&db_path).expect("Failed to create connection pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let writer = db::spawn_writer(pool.clone());
    let repository = Arc::new(RateRepository::new(pool.clone(), writer, BASE_CURRENCY));

    TestDb {
        pool,
        repository,
        _dir: dir,
    }
}
