pub mod db;
pub mod errors;
pub mod rates;
pub mod schema;

pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer};
pub use db::{DbConnection, DbPool, WriteHandle};
pub use rates::RateRepository;
