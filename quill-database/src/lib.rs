use sqlx::{PgPool, migrate::Migrator};

/// Compile-time discovered SQLx migrations for the `quill-database` crate.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Tag, alias, and audit-record entity models.
pub mod model;
/// The storage capability consumed by command handlers.
pub mod store;
/// In-memory store adapter, used by tests.
pub mod memory;
/// Postgres-backed document store adapter.
pub mod postgres;

pub use store::{TagStore, TriggerLookup};

/// Shared database handle passed across crates.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a database handle from an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Expose the underlying pool for query modules.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
