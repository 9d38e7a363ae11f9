/// PostgreSQL implementation of the storage ports
///
/// All queries use bound parameters, pagination included.
mod feed;
mod graph;
mod posts;
mod tags;

pub use posts::PgPostWriteTx;

use sqlx::PgPool;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
