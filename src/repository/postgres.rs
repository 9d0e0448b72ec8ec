//! PostgreSQL store

use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres, Transaction};

use super::{CategoryRepository, EquipmentRepository, LocationRepository, Store, UnitOfWork};
use crate::error::AppResult;

#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Unit of work over one PostgreSQL transaction.
///
/// Implements every repository trait itself so all of them share the
/// transaction; the sqlx transaction rolls back when dropped uncommitted.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl PgUnitOfWork {
    pub(super) fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn equipment(&mut self) -> &mut dyn EquipmentRepository {
        self
    }

    fn categories(&mut self) -> &mut dyn CategoryRepository {
        self
    }

    fn locations(&mut self) -> &mut dyn LocationRepository {
        self
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
