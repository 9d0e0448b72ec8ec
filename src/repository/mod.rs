//! Repository layer for database operations
//!
//! Repositories are traits so the services can run against PostgreSQL or the
//! in-process [`memory::MemoryStore`]. Every service operation works through a
//! single [`UnitOfWork`]: one transaction shared by all repositories.

pub mod categories;
pub mod equipment;
pub mod locations;
pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::AppResult;

pub use categories::CategoryRepository;
pub use equipment::EquipmentRepository;
pub use locations::LocationRepository;

/// Repositories bound to one transaction.
///
/// Nothing is visible to other units of work until [`UnitOfWork::commit`];
/// dropping the unit of work without committing discards its changes.
#[async_trait]
pub trait UnitOfWork: Send {
    fn equipment(&mut self) -> &mut dyn EquipmentRepository;

    fn categories(&mut self) -> &mut dyn CategoryRepository;

    fn locations(&mut self) -> &mut dyn LocationRepository;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Backing store able to open units of work
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Cloneable handle on the store, shared by all services
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn Store>,
}

impl Repository {
    /// Create a repository backed by the given PostgreSQL pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::from_store(postgres::PgStore::new(pool))
    }

    pub fn from_store(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Open a new unit of work (one transaction)
    pub async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        self.store.begin().await
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
