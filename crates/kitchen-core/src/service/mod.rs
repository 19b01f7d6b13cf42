//! # Services
//!
//! The operations callers invoke. Each service holds its collaborators as
//! `Arc<dyn Trait>` so the same code runs on SQLite and on [`MemoryStore`].
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌────────────────────┐
//! │   OrderService   │   │   TableService   │   │ TableGroupService  │
//! └────────┬─────────┘   └────────┬─────────┘   └─────────┬──────────┘
//!          │                      │                       │
//!          ▼                      ▼                       ▼
//!   MenuCatalog  OrderTableStore  OrderStore  TableGroupStore  (ports)
//! ```
//!
//! [`MemoryStore`]: crate::memory::MemoryStore

mod order;
mod table;
mod table_group;

pub use order::OrderService;
pub use table::TableService;
pub use table_group::TableGroupService;

use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::ports::{MenuCatalog, OrderStore, OrderTableStore, TableGroupStore};

/// All services wired to one set of collaborators.
#[derive(Clone)]
pub struct Services {
    pub orders: OrderService,
    pub tables: TableService,
    pub table_groups: TableGroupService,
}

impl Services {
    pub fn new(
        menus: Arc<dyn MenuCatalog>,
        tables: Arc<dyn OrderTableStore>,
        orders: Arc<dyn OrderStore>,
        groups: Arc<dyn TableGroupStore>,
    ) -> Self {
        Services {
            orders: OrderService::new(menus, tables.clone(), orders.clone()),
            tables: TableService::new(tables.clone(), orders.clone()),
            table_groups: TableGroupService::new(tables, orders, groups),
        }
    }

    /// Services backed by a single in-memory store.
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Services::new(store.clone(), store.clone(), store.clone(), store)
    }
}
