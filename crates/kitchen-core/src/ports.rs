//! # Collaborator Ports
//!
//! The traits the services need from the outside world. kitchen-db implements
//! them on SQLite; [`crate::memory`] implements them in memory for tests.
//!
//! ## Consistency Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Services read, validate fully, then write. Writes that must not race  │
//! │  are conditional on the state that was read:                           │
//! │                                                                         │
//! │  OrderStore::update_status        WHERE status = <status read>         │
//! │  OrderTableStore::update_empty    WHERE no group                       │
//! │                                   AND no order in <blocking statuses>  │
//! │  OrderTableStore::update_number_of_guests                               │
//! │                                   WHERE NOT empty                      │
//! │  TableGroupStore::insert_with_members                                   │
//! │                                   one transaction, each member         │
//! │                                   WHERE empty AND no group             │
//! │                                                                         │
//! │  A lost race surfaces as `false` / StoreError::Conflict, never as a    │
//! │  partial write.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::ids::{MenuId, OrderId, OrderTableId, TableGroupId};
use crate::order::{Order, OrderStatus};
use crate::table::OrderTable;
use crate::table_group::TableGroup;

/// Errors raised by a collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write found the row changed since it was read.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: String, id: String },

    /// A row the write depends on is missing.
    #[error("{entity} not found: {id}")]
    Missing { entity: String, id: String },

    /// Stored data no longer satisfies a domain invariant.
    #[error("Corrupt {entity} row: {reason}")]
    Corrupt { entity: String, reason: String },

    /// Anything else the backend reports.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn conflict(entity: impl Into<String>, id: impl ToString) -> Self {
        StoreError::Conflict {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn missing(entity: impl Into<String>, id: impl ToString) -> Self {
        StoreError::Missing {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Result type for collaborator calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Menu catalog lookups.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    /// How many of the distinct `ids` exist.
    async fn count_existing_menus(&self, ids: &BTreeSet<MenuId>) -> StoreResult<u64>;
}

/// Table persistence.
#[async_trait]
pub trait OrderTableStore: Send + Sync {
    async fn find_by_id(&self, id: &OrderTableId) -> StoreResult<Option<OrderTable>>;

    async fn find_all(&self) -> StoreResult<Vec<OrderTable>>;

    /// Tables among `ids` that exist; missing ids are simply absent.
    async fn find_all_by_ids(&self, ids: &[OrderTableId]) -> StoreResult<Vec<OrderTable>>;

    /// Tables currently referencing `group_id`.
    async fn find_all_by_group_id(&self, group_id: &TableGroupId) -> StoreResult<Vec<OrderTable>>;

    /// Inserts or replaces the table.
    async fn save(&self, table: &OrderTable) -> StoreResult<OrderTable>;

    /// Writes `empty` only, and only while the table is ungrouped and holds
    /// no order whose status is in `blocking`.
    ///
    /// Returns `false` when the table is missing or either condition fails.
    async fn update_empty(
        &self,
        id: &OrderTableId,
        empty: bool,
        blocking: &[OrderStatus],
    ) -> StoreResult<bool>;

    /// Writes `number_of_guests` only, and only while the table is occupied.
    async fn update_number_of_guests(
        &self,
        id: &OrderTableId,
        number_of_guests: u32,
    ) -> StoreResult<bool>;
}

/// Order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_by_id(&self, id: &OrderId) -> StoreResult<Option<Order>>;

    async fn find_all(&self) -> StoreResult<Vec<Order>>;

    /// True when any of `table_ids` holds an order whose status is in `statuses`.
    async fn exists_by_table_ids_and_statuses(
        &self,
        table_ids: &[OrderTableId],
        statuses: &[OrderStatus],
    ) -> StoreResult<bool>;

    /// Inserts a new order together with its line items, atomically.
    async fn save(&self, order: &Order) -> StoreResult<Order>;

    /// Writes `order.status` only if the stored status is still `expected`.
    ///
    /// Returns `false` when another writer got there first.
    async fn update_status(&self, order: &Order, expected: OrderStatus) -> StoreResult<bool>;
}

/// Table group persistence. Owns the grouping relation.
#[async_trait]
pub trait TableGroupStore: Send + Sync {
    /// The group with the tables currently referencing it.
    async fn find_by_id(&self, id: &TableGroupId) -> StoreResult<Option<TableGroup>>;

    /// Persists the group and every member's new state in one unit.
    ///
    /// Fails with [`StoreError::Conflict`] and writes nothing if any member
    /// is no longer empty and ungrouped.
    async fn insert_with_members(&self, group: &TableGroup) -> StoreResult<TableGroup>;

    /// Clears the group reference on every member. Returns how many tables
    /// were released.
    async fn release_members(&self, id: &TableGroupId) -> StoreResult<u64>;
}
