//! # kitchen-db: Database Layer for Kitchen POS
//!
//! SQLite persistence for kitchen-core. Every repository implements one of
//! the core ports, so `Database::services()` gives the same services the
//! in-memory store does, backed by sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kitchen POS Data Flow                            │
//! │                                                                         │
//! │  services.orders.create(request)         (kitchen-core)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    kitchen-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ MenuRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderTableRepo│    │ 001_initial  │  │   │
//! │  │   │ DbConfig      │    │ OrderRepo     │    │  _schema.sql │  │   │
//! │  │   │               │    │ TableGroupRepo│    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (KITCHEN_DB_PATH)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Port implementations
//! - [`telemetry`] - Tracing subscriber for the binaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kitchen_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/kitchen.db")).await?;
//! let services = db.services();
//! let table = services.tables.create(0, true).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, KitchenConfig, DEFAULT_LOG_FILTER};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use telemetry::init_tracing;

pub use repository::{MenuRepository, OrderRepository, OrderTableRepository, TableGroupRepository};

// =============================================================================
// Service Tests on SQLite
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kitchen_core::{
        ActiveOrderScope, CoreError, Menu, OrderLineItemRequest, OrderRequest, OrderStatus,
        Services, TableGroupRequest,
    };

    async fn setup() -> (Database, Services, Menu) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let menu = Menu::new("Fried Chicken", 16000, Utc::now()).unwrap();
        db.menus().insert(&menu).await.unwrap();
        let services = db.services();
        (db, services, menu)
    }

    #[tokio::test]
    async fn test_dinner_service_lifecycle() {
        let (_db, services, menu) = setup().await;

        let a = services.tables.create(0, true).await.unwrap();
        let b = services.tables.create(0, true).await.unwrap();

        let group = services
            .table_groups
            .create(&TableGroupRequest::new(vec![a.id, b.id]))
            .await
            .unwrap();

        let stored = services.table_groups.find(&group.id).await.unwrap();
        assert_eq!(stored.order_tables.len(), 2);
        assert!(stored.order_tables.iter().all(|t| !t.empty && t.is_grouped()));

        let order = services
            .orders
            .create(&OrderRequest::new(a.id, vec![OrderLineItemRequest::new(menu.id, 1)]))
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Cooking);

        let err = services.table_groups.ungroup(&group.id).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::ActiveOrderExists(ActiveOrderScope::Group(id)) if id == group.id
        ));

        services
            .orders
            .change_status(&order.id, OrderStatus::Completion)
            .await
            .unwrap();

        services.table_groups.ungroup(&group.id).await.unwrap();

        for table in services.tables.list().await.unwrap() {
            assert!(table.table_group_id.is_none());
            assert!(!table.empty);
        }

        let orders = services.orders.list().await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Completion);
        assert_eq!(orders[0].order_line_items.len(), 1);
    }

    #[tokio::test]
    async fn test_grouping_with_grouped_table_leaves_others_untouched() {
        let (_db, services, _menu) = setup().await;

        let a = services.tables.create(0, true).await.unwrap();
        let b = services.tables.create(0, true).await.unwrap();
        let c = services.tables.create(0, true).await.unwrap();
        services
            .table_groups
            .create(&TableGroupRequest::new(vec![b.id, c.id]))
            .await
            .unwrap();

        let err = services
            .table_groups
            .create(&TableGroupRequest::new(vec![a.id, b.id]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyGrouped(id) if id == b.id));

        let tables = services.tables.list().await.unwrap();
        let first = tables.iter().find(|t| t.id == a.id).unwrap();
        assert!(first.empty);
        assert!(!first.is_grouped());
    }

    #[tokio::test]
    async fn test_completed_order_is_final() {
        let (_db, services, menu) = setup().await;
        let table = services.tables.create(2, false).await.unwrap();
        let order = services
            .orders
            .create(&OrderRequest::new(table.id, vec![OrderLineItemRequest::new(menu.id, 3)]))
            .await
            .unwrap();

        services
            .orders
            .change_status(&order.id, OrderStatus::Meal)
            .await
            .unwrap();
        services
            .orders
            .change_status(&order.id, OrderStatus::Completion)
            .await
            .unwrap();

        for next in [OrderStatus::Cooking, OrderStatus::Meal, OrderStatus::Completion] {
            let err = services.orders.change_status(&order.id, next).await.unwrap_err();
            assert!(matches!(err, CoreError::OrderAlreadyCompleted(_)));
        }
    }

    #[tokio::test]
    async fn test_order_rejected_on_empty_table_or_unknown_menu() {
        let (_db, services, menu) = setup().await;
        let empty = services.tables.create(0, true).await.unwrap();
        let seated = services.tables.create(2, false).await.unwrap();

        let err = services
            .orders
            .create(&OrderRequest::new(empty.id, vec![OrderLineItemRequest::new(menu.id, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyTable(_)));

        let err = services
            .orders
            .create(&OrderRequest::new(
                seated.id,
                vec![OrderLineItemRequest::new(kitchen_core::MenuId::new(), 1)],
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MenuNotFound { .. }));

        assert!(services.orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_change_empty_blocked_by_active_order() {
        let (_db, services, menu) = setup().await;
        let table = services.tables.create(2, false).await.unwrap();
        let order = services
            .orders
            .create(&OrderRequest::new(table.id, vec![OrderLineItemRequest::new(menu.id, 1)]))
            .await
            .unwrap();

        let err = services.tables.change_empty(&table.id, true).await.unwrap_err();
        assert!(matches!(err, CoreError::ActiveOrderExists(ActiveOrderScope::Table(_))));

        services
            .orders
            .change_status(&order.id, OrderStatus::Completion)
            .await
            .unwrap();
        let released = services.tables.change_empty(&table.id, true).await.unwrap();
        assert!(released.empty);
    }

    #[tokio::test]
    async fn test_table_writes_keep_group_membership() {
        let (db, services, _menu) = setup().await;
        let a = services.tables.create(0, true).await.unwrap();
        let b = services.tables.create(0, true).await.unwrap();
        let group = services
            .table_groups
            .create(&TableGroupRequest::new(vec![a.id, b.id]))
            .await
            .unwrap();

        let err = services.tables.change_empty(&a.id, true).await.unwrap_err();
        assert!(matches!(err, CoreError::AlreadyGrouped(id) if id == a.id));

        let seated = services.tables.change_number_of_guests(&a.id, 4).await.unwrap();
        assert_eq!(seated.number_of_guests, 4);

        let members = db.order_tables().list_by_group(&group.id).await.unwrap();
        assert_eq!(members.len(), 2);
        let first = members.iter().find(|t| t.id == a.id).unwrap();
        assert_eq!(first.number_of_guests, 4);
        assert!(!first.empty);
    }
}
