//! # Order Table Repository
//!
//! Table rows, including the `table_group_id` back-reference. Group membership
//! is written by the table group repository; `save` here is a plain upsert
//! used for new tables.
//!
//! Occupancy and guest count on existing tables go through single-column
//! conditional updates, so a grouping that commits between a service's read
//! and its write is never overwritten:
//!
//! ```text
//! update_empty_if      SET empty            WHERE table_group_id IS NULL
//!                                             AND no order in <blocking>
//! update_guests_if     SET number_of_guests WHERE empty = 0
//! ```

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kitchen_core::ports::{OrderTableStore, StoreResult};
use kitchen_core::{OrderStatus, OrderTable, OrderTableId, TableGroupId};

/// Repository for order table database operations.
#[derive(Debug, Clone)]
pub struct OrderTableRepository {
    pool: SqlitePool,
}

impl OrderTableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderTableRepository { pool }
    }

    pub async fn get_by_id(&self, id: &OrderTableId) -> DbResult<Option<OrderTable>> {
        let table = sqlx::query_as::<_, OrderTable>(
            r#"
            SELECT id, table_group_id, number_of_guests, empty
            FROM order_tables
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(table)
    }

    pub async fn list(&self) -> DbResult<Vec<OrderTable>> {
        let tables = sqlx::query_as::<_, OrderTable>(
            r#"
            SELECT id, table_group_id, number_of_guests, empty
            FROM order_tables
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Tables among `ids` that exist.
    pub async fn list_by_ids(&self, ids: &[OrderTableId]) -> DbResult<Vec<OrderTable>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, table_group_id, number_of_guests, empty FROM order_tables WHERE id IN (",
        );
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY rowid");

        let tables = query.build_query_as::<OrderTable>().fetch_all(&self.pool).await?;
        debug!(requested = ids.len(), found = tables.len(), "Resolved order tables");

        Ok(tables)
    }

    pub async fn list_by_group(&self, group_id: &TableGroupId) -> DbResult<Vec<OrderTable>> {
        let tables = sqlx::query_as::<_, OrderTable>(
            r#"
            SELECT id, table_group_id, number_of_guests, empty
            FROM order_tables
            WHERE table_group_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Inserts the table, or overwrites every column of an existing one.
    pub async fn upsert(&self, table: &OrderTable) -> DbResult<()> {
        debug!(id = %table.id, empty = table.empty, "Saving order table");

        sqlx::query(
            r#"
            INSERT INTO order_tables (id, table_group_id, number_of_guests, empty)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE SET
                table_group_id = excluded.table_group_id,
                number_of_guests = excluded.number_of_guests,
                empty = excluded.empty
            "#,
        )
        .bind(table.id)
        .bind(table.table_group_id)
        .bind(table.number_of_guests)
        .bind(table.empty)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Sets `empty` on an ungrouped table with no order in `blocking`.
    ///
    /// Returns `false` when no row matched.
    pub async fn update_empty_if(
        &self,
        id: &OrderTableId,
        empty: bool,
        blocking: &[OrderStatus],
    ) -> DbResult<bool> {
        let mut query = QueryBuilder::<Sqlite>::new("UPDATE order_tables SET empty = ");
        query.push_bind(empty);
        query.push(" WHERE id = ");
        query.push_bind(*id);
        query.push(" AND table_group_id IS NULL");

        if !blocking.is_empty() {
            query.push(
                " AND NOT EXISTS (SELECT 1 FROM orders \
                 WHERE orders.order_table_id = order_tables.id AND orders.status IN (",
            );
            let mut separated = query.separated(", ");
            for status in blocking {
                separated.push_bind(*status);
            }
            separated.push_unseparated("))");
        }

        let result = query.build().execute(&self.pool).await?;
        debug!(%id, empty, updated = result.rows_affected(), "Order table occupancy write");

        Ok(result.rows_affected() == 1)
    }

    /// Sets `number_of_guests` on an occupied table.
    pub async fn update_guests_if(&self, id: &OrderTableId, number_of_guests: u32) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE order_tables
            SET number_of_guests = ?1
            WHERE id = ?2 AND empty = 0
            "#,
        )
        .bind(number_of_guests)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl OrderTableStore for OrderTableRepository {
    async fn find_by_id(&self, id: &OrderTableId) -> StoreResult<Option<OrderTable>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn find_all(&self) -> StoreResult<Vec<OrderTable>> {
        Ok(self.list().await?)
    }

    async fn find_all_by_ids(&self, ids: &[OrderTableId]) -> StoreResult<Vec<OrderTable>> {
        Ok(self.list_by_ids(ids).await?)
    }

    async fn find_all_by_group_id(&self, group_id: &TableGroupId) -> StoreResult<Vec<OrderTable>> {
        Ok(self.list_by_group(group_id).await?)
    }

    async fn save(&self, table: &OrderTable) -> StoreResult<OrderTable> {
        self.upsert(table).await?;
        Ok(table.clone())
    }

    async fn update_empty(
        &self,
        id: &OrderTableId,
        empty: bool,
        blocking: &[OrderStatus],
    ) -> StoreResult<bool> {
        Ok(self.update_empty_if(id, empty, blocking).await?)
    }

    async fn update_number_of_guests(
        &self,
        id: &OrderTableId,
        number_of_guests: u32,
    ) -> StoreResult<bool> {
        Ok(self.update_guests_if(id, number_of_guests).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use kitchen_core::{
        Menu, Order, OrderId, OrderLineItemRequest, OrderRequest, TableGroup, TableGroupRequest,
    };

    #[tokio::test]
    async fn test_upsert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.order_tables();

        let table = OrderTable::new(3, false);
        tables.upsert(&table).await.unwrap();
        assert_eq!(tables.get_by_id(&table.id).await.unwrap(), Some(table.clone()));

        let released = table.with_empty(true).unwrap();
        tables.upsert(&released).await.unwrap();
        assert_eq!(tables.get_by_id(&table.id).await.unwrap(), Some(released));
        assert_eq!(tables.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db
            .order_tables()
            .get_by_id(&OrderTableId::new())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_by_ids_skips_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.order_tables();

        let a = OrderTable::new(0, true);
        let b = OrderTable::new(0, true);
        tables.upsert(&a).await.unwrap();
        tables.upsert(&b).await.unwrap();

        let found = tables
            .list_by_ids(&[a.id, OrderTableId::new(), b.id])
            .await
            .unwrap();
        assert_eq!(found, vec![a, b]);
        assert!(tables.list_by_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_empty_keeps_concurrent_grouping() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.order_tables();
        let a = OrderTable::new(0, true);
        let b = OrderTable::new(0, true);
        tables.upsert(&a).await.unwrap();
        tables.upsert(&b).await.unwrap();

        // `a` was read as ungrouped; a grouping commits before the write.
        let stale = tables.get_by_id(&a.id).await.unwrap().unwrap();
        let request = TableGroupRequest::new(vec![a.id, b.id]);
        let group = TableGroup::form(TableGroupId::new(), &request, vec![a.clone(), b], Utc::now())
            .unwrap();
        db.table_groups().insert_with_members(&group).await.unwrap();

        assert!(!tables
            .update_empty_if(&stale.id, true, &OrderStatus::ACTIVE)
            .await
            .unwrap());

        let stored = tables.get_by_id(&a.id).await.unwrap().unwrap();
        assert_eq!(stored.table_group_id, Some(group.id));
        assert!(!stored.empty);
        assert_eq!(tables.list_by_group(&group.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_empty_blocked_by_active_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.order_tables();
        let menu = Menu::new("Cream Pasta", 13000, Utc::now()).unwrap();
        db.menus().insert(&menu).await.unwrap();

        let table = OrderTable::new(2, false);
        tables.upsert(&table).await.unwrap();
        let request = OrderRequest::new(table.id, vec![OrderLineItemRequest::new(menu.id, 1)]);
        let order = Order::place(OrderId::new(), &table, &request, Utc::now()).unwrap();
        db.orders().insert(&order).await.unwrap();

        assert!(!tables
            .update_empty_if(&table.id, true, &OrderStatus::ACTIVE)
            .await
            .unwrap());
        assert!(!tables.get_by_id(&table.id).await.unwrap().unwrap().empty);

        let completed = order.change_status(OrderStatus::Completion).unwrap();
        assert!(db
            .orders()
            .update_status_if(&completed, OrderStatus::Cooking)
            .await
            .unwrap());
        assert!(tables
            .update_empty_if(&table.id, true, &OrderStatus::ACTIVE)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_guests_requires_occupied_table() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = db.order_tables();
        let seated = OrderTable::new(2, false);
        let empty = OrderTable::new(0, true);
        tables.upsert(&seated).await.unwrap();
        tables.upsert(&empty).await.unwrap();

        assert!(tables.update_guests_if(&seated.id, 4).await.unwrap());
        assert!(!tables.update_guests_if(&empty.id, 4).await.unwrap());
        assert!(!tables.update_guests_if(&OrderTableId::new(), 4).await.unwrap());

        let stored = tables.get_by_id(&seated.id).await.unwrap().unwrap();
        assert_eq!(stored.number_of_guests, 4);
        assert!(!stored.empty);
        assert_eq!(tables.get_by_id(&empty.id).await.unwrap().unwrap().number_of_guests, 0);
    }
}
