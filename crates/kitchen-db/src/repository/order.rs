//! # Order Repository
//!
//! Orders and their line items.
//!
//! ## Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(order)                                                          │
//! │    BEGIN                                                                │
//! │      INSERT orders            (status = cooking)                        │
//! │      INSERT order_line_items  × n                                       │
//! │    COMMIT                     (any failure rolls back everything)       │
//! │                                                                         │
//! │  update_status_if(order, expected)                                      │
//! │    UPDATE orders SET status = ? WHERE id = ? AND status = <expected>    │
//! │    rows_affected = 0  →  someone else wrote first                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use kitchen_core::ports::{OrderStore, StoreResult};
use kitchen_core::{MenuId, Order, OrderId, OrderLineItem, OrderStatus, OrderTableId};

#[derive(Debug, FromRow)]
struct OrderRow {
    id: OrderId,
    order_table_id: OrderTableId,
    status: OrderStatus,
    ordered_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct LineItemRow {
    order_id: OrderId,
    seq: i64,
    menu_id: MenuId,
    quantity: i64,
}

impl LineItemRow {
    fn into_line_item(self) -> DbResult<OrderLineItem> {
        OrderLineItem::new(self.seq, self.order_id, self.menu_id, self.quantity)
            .map_err(|err| DbError::corrupt("OrderLineItem", err))
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<LineItemRow>) -> DbResult<Order> {
        let order_line_items = items
            .into_iter()
            .map(LineItemRow::into_line_item)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Order {
            id: self.id,
            order_table_id: self.order_table_id,
            status: self.status,
            ordered_at: self.ordered_at,
            order_line_items,
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    pub async fn get_by_id(&self, id: &OrderId) -> DbResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, order_table_id, status, ordered_at
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT order_id, seq, menu_id, quantity
            FROM order_line_items
            WHERE order_id = ?1
            ORDER BY seq
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        row.into_order(items).map(Some)
    }

    /// All orders in placement order, each with its line items.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, order_table_id, status, ordered_at
            FROM orders
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, LineItemRow>(
            r#"
            SELECT order_id, seq, menu_id, quantity
            FROM order_line_items
            ORDER BY order_id, seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<LineItemRow>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }

    /// Whether any table in `table_ids` has an order in one of `statuses`.
    pub async fn exists_for_tables(
        &self,
        table_ids: &[OrderTableId],
        statuses: &[OrderStatus],
    ) -> DbResult<bool> {
        if table_ids.is_empty() || statuses.is_empty() {
            return Ok(false);
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT EXISTS (SELECT 1 FROM orders WHERE order_table_id IN (",
        );
        {
            let mut separated = query.separated(", ");
            for id in table_ids {
                separated.push_bind(*id);
            }
        }
        query.push(") AND status IN (");
        {
            let mut separated = query.separated(", ");
            for status in statuses {
                separated.push_bind(*status);
            }
        }
        query.push("))");

        let exists: bool = query.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(exists)
    }

    /// Inserts the order and its line items in one transaction.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(
            id = %order.id,
            order_table_id = %order.order_table_id,
            line_items = order.order_line_items.len(),
            "Inserting order"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, order_table_id, status, ordered_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(order.id)
        .bind(order.order_table_id)
        .bind(order.status)
        .bind(order.ordered_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.order_line_items {
            sqlx::query(
                r#"
                INSERT INTO order_line_items (order_id, seq, menu_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(item.order_id)
            .bind(item.seq)
            .bind(item.menu_id)
            .bind(item.quantity.value())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Writes `order.status` only while the stored status is still `expected`.
    ///
    /// ## Returns
    /// * `Ok(true)` - status written
    /// * `Ok(false)` - stored status had already changed
    /// * `Err(NotFound)` - no such order
    pub async fn update_status_if(&self, order: &Order, expected: OrderStatus) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?1
            WHERE id = ?2 AND status = ?3
            "#,
        )
        .bind(order.status)
        .bind(order.id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            debug!(id = %order.id, from = %expected, to = %order.status, "Order status updated");
            return Ok(true);
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE id = ?1)")
            .bind(order.id)
            .fetch_one(&self.pool)
            .await?;

        if !exists {
            return Err(DbError::not_found("Order", order.id));
        }
        Ok(false)
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn find_by_id(&self, id: &OrderId) -> StoreResult<Option<Order>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn find_all(&self) -> StoreResult<Vec<Order>> {
        Ok(self.list().await?)
    }

    async fn exists_by_table_ids_and_statuses(
        &self,
        table_ids: &[OrderTableId],
        statuses: &[OrderStatus],
    ) -> StoreResult<bool> {
        Ok(self.exists_for_tables(table_ids, statuses).await?)
    }

    async fn save(&self, order: &Order) -> StoreResult<Order> {
        self.insert(order).await?;
        Ok(order.clone())
    }

    async fn update_status(&self, order: &Order, expected: OrderStatus) -> StoreResult<bool> {
        Ok(self.update_status_if(order, expected).await?)
    }
}
