//! # Order Service
//!
//! `create`, `list` and `change_status` against the collaborator ports.
//!
//! ## create
//! ```text
//! OrderRequest
//!   │ validate()                     EmptyOrderLineItems / InvalidQuantity
//!   ▼
//! menus.count_existing_menus(ids)    MenuNotFound
//!   ▼
//! tables.find_by_id                  TableNotFound
//!   ▼
//! Order::place                       EmptyTable
//!   ▼
//! orders.save (order + items, one transaction)
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::ids::OrderId;
use crate::order::{ensure_menus_exist, Order, OrderRequest, OrderStatus};
use crate::ports::{MenuCatalog, OrderStore, OrderTableStore, StoreError};

/// Places orders and moves them through their statuses.
#[derive(Clone)]
pub struct OrderService {
    menus: Arc<dyn MenuCatalog>,
    tables: Arc<dyn OrderTableStore>,
    orders: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(
        menus: Arc<dyn MenuCatalog>,
        tables: Arc<dyn OrderTableStore>,
        orders: Arc<dyn OrderStore>,
    ) -> Self {
        OrderService {
            menus,
            tables,
            orders,
        }
    }

    /// Places a new order in COOKING.
    pub async fn create(&self, request: &OrderRequest) -> CoreResult<Order> {
        let menu_ids = request.validate()?;

        let found = self.menus.count_existing_menus(&menu_ids).await?;
        ensure_menus_exist(&menu_ids, found)?;

        let table = self
            .tables
            .find_by_id(&request.order_table_id)
            .await?
            .ok_or(CoreError::TableNotFound(request.order_table_id))?;

        let order = Order::place(OrderId::new(), &table, request, Utc::now())?;
        let saved = self.orders.save(&order).await?;

        info!(
            order_id = %saved.id,
            order_table_id = %saved.order_table_id,
            line_items = saved.order_line_items.len(),
            "Order placed"
        );
        Ok(saved)
    }

    /// Every order, completed ones included.
    pub async fn list(&self) -> CoreResult<Vec<Order>> {
        let orders = self.orders.find_all().await?;
        debug!(count = orders.len(), "Listed orders");
        Ok(orders)
    }

    /// Overwrites the status of a non-completed order.
    pub async fn change_status(&self, order_id: &OrderId, status: OrderStatus) -> CoreResult<Order> {
        let current = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(CoreError::OrderNotFound(*order_id))?;

        let updated = current.change_status(status).map_err(|err| {
            warn!(order_id = %order_id, requested = %status, "Order already completed");
            err
        })?;

        if !self.orders.update_status(&updated, current.status).await? {
            return Err(self.lost_status_race(order_id).await);
        }

        info!(
            order_id = %order_id,
            from = %current.status,
            to = %status,
            "Order status changed"
        );
        Ok(updated)
    }

    /// Explains why a conditional status write did not apply.
    async fn lost_status_race(&self, order_id: &OrderId) -> CoreError {
        match self.orders.find_by_id(order_id).await {
            Ok(Some(order)) if order.is_completed() => CoreError::OrderAlreadyCompleted(*order_id),
            Ok(Some(_)) => StoreError::conflict("Order", order_id).into(),
            Ok(None) => CoreError::OrderNotFound(*order_id),
            Err(err) => err.into(),
        }
    }
}
