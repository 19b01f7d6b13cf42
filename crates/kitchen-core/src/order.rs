//! # Orders
//!
//! The order aggregate, its line items and the status state machine.
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   place() ──► COOKING ──► MEAL ──► COMPLETION (terminal)               │
//! │                  │                     ▲                                │
//! │                  └─────────────────────┘                                │
//! │                                                                         │
//! │   Any status may be written over any non-terminal status, including    │
//! │   going back from MEAL to COOKING. Nothing leaves COMPLETION.          │
//! │                                                                         │
//! │   Active statuses (block ungroup / change_empty): COOKING, MEAL        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders are never deleted; a completed order stays as the record.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::ids::{MenuId, OrderId, OrderTableId};
use crate::quantity::Quantity;
use crate::table::OrderTable;
use crate::validation::validate_quantity;

// =============================================================================
// Order Status
// =============================================================================

/// Where an order is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Kitchen is preparing the order. Initial status.
    Cooking,
    /// Food is on the table.
    Meal,
    /// Settled. Terminal.
    Completion,
}

impl OrderStatus {
    /// Statuses that still count as unfinished business at a table.
    pub const ACTIVE: [OrderStatus; 2] = [OrderStatus::Cooking, OrderStatus::Meal];

    #[inline]
    pub const fn is_active(self) -> bool {
        matches!(self, OrderStatus::Cooking | OrderStatus::Meal)
    }

    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completion)
    }

    /// Only COMPLETION refuses further transitions.
    #[inline]
    pub const fn can_transition_to(self, _next: OrderStatus) -> bool {
        !self.is_terminal()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Cooking => "COOKING",
            OrderStatus::Meal => "MEAL",
            OrderStatus::Completion => "COMPLETION",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Cooking
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COOKING" => Ok(OrderStatus::Cooking),
            "MEAL" => Ok(OrderStatus::Meal),
            "COMPLETION" => Ok(OrderStatus::Completion),
            _ => Err(ValidationError::InvalidFormat {
                field: "order_status".to_string(),
                reason: format!("'{}' is not one of COOKING, MEAL, COMPLETION", s),
            }),
        }
    }
}

// =============================================================================
// Order Line Item
// =============================================================================

/// One menu selection within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineItem {
    /// 1-based position within the order.
    pub seq: i64,
    pub order_id: OrderId,
    pub menu_id: MenuId,
    pub quantity: Quantity,
}

impl OrderLineItem {
    /// Creates a line item with a validated quantity.
    ///
    /// Menu existence is checked once per order by the order service, not
    /// per item.
    pub fn new(seq: i64, order_id: OrderId, menu_id: MenuId, quantity: i64) -> CoreResult<Self> {
        Ok(OrderLineItem {
            seq,
            order_id,
            menu_id,
            quantity: Quantity::new(quantity)?,
        })
    }
}

// =============================================================================
// Requests
// =============================================================================

/// One requested line: a menu and a raw quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLineItemRequest {
    pub menu_id: MenuId,
    pub quantity: i64,
}

impl OrderLineItemRequest {
    pub fn new(menu_id: MenuId, quantity: i64) -> Self {
        OrderLineItemRequest { menu_id, quantity }
    }
}

/// An order as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderRequest {
    pub order_table_id: OrderTableId,
    pub order_line_items: Vec<OrderLineItemRequest>,
}

impl OrderRequest {
    pub fn new(order_table_id: OrderTableId, order_line_items: Vec<OrderLineItemRequest>) -> Self {
        OrderRequest {
            order_table_id,
            order_line_items,
        }
    }

    /// Checks the request shape and returns the distinct menu ids to look up.
    ///
    /// ## Rules
    /// - At least one line item
    /// - Every quantity is zero or greater
    pub fn validate(&self) -> CoreResult<BTreeSet<MenuId>> {
        if self.order_line_items.is_empty() {
            return Err(CoreError::EmptyOrderLineItems);
        }

        for item in &self.order_line_items {
            validate_quantity(item.quantity)?;
        }

        Ok(self.menu_ids())
    }

    pub fn menu_ids(&self) -> BTreeSet<MenuId> {
        self.order_line_items.iter().map(|item| item.menu_id).collect()
    }
}

/// Compares the catalog's existence count with the distinct ids requested.
pub fn ensure_menus_exist(requested: &BTreeSet<MenuId>, found: u64) -> CoreResult<()> {
    if found != requested.len() as u64 {
        return Err(CoreError::MenuNotFound {
            requested: requested.len(),
            found,
        });
    }
    Ok(())
}

// =============================================================================
// Order
// =============================================================================

/// A customer's placed set of menu selections tied to one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: OrderId,
    pub order_table_id: OrderTableId,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub ordered_at: DateTime<Utc>,
    /// Never empty.
    pub order_line_items: Vec<OrderLineItem>,
}

impl Order {
    /// Builds a new COOKING order on `table`.
    ///
    /// `table` is the resolved `request.order_table_id`. Menu existence must
    /// already have been checked with [`ensure_menus_exist`].
    ///
    /// ## Fails With
    /// - `EmptyOrderLineItems` / `InvalidQuantity` on a malformed request
    /// - `EmptyTable` when nobody is seated at the table
    pub fn place(
        id: OrderId,
        table: &OrderTable,
        request: &OrderRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        request.validate()?;
        table.ensure_occupied()?;

        let order_line_items = request
            .order_line_items
            .iter()
            .enumerate()
            .map(|(idx, item)| OrderLineItem::new(idx as i64 + 1, id, item.menu_id, item.quantity))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Order {
            id,
            order_table_id: table.id,
            status: OrderStatus::Cooking,
            ordered_at: now,
            order_line_items,
        })
    }

    /// Returns the order with `status` written over the current one.
    ///
    /// Fails with `OrderAlreadyCompleted` once the order is COMPLETION,
    /// whatever the requested status.
    pub fn change_status(&self, status: OrderStatus) -> CoreResult<Self> {
        if !self.status.can_transition_to(status) {
            return Err(CoreError::OrderAlreadyCompleted(self.id));
        }

        Ok(Order {
            status,
            ..self.clone()
        })
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
