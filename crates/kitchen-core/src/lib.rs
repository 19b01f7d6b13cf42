//! # kitchen-core: Order and Table Logic for Kitchen POS
//!
//! Domain types, rules and services for the dining-room side of a restaurant
//! POS: orders moving through the kitchen, table occupancy, and tables grouped
//! for joint billing. Persistence is behind the traits in [`ports`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kitchen POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              ★ kitchen-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   order   │  │   table   │  │table_group│  │ validation│  │   │
//! │  │   │   Order   │  │OrderTable │  │TableGroup │  │   rules   │  │   │
//! │  │   │  Status   │  │ occupancy │  │  members  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   service ──► ports (async traits) ◄── memory (tests, demos)   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ implements ports                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  kitchen-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`order`] - Order, line items, status lifecycle
//! - [`table`] - Order tables and their occupancy rules
//! - [`table_group`] - Grouping and dissolving tables
//! - [`menu`] - Menu entries referenced by line items
//! - [`quantity`] - Non-negative line item quantity
//! - [`ids`] - Typed UUID identifiers
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`ports`] - Collaborator traits
//! - [`service`] - Operations over the ports
//! - [`memory`] - In-memory collaborators
//!
//! ## Order Lifecycle
//!
//! ```text
//!   create ──► COOKING ◄──► MEAL
//!                 │          │
//!                 └────┬─────┘
//!                      ▼
//!                 COMPLETION   (terminal)
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use kitchen_core::{OrderStatus, OrderTable};
//!
//! let table = OrderTable::new(0, true);
//! assert!(table.ensure_occupied().is_err());
//!
//! let seated = table.with_empty(false).unwrap();
//! assert!(seated.ensure_occupied().is_ok());
//!
//! assert!(OrderStatus::Meal.is_active());
//! assert!(OrderStatus::Completion.is_terminal());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ids;
pub mod memory;
pub mod menu;
pub mod order;
pub mod ports;
pub mod quantity;
pub mod service;
pub mod table;
pub mod table_group;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ActiveOrderScope, CoreError, CoreResult, ErrorKind, ValidationError};
pub use ids::{MenuId, OrderId, OrderTableId, TableGroupId};
pub use menu::Menu;
pub use order::{Order, OrderLineItem, OrderLineItemRequest, OrderRequest, OrderStatus};
pub use quantity::Quantity;
pub use service::{OrderService, Services, TableGroupService, TableService};
pub use table::OrderTable;
pub use table_group::{TableGroup, TableGroupRequest};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Smallest number of tables a group may hold.
pub const MIN_GROUP_SIZE: usize = 2;
