//! # Repository Module
//!
//! SQLite implementations of the kitchen-core ports.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kitchen-core service                                                   │
//! │       │  Arc<dyn OrderStore>                                            │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── inherent methods (get_by_id, insert, ...)  → DbResult<T>          │
//! │  └── impl OrderStore  (thin wrapper)            → StoreResult<T>       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`MenuRepository`] - Menu catalog
//! - [`OrderTableRepository`] - Tables and occupancy
//! - [`OrderRepository`] - Orders and line items
//! - [`TableGroupRepository`] - Groups and membership writes

pub mod menu;
pub mod order;
pub mod order_table;
pub mod table_group;

pub use menu::MenuRepository;
pub use order::OrderRepository;
pub use order_table::OrderTableRepository;
pub use table_group::TableGroupRepository;
