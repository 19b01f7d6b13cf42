//! # Error Types
//!
//! Domain-specific error types for kitchen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kitchen-core errors (this file)                                       │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Input shape failures                           │
//! │                                                                         │
//! │  kitchen-core ports (ports.rs)                                         │
//! │  └── StoreError       - Collaborator (storage) failures                │
//! │                                                                         │
//! │  kitchen-db errors (separate crate)                                    │
//! │  └── DbError          - sqlx failures, converted into StoreError       │
//! │                                                                         │
//! │  Flow: DbError → StoreError → CoreError → caller                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant aborts the operation before anything is written.

use std::fmt;

use thiserror::Error;

use crate::ids::{OrderId, OrderTableId, TableGroupId};
use crate::ports::StoreError;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity below zero.
    #[error("Invalid quantity: {value} (must be zero or greater)")]
    InvalidQuantity { value: i64 },

    /// An order must carry at least one line item.
    #[error("Order must contain at least one line item")]
    EmptyOrderLineItems,

    /// The catalog knows fewer of the referenced menus than were requested.
    ///
    /// ## When This Occurs
    /// ```text
    /// line items: [menu A, menu B, menu A]
    ///      │
    ///      ▼
    /// distinct ids {A, B} → catalog count = 1
    ///      │
    ///      ▼
    /// MenuNotFound { requested: 2, found: 1 }
    /// ```
    #[error("Menu not found: {found} of {requested} referenced menus exist")]
    MenuNotFound { requested: usize, found: u64 },

    /// Table id does not resolve.
    #[error("Order table not found: {0}")]
    TableNotFound(OrderTableId),

    /// Orders cannot be placed on (or guests seated at) an empty table.
    #[error("Order table {0} is empty")]
    EmptyTable(OrderTableId),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// COMPLETION is terminal.
    #[error("Order {0} is already completed")]
    OrderAlreadyCompleted(OrderId),

    /// The table belongs to a table group.
    #[error("Order table {0} is already grouped")]
    AlreadyGrouped(OrderTableId),

    /// A COOKING or MEAL order blocks the operation.
    #[error("Active order exists for {0}")]
    ActiveOrderExists(ActiveOrderScope),

    /// A group needs at least two tables.
    #[error("Table group needs at least {min} tables, got {given}")]
    InsufficientTables { given: usize, min: usize },

    /// Grouping candidates must be empty.
    #[error("Order table {0} is not empty")]
    TableNotEmpty(OrderTableId),

    #[error("Table group not found: {0}")]
    TableGroupNotFound(TableGroupId),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A collaborator failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Where an active order was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveOrderScope {
    Table(OrderTableId),
    Group(TableGroupId),
}

impl fmt::Display for ActiveOrderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveOrderScope::Table(id) => write!(f, "order table {}", id),
            ActiveOrderScope::Group(id) => write!(f, "table group {}", id),
        }
    }
}

/// Broad classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape.
    Validation,
    /// Unknown id.
    NotFound,
    /// The current state forbids the operation.
    Conflict,
    /// Storage failed underneath the domain.
    Store,
}

impl CoreError {
    /// Classifies the error for callers that map failures onto responses.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidQuantity { .. }
            | CoreError::EmptyOrderLineItems
            | CoreError::InsufficientTables { .. }
            | CoreError::Validation(_) => ErrorKind::Validation,

            CoreError::MenuNotFound { .. }
            | CoreError::TableNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::TableGroupNotFound(_) => ErrorKind::NotFound,

            CoreError::EmptyTable(_)
            | CoreError::OrderAlreadyCompleted(_)
            | CoreError::AlreadyGrouped(_)
            | CoreError::ActiveOrderExists(_)
            | CoreError::TableNotEmpty(_) => ErrorKind::Conflict,

            CoreError::Store(StoreError::Conflict { .. }) => ErrorKind::Conflict,
            CoreError::Store(_) => ErrorKind::Store,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            CoreError::EmptyOrderLineItems => "EMPTY_ORDER_LINE_ITEMS",
            CoreError::MenuNotFound { .. } => "MENU_NOT_FOUND",
            CoreError::TableNotFound(_) => "TABLE_NOT_FOUND",
            CoreError::EmptyTable(_) => "EMPTY_TABLE",
            CoreError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            CoreError::OrderAlreadyCompleted(_) => "ORDER_ALREADY_COMPLETED",
            CoreError::AlreadyGrouped(_) => "ALREADY_GROUPED",
            CoreError::ActiveOrderExists(_) => "ACTIVE_ORDER_EXISTS",
            CoreError::InsufficientTables { .. } => "INSUFFICIENT_TABLES",
            CoreError::TableNotEmpty(_) => "TABLE_NOT_EMPTY",
            CoreError::TableGroupNotFound(_) => "TABLE_GROUP_NOT_FOUND",
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::Store(StoreError::Conflict { .. }) => "CONCURRENT_MODIFICATION",
            CoreError::Store(_) => "STORE_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any lookup runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., the same table twice in one group).
    #[error("{field} '{value}' is duplicated")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
