//! # Validation Module
//!
//! Input validation utilities for Kitchen POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request shape (THIS MODULE)                                  │
//! │  ├── Non-negative quantities and guest counts                          │
//! │  ├── Group size, duplicate ids                                         │
//! │  └── UUID format                                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain rules (order.rs, table.rs, table_group.rs)            │
//! │  ├── Status transitions                                                │
//! │  └── Empty / grouped preconditions                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints                                                 │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::MIN_GROUP_SIZE;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be zero or greater
///
/// ## Example
/// ```rust
/// use kitchen_core::validation::validate_quantity;
///
/// assert!(validate_quantity(0).is_ok());
/// assert!(validate_quantity(3).is_ok());
/// assert!(validate_quantity(-1).is_err());
/// ```
pub fn validate_quantity(value: i64) -> CoreResult<()> {
    if value < 0 {
        return Err(CoreError::InvalidQuantity { value });
    }

    Ok(())
}

/// Validates a guest count and narrows it to `u32`.
///
/// ## Rules
/// - Must be between 0 and `u32::MAX`
pub fn validate_number_of_guests(count: i64) -> ValidationResult<u32> {
    u32::try_from(count).map_err(|_| ValidationError::OutOfRange {
        field: "number_of_guests".to_string(),
        min: 0,
        max: u32::MAX as i64,
    })
}

/// Validates a menu price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (complimentary items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of tables in a grouping request.
///
/// ## Rules
/// - At least [`MIN_GROUP_SIZE`] (2) tables
pub fn validate_group_size(given: usize) -> CoreResult<()> {
    if given < MIN_GROUP_SIZE {
        return Err(CoreError::InsufficientTables {
            given,
            min: MIN_GROUP_SIZE,
        });
    }

    Ok(())
}

/// Rejects the first value that appears twice.
pub fn validate_unique<T>(field: &str, values: &[T]) -> ValidationResult<()>
where
    T: Eq + Hash + Display,
{
    let mut seen = HashSet::with_capacity(values.len());
    for value in values {
        if !seen.insert(value) {
            return Err(ValidationError::Duplicate {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a menu name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_menu_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::InvalidFormat {
            field: "name".to_string(),
            reason: "must be at most 200 characters".to_string(),
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use kitchen_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000", "id").is_ok());
/// assert!(validate_uuid("not-a-uuid", "id").is_err());
/// ```
pub fn validate_uuid(id: &str, field: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
