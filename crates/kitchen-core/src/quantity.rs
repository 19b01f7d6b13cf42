//! # Quantity
//!
//! Non-negative integral amount of one menu on an order line.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_quantity;

/// How many of a menu were ordered.
///
/// Zero is allowed; negative values never construct. Equality and ordering
/// follow the underlying integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Quantity(i64);

impl Quantity {
    /// Creates a quantity, failing with [`CoreError::InvalidQuantity`] below zero.
    ///
    /// ## Example
    /// ```rust
    /// use kitchen_core::quantity::Quantity;
    ///
    /// assert_eq!(Quantity::new(2).unwrap().value(), 2);
    /// assert!(Quantity::new(-1).is_err());
    /// ```
    pub fn new(value: i64) -> CoreResult<Self> {
        validate_quantity(value)?;
        Ok(Quantity(value))
    }

    #[inline]
    pub const fn zero() -> Self {
        Quantity(0)
    }

    #[inline]
    pub const fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Quantity {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Quantity::new(value)
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Deserialization goes through `new` so a negative payload never slips in.
impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = i64::deserialize(deserializer)?;
        Quantity::new(value).map_err(serde::de::Error::custom)
    }
}
