//! # Entity Identifiers
//!
//! UUID v4 newtypes, one per entity, so a table id can never be passed where
//! an order id is expected.
//!
//! Ids serialize as hyphenated strings and are stored as 16-byte BLOBs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::validate_uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
        #[cfg_attr(feature = "sqlx", sqlx(transparent))]
        #[ts(export)]
        pub struct $name(#[ts(as = "String")] Uuid);

        impl $name {
            /// Generates a fresh random id.
            pub fn new() -> Self {
                $name(Uuid::new_v4())
            }

            #[inline]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                $name(uuid)
            }

            #[inline]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate_uuid(s, $field)?;
                let uuid = Uuid::parse_str(s.trim()).map_err(|_| ValidationError::InvalidFormat {
                    field: $field.to_string(),
                    reason: "must be a valid UUID".to_string(),
                })?;
                Ok($name(uuid))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                $name(uuid)
            }
        }
    };
}

entity_id!(
    /// Identifies an [`Order`](crate::order::Order).
    OrderId,
    "order_id"
);

entity_id!(
    /// Identifies an [`OrderTable`](crate::table::OrderTable).
    OrderTableId,
    "order_table_id"
);

entity_id!(
    /// Identifies a [`TableGroup`](crate::table_group::TableGroup).
    TableGroupId,
    "table_group_id"
);

entity_id!(
    /// Identifies a [`Menu`](crate::menu::Menu) in the catalog.
    MenuId,
    "menu_id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let id: OrderId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "table-1".parse::<OrderTableId>().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidFormat { ref field, .. } if field == "order_table_id"
        ));

        assert!(matches!(
            "".parse::<MenuId>().unwrap_err(),
            ValidationError::Required { .. }
        ));
    }

    #[test]
    fn test_serializes_as_string() {
        let id = TableGroupId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));

        let back: TableGroupId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_new_ids_are_unique() {
        assert_ne!(MenuId::new(), MenuId::new());
    }
}
