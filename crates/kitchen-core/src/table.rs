//! # Order Table
//!
//! A physical seating unit.
//!
//! ## Occupancy and Grouping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Two independent flags                                   │
//! │                                                                         │
//! │   empty            operator-controlled (change_empty)                  │
//! │                    set to false by grouping                            │
//! │                    never touched by orders or ungrouping               │
//! │                                                                         │
//! │   table_group_id   set only by TableGroup::form                        │
//! │                    cleared only by ungroup                             │
//! │                                                                         │
//! │   grouped  ⇒  occupancy is managed by the group, not the table         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All transitions return a new value; nothing here mutates in place.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ids::{OrderTableId, TableGroupId};

/// A seating unit that can hold orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderTable {
    pub id: OrderTableId,

    /// Back-reference to the owning group; `Some` means "grouped".
    pub table_group_id: Option<TableGroupId>,

    /// Guests currently seated (seating capacity in use).
    pub number_of_guests: u32,

    /// Unoccupied. An empty table cannot receive orders.
    pub empty: bool,
}

impl OrderTable {
    /// Creates a standalone table with a fresh id.
    pub fn new(number_of_guests: u32, empty: bool) -> Self {
        OrderTable {
            id: OrderTableId::new(),
            table_group_id: None,
            number_of_guests,
            empty,
        }
    }

    #[inline]
    pub fn is_grouped(&self) -> bool {
        self.table_group_id.is_some()
    }

    /// Fails with [`CoreError::EmptyTable`] when nobody is seated.
    pub fn ensure_occupied(&self) -> CoreResult<()> {
        if self.empty {
            return Err(CoreError::EmptyTable(self.id));
        }
        Ok(())
    }

    /// Returns the table with its empty flag replaced.
    ///
    /// Grouped tables cannot change occupancy on their own. The active-order
    /// check needs the order store and lives in the table service.
    pub fn with_empty(&self, empty: bool) -> CoreResult<Self> {
        if self.is_grouped() {
            return Err(CoreError::AlreadyGrouped(self.id));
        }

        Ok(OrderTable {
            empty,
            ..self.clone()
        })
    }

    /// Returns the table with a new guest count. The table must be occupied.
    pub fn with_number_of_guests(&self, number_of_guests: u32) -> CoreResult<Self> {
        self.ensure_occupied()?;

        Ok(OrderTable {
            number_of_guests,
            ..self.clone()
        })
    }

    /// Checks that the table may join a new group.
    ///
    /// A grouped table is always non-empty, so the grouped check runs first
    /// and reports the more specific reason.
    pub fn ensure_groupable(&self) -> CoreResult<()> {
        if self.is_grouped() {
            return Err(CoreError::AlreadyGrouped(self.id));
        }
        if !self.empty {
            return Err(CoreError::TableNotEmpty(self.id));
        }
        Ok(())
    }

    /// Returns the table as a member of `group_id`, seated.
    pub fn joined(&self, group_id: TableGroupId) -> Self {
        OrderTable {
            table_group_id: Some(group_id),
            empty: false,
            ..self.clone()
        }
    }

    /// Returns the table without a group; occupancy is left as it was.
    pub fn released(&self) -> Self {
        OrderTable {
            table_group_id: None,
            ..self.clone()
        }
    }
}
