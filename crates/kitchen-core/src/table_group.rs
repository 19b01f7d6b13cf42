//! # Table Groups
//!
//! Two or more tables billed as one unit.
//!
//! ## Grouping Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  form(ids)                                                              │
//! │    ├── fewer than 2 ids ............... InsufficientTables             │
//! │    ├── same id twice .................. Validation(Duplicate)          │
//! │    ├── resolved < requested ........... TableNotFound                  │
//! │    └── per member, in request order                                    │
//! │          ├── already grouped .......... AlreadyGrouped                 │
//! │          └── not empty ................ TableNotEmpty                  │
//! │    ▼                                                                    │
//! │  every member: table_group_id = group, empty = false                   │
//! │                                                                         │
//! │  dissolve()                                                             │
//! │    (active-order check happens in the service, against the store)      │
//! │    ▼                                                                    │
//! │  every member: table_group_id = None, empty unchanged                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Membership is fixed at creation. There is no add/remove of a single table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ids::{OrderTableId, TableGroupId};
use crate::table::OrderTable;
use crate::validation::{validate_group_size, validate_unique};

/// A grouping request: the candidate tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TableGroupRequest {
    pub order_table_ids: Vec<OrderTableId>,
}

impl TableGroupRequest {
    pub fn new(order_table_ids: Vec<OrderTableId>) -> Self {
        TableGroupRequest { order_table_ids }
    }

    /// Shape checks that need no lookup: size and duplicates.
    pub fn validate(&self) -> CoreResult<()> {
        validate_group_size(self.order_table_ids.len())?;
        validate_unique("order_table_id", &self.order_table_ids)?;
        Ok(())
    }
}

/// Tables grouped for joint billing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TableGroup {
    pub id: TableGroupId,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Tables currently referencing this group.
    pub order_tables: Vec<OrderTable>,
}

impl TableGroup {
    /// Forms a group from the tables resolved for `request`.
    ///
    /// `resolved` is whatever the store found for the requested ids, in any
    /// order. Members in the result follow the request order and are already
    /// joined (grouped and seated).
    pub fn form(
        id: TableGroupId,
        request: &TableGroupRequest,
        resolved: Vec<OrderTable>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        request.validate()?;

        let mut order_tables = Vec::with_capacity(request.order_table_ids.len());
        for table_id in &request.order_table_ids {
            let table = resolved
                .iter()
                .find(|table| table.id == *table_id)
                .ok_or(CoreError::TableNotFound(*table_id))?;

            table.ensure_groupable()?;
            order_tables.push(table.joined(id));
        }

        Ok(TableGroup {
            id,
            created_at: now,
            order_tables,
        })
    }

    pub fn order_table_ids(&self) -> Vec<OrderTableId> {
        self.order_tables.iter().map(|table| table.id).collect()
    }

    /// Returns the members with their group reference cleared.
    pub fn dissolve(&self) -> Vec<OrderTable> {
        self.order_tables.iter().map(OrderTable::released).collect()
    }
}
