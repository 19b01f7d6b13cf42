//! # Table Service
//!
//! Table creation, listing, occupancy and guest count.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{ActiveOrderScope, CoreError, CoreResult};
use crate::ids::OrderTableId;
use crate::order::OrderStatus;
use crate::ports::{OrderStore, OrderTableStore, StoreError};
use crate::table::OrderTable;
use crate::validation::validate_number_of_guests;

/// Manages standalone table state.
#[derive(Clone)]
pub struct TableService {
    tables: Arc<dyn OrderTableStore>,
    orders: Arc<dyn OrderStore>,
}

impl TableService {
    pub fn new(tables: Arc<dyn OrderTableStore>, orders: Arc<dyn OrderStore>) -> Self {
        TableService { tables, orders }
    }

    /// Creates an ungrouped table.
    pub async fn create(&self, number_of_guests: i64, empty: bool) -> CoreResult<OrderTable> {
        let number_of_guests = validate_number_of_guests(number_of_guests)?;
        let table = self.tables.save(&OrderTable::new(number_of_guests, empty)).await?;

        info!(order_table_id = %table.id, empty, "Order table created");
        Ok(table)
    }

    pub async fn list(&self) -> CoreResult<Vec<OrderTable>> {
        Ok(self.tables.find_all().await?)
    }

    /// Seats or releases a table.
    ///
    /// ## Fails With
    /// - `TableNotFound`
    /// - `AlreadyGrouped`: occupancy belongs to the group while grouped
    /// - `ActiveOrderExists`: a COOKING or MEAL order sits at the table
    pub async fn change_empty(&self, table_id: &OrderTableId, empty: bool) -> CoreResult<OrderTable> {
        let table = self.find(table_id).await?;
        let updated = table.with_empty(empty)?;

        if self
            .orders
            .exists_by_table_ids_and_statuses(&[*table_id], &OrderStatus::ACTIVE)
            .await?
        {
            warn!(order_table_id = %table_id, "Active order blocks occupancy change");
            return Err(CoreError::ActiveOrderExists(ActiveOrderScope::Table(*table_id)));
        }

        if !self
            .tables
            .update_empty(table_id, empty, &OrderStatus::ACTIVE)
            .await?
        {
            return Err(self.lost_occupancy_race(table_id).await);
        }

        info!(order_table_id = %table_id, empty, "Order table occupancy changed");
        Ok(updated)
    }

    /// Records how many guests sit at an occupied table.
    pub async fn change_number_of_guests(
        &self,
        table_id: &OrderTableId,
        number_of_guests: i64,
    ) -> CoreResult<OrderTable> {
        let number_of_guests = validate_number_of_guests(number_of_guests)?;
        let table = self.find(table_id).await?;
        let updated = table.with_number_of_guests(number_of_guests)?;

        if !self
            .tables
            .update_number_of_guests(table_id, number_of_guests)
            .await?
        {
            return Err(match self.tables.find_by_id(table_id).await {
                Ok(Some(table)) if table.empty => CoreError::EmptyTable(*table_id),
                Ok(Some(_)) => StoreError::conflict("OrderTable", table_id).into(),
                Ok(None) => CoreError::TableNotFound(*table_id),
                Err(err) => err.into(),
            });
        }

        info!(order_table_id = %table_id, number_of_guests, "Guest count changed");
        Ok(updated)
    }

    async fn find(&self, table_id: &OrderTableId) -> CoreResult<OrderTable> {
        self.tables
            .find_by_id(table_id)
            .await?
            .ok_or(CoreError::TableNotFound(*table_id))
    }

    /// Explains why a conditional occupancy write matched nothing.
    async fn lost_occupancy_race(&self, table_id: &OrderTableId) -> CoreError {
        match self.tables.find_by_id(table_id).await {
            Ok(Some(table)) if table.is_grouped() => return CoreError::AlreadyGrouped(*table_id),
            Ok(Some(_)) => {}
            Ok(None) => return CoreError::TableNotFound(*table_id),
            Err(err) => return err.into(),
        }

        match self
            .orders
            .exists_by_table_ids_and_statuses(&[*table_id], &OrderStatus::ACTIVE)
            .await
        {
            Ok(true) => CoreError::ActiveOrderExists(ActiveOrderScope::Table(*table_id)),
            Ok(false) => StoreError::conflict("OrderTable", table_id).into(),
            Err(err) => err.into(),
        }
    }
}
