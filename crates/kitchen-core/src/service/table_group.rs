//! # Table Group Service
//!
//! Grouping and ungrouping. Grouping resolves the requested tables, lets
//! [`TableGroup::form`] check them, then writes the group and every member
//! through one conditional store call. Ungrouping refuses while any member
//! still has a COOKING or MEAL order.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{ActiveOrderScope, CoreError, CoreResult};
use crate::ids::TableGroupId;
use crate::order::OrderStatus;
use crate::ports::{OrderStore, OrderTableStore, TableGroupStore};
use crate::table::OrderTable;
use crate::table_group::{TableGroup, TableGroupRequest};

#[derive(Clone)]
pub struct TableGroupService {
    tables: Arc<dyn OrderTableStore>,
    orders: Arc<dyn OrderStore>,
    groups: Arc<dyn TableGroupStore>,
}

impl TableGroupService {
    pub fn new(
        tables: Arc<dyn OrderTableStore>,
        orders: Arc<dyn OrderStore>,
        groups: Arc<dyn TableGroupStore>,
    ) -> Self {
        TableGroupService {
            tables,
            orders,
            groups,
        }
    }

    /// Groups two or more empty, ungrouped tables.
    pub async fn create(&self, request: &TableGroupRequest) -> CoreResult<TableGroup> {
        request.validate()?;

        let resolved = self.tables.find_all_by_ids(&request.order_table_ids).await?;
        let group = TableGroup::form(TableGroupId::new(), request, resolved, Utc::now())?;
        let saved = self.groups.insert_with_members(&group).await?;

        info!(
            table_group_id = %saved.id,
            tables = saved.order_tables.len(),
            "Table group created"
        );
        Ok(saved)
    }

    /// The group with its current members.
    pub async fn find(&self, group_id: &TableGroupId) -> CoreResult<TableGroup> {
        self.groups
            .find_by_id(group_id)
            .await?
            .ok_or(CoreError::TableGroupNotFound(*group_id))
    }

    /// Dissolves the group and returns the released tables.
    ///
    /// Occupancy of the released tables is left as it was. Ungrouping a
    /// group that has already been dissolved releases nothing.
    pub async fn ungroup(&self, group_id: &TableGroupId) -> CoreResult<Vec<OrderTable>> {
        let group = self.find(group_id).await?;
        let group = TableGroup {
            order_tables: self.tables.find_all_by_group_id(group_id).await?,
            ..group
        };
        let member_ids = group.order_table_ids();

        if !member_ids.is_empty()
            && self
                .orders
                .exists_by_table_ids_and_statuses(&member_ids, &OrderStatus::ACTIVE)
                .await?
        {
            warn!(table_group_id = %group_id, "Active order blocks ungroup");
            return Err(CoreError::ActiveOrderExists(ActiveOrderScope::Group(*group_id)));
        }

        let released = self.groups.release_members(group_id).await?;
        info!(table_group_id = %group_id, released, "Table group dissolved");
        Ok(group.dissolve())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ids::{MenuId, OrderId, OrderTableId};
    use crate::memory::MemoryStore;
    use crate::order::{Order, OrderLineItemRequest, OrderRequest};

    fn service(store: &Arc<MemoryStore>) -> TableGroupService {
        TableGroupService::new(store.clone(), store.clone(), store.clone())
    }

    async fn tables(store: &MemoryStore, n: usize, empty: bool) -> Vec<OrderTable> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(
                OrderTableStore::save(store, &OrderTable::new(0, empty))
                    .await
                    .unwrap(),
            );
        }
        out
    }

    fn ids(tables: &[OrderTable]) -> Vec<OrderTableId> {
        tables.iter().map(|t| t.id).collect()
    }

    #[tokio::test]
    async fn test_create_group() {
        let store = Arc::new(MemoryStore::new());
        let members = tables(&store, 2, true).await;

        let group = service(&store)
            .create(&TableGroupRequest::new(ids(&members)))
            .await
            .unwrap();

        for id in ids(&members) {
            let stored = OrderTableStore::find_by_id(store.as_ref(), &id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(stored.table_group_id, Some(group.id));
            assert!(!stored.empty);
        }
    }

    #[tokio::test]
    async fn test_create_with_one_table_fails() {
        let store = Arc::new(MemoryStore::new());
        let members = tables(&store, 1, true).await;

        let err = service(&store)
            .create(&TableGroupRequest::new(ids(&members)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientTables { given: 1, .. }));
    }

    #[tokio::test]
    async fn test_create_with_unknown_table_fails() {
        let store = Arc::new(MemoryStore::new());
        let members = tables(&store, 1, true).await;
        let missing = OrderTableId::new();

        let err = service(&store)
            .create(&TableGroupRequest::new(vec![members[0].id, missing]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TableNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_create_with_occupied_table_fails() {
        let store = Arc::new(MemoryStore::new());
        let mut members = tables(&store, 1, true).await;
        members.extend(tables(&store, 1, false).await);

        let err = service(&store)
            .create(&TableGroupRequest::new(ids(&members)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TableNotEmpty(id) if id == members[1].id));

        let untouched = OrderTableStore::find_by_id(store.as_ref(), &members[0].id)
            .await
            .unwrap()
            .unwrap();
        assert!(untouched.empty && !untouched.is_grouped());
    }

    #[tokio::test]
    async fn test_create_with_grouped_table_fails() {
        let store = Arc::new(MemoryStore::new());
        let groups = service(&store);
        let first = tables(&store, 2, true).await;
        groups.create(&TableGroupRequest::new(ids(&first))).await.unwrap();

        let mut second = tables(&store, 1, true).await;
        second.push(first[0].clone());

        let err = groups
            .create(&TableGroupRequest::new(ids(&second)))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyGrouped(id) if id == first[0].id));
    }

    #[tokio::test]
    async fn test_create_with_duplicate_ids_fails() {
        let store = Arc::new(MemoryStore::new());
        let members = tables(&store, 1, true).await;

        let err = service(&store)
            .create(&TableGroupRequest::new(vec![members[0].id, members[0].id]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_ungroup() {
        let store = Arc::new(MemoryStore::new());
        let groups = service(&store);
        let members = tables(&store, 2, true).await;
        let group = groups.create(&TableGroupRequest::new(ids(&members))).await.unwrap();

        let released = groups.ungroup(&group.id).await.unwrap();
        assert_eq!(released.len(), 2);

        for id in ids(&members) {
            let stored = OrderTableStore::find_by_id(store.as_ref(), &id)
                .await
                .unwrap()
                .unwrap();
            assert!(stored.table_group_id.is_none());
            assert!(!stored.empty);
        }

        // Already dissolved: nothing left to release.
        assert!(groups.ungroup(&group.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ungroup_releases_current_members() {
        let store = Arc::new(MemoryStore::new());
        let groups = service(&store);
        let members = tables(&store, 3, true).await;
        let group = groups.create(&TableGroupRequest::new(ids(&members))).await.unwrap();
        assert!(store.update_number_of_guests(&members[2].id, 6).await.unwrap());

        let current = store.find_all_by_group_id(&group.id).await.unwrap();
        let released = groups.ungroup(&group.id).await.unwrap();

        assert_eq!(ids(&released), ids(&current));
        assert_eq!(released[2].number_of_guests, 6);
        assert!(released.iter().all(|t| t.table_group_id.is_none() && !t.empty));
    }

    #[tokio::test]
    async fn test_ungroup_unknown_group_fails() {
        let store = Arc::new(MemoryStore::new());
        let missing = TableGroupId::new();

        let err = service(&store).ungroup(&missing).await.unwrap_err();
        assert!(matches!(err, CoreError::TableGroupNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_ungroup_with_active_order_fails() {
        for status in OrderStatus::ACTIVE {
            let store = Arc::new(MemoryStore::new());
            let groups = service(&store);
            let members = tables(&store, 2, true).await;
            let group = groups.create(&TableGroupRequest::new(ids(&members))).await.unwrap();

            let request = OrderRequest::new(
                group.order_tables[1].id,
                vec![OrderLineItemRequest::new(MenuId::new(), 1)],
            );
            let order = Order::place(OrderId::new(), &group.order_tables[1], &request, Utc::now())
                .unwrap();
            OrderStore::save(store.as_ref(), &order).await.unwrap();
            let current = order.change_status(status).unwrap();
            store.update_status(&current, OrderStatus::Cooking).await.unwrap();

            let err = groups.ungroup(&group.id).await.unwrap_err();
            assert!(matches!(
                err,
                CoreError::ActiveOrderExists(ActiveOrderScope::Group(id)) if id == group.id
            ));
            assert_eq!(groups.find(&group.id).await.unwrap().order_tables.len(), 2);
        }
    }
}
