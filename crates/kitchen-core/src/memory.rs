//! In-memory implementation of every collaborator port.
//!
//! Stores everything behind one `RwLock`, so each call is atomic with respect
//! to the others. No persistence across restarts; meant for tests and demos.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::ids::{MenuId, OrderId, OrderTableId, TableGroupId};
use crate::menu::Menu;
use crate::order::{Order, OrderStatus};
use crate::ports::{
    MenuCatalog, OrderStore, OrderTableStore, StoreError, StoreResult, TableGroupStore,
};
use crate::table::OrderTable;
use crate::table_group::TableGroup;

#[derive(Debug, Default)]
struct State {
    menus: HashMap<MenuId, Menu>,
    /// Insertion order is listing order.
    tables: Vec<OrderTable>,
    orders: Vec<Order>,
    groups: HashMap<TableGroupId, DateTime<Utc>>,
}

impl State {
    fn table_mut(&mut self, id: &OrderTableId) -> Option<&mut OrderTable> {
        self.tables.iter_mut().find(|table| table.id == *id)
    }

    fn members_of(&self, group_id: &TableGroupId) -> Vec<OrderTable> {
        self.tables
            .iter()
            .filter(|table| table.table_group_id == Some(*group_id))
            .cloned()
            .collect()
    }
}

/// Shared in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a menu to the catalog. Seeding only; the services never write menus.
    pub async fn insert_menu(&self, menu: &Menu) -> StoreResult<Menu> {
        let mut state = self.state.write().await;
        if state.menus.contains_key(&menu.id) {
            return Err(StoreError::conflict("Menu", menu.id));
        }
        state.menus.insert(menu.id, menu.clone());
        Ok(menu.clone())
    }
}

#[async_trait]
impl MenuCatalog for MemoryStore {
    async fn count_existing_menus(&self, ids: &BTreeSet<MenuId>) -> StoreResult<u64> {
        let state = self.state.read().await;
        Ok(ids.iter().filter(|id| state.menus.contains_key(id)).count() as u64)
    }
}

#[async_trait]
impl OrderTableStore for MemoryStore {
    async fn find_by_id(&self, id: &OrderTableId) -> StoreResult<Option<OrderTable>> {
        let state = self.state.read().await;
        Ok(state.tables.iter().find(|table| table.id == *id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<OrderTable>> {
        Ok(self.state.read().await.tables.clone())
    }

    async fn find_all_by_ids(&self, ids: &[OrderTableId]) -> StoreResult<Vec<OrderTable>> {
        let state = self.state.read().await;
        Ok(state
            .tables
            .iter()
            .filter(|table| ids.contains(&table.id))
            .cloned()
            .collect())
    }

    async fn find_all_by_group_id(&self, group_id: &TableGroupId) -> StoreResult<Vec<OrderTable>> {
        Ok(self.state.read().await.members_of(group_id))
    }

    async fn save(&self, table: &OrderTable) -> StoreResult<OrderTable> {
        let mut state = self.state.write().await;
        match state.table_mut(&table.id) {
            Some(stored) => *stored = table.clone(),
            None => state.tables.push(table.clone()),
        }
        Ok(table.clone())
    }

    async fn update_empty(
        &self,
        id: &OrderTableId,
        empty: bool,
        blocking: &[OrderStatus],
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let blocked = state
            .orders
            .iter()
            .any(|order| order.order_table_id == *id && blocking.contains(&order.status));
        if blocked {
            return Ok(false);
        }
        match state.table_mut(id) {
            Some(table) if !table.is_grouped() => {
                table.empty = empty;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_number_of_guests(
        &self,
        id: &OrderTableId,
        number_of_guests: u32,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        match state.table_mut(id) {
            Some(table) if !table.empty => {
                table.number_of_guests = number_of_guests;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn find_by_id(&self, id: &OrderId) -> StoreResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|order| order.id == *id).cloned())
    }

    async fn find_all(&self) -> StoreResult<Vec<Order>> {
        Ok(self.state.read().await.orders.clone())
    }

    async fn exists_by_table_ids_and_statuses(
        &self,
        table_ids: &[OrderTableId],
        statuses: &[OrderStatus],
    ) -> StoreResult<bool> {
        let state = self.state.read().await;
        Ok(state.orders.iter().any(|order| {
            table_ids.contains(&order.order_table_id) && statuses.contains(&order.status)
        }))
    }

    async fn save(&self, order: &Order) -> StoreResult<Order> {
        let mut state = self.state.write().await;
        if state.orders.iter().any(|stored| stored.id == order.id) {
            return Err(StoreError::conflict("Order", order.id));
        }
        if !state.tables.iter().any(|table| table.id == order.order_table_id) {
            return Err(StoreError::missing("OrderTable", order.order_table_id));
        }
        state.orders.push(order.clone());
        Ok(order.clone())
    }

    async fn update_status(&self, order: &Order, expected: OrderStatus) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let stored = state
            .orders
            .iter_mut()
            .find(|stored| stored.id == order.id)
            .ok_or_else(|| StoreError::missing("Order", order.id))?;

        if stored.status != expected {
            return Ok(false);
        }
        stored.status = order.status;
        Ok(true)
    }
}

#[async_trait]
impl TableGroupStore for MemoryStore {
    async fn find_by_id(&self, id: &TableGroupId) -> StoreResult<Option<TableGroup>> {
        let state = self.state.read().await;
        Ok(state.groups.get(id).map(|created_at| TableGroup {
            id: *id,
            created_at: *created_at,
            order_tables: state.members_of(id),
        }))
    }

    async fn insert_with_members(&self, group: &TableGroup) -> StoreResult<TableGroup> {
        let mut state = self.state.write().await;
        if state.groups.contains_key(&group.id) {
            return Err(StoreError::conflict("TableGroup", group.id));
        }

        // Check every member before touching any of them.
        for member in &group.order_tables {
            let stored = state
                .tables
                .iter()
                .find(|table| table.id == member.id)
                .ok_or_else(|| StoreError::missing("OrderTable", member.id))?;
            if stored.is_grouped() || !stored.empty {
                return Err(StoreError::conflict("OrderTable", member.id));
            }
        }

        for member in &group.order_tables {
            if let Some(stored) = state.table_mut(&member.id) {
                *stored = member.clone();
            }
        }
        state.groups.insert(group.id, group.created_at);

        Ok(group.clone())
    }

    async fn release_members(&self, id: &TableGroupId) -> StoreResult<u64> {
        let mut state = self.state.write().await;
        let mut released = 0;
        for table in state.tables.iter_mut() {
            if table.table_group_id == Some(*id) {
                table.table_group_id = None;
                released += 1;
            }
        }
        Ok(released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderLineItemRequest, OrderRequest};

    #[tokio::test]
    async fn test_count_existing_menus() {
        let store = MemoryStore::new();
        let menu = Menu::new("Vongole Pasta", 13000, Utc::now()).unwrap();
        store.insert_menu(&menu).await.unwrap();

        let ids: BTreeSet<_> = [menu.id, MenuId::new()].into_iter().collect();
        assert_eq!(store.count_existing_menus(&ids).await.unwrap(), 1);

        assert!(matches!(
            store.insert_menu(&menu).await,
            Err(StoreError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_status_is_conditional() {
        let store = MemoryStore::new();
        let table = OrderTableStore::save(&store, &OrderTable::new(2, false))
            .await
            .unwrap();
        let request = OrderRequest::new(table.id, vec![OrderLineItemRequest::new(MenuId::new(), 1)]);
        let order = Order::place(OrderId::new(), &table, &request, Utc::now()).unwrap();
        OrderStore::save(&store, &order).await.unwrap();

        let meal = order.change_status(OrderStatus::Meal).unwrap();
        assert!(store.update_status(&meal, OrderStatus::Cooking).await.unwrap());
        // Second writer still believes the order is COOKING.
        let completed = order.change_status(OrderStatus::Completion).unwrap();
        assert!(!store.update_status(&completed, OrderStatus::Cooking).await.unwrap());

        let stored = OrderStore::find_by_id(&store, &order.id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Meal);
    }

    #[tokio::test]
    async fn test_insert_with_members_is_all_or_nothing() {
        let store = MemoryStore::new();
        let free = OrderTableStore::save(&store, &OrderTable::new(0, true)).await.unwrap();
        let taken = OrderTableStore::save(&store, &OrderTable::new(0, false)).await.unwrap();

        let group_id = TableGroupId::new();
        let group = TableGroup {
            id: group_id,
            created_at: Utc::now(),
            order_tables: vec![free.joined(group_id), taken.joined(group_id)],
        };

        assert!(matches!(
            store.insert_with_members(&group).await,
            Err(StoreError::Conflict { .. })
        ));

        let untouched = OrderTableStore::find_by_id(&store, &free.id).await.unwrap().unwrap();
        assert_eq!(untouched, free);
        assert!(TableGroupStore::find_by_id(&store, &group_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_empty_keeps_concurrent_grouping() {
        let store = MemoryStore::new();
        let a = OrderTableStore::save(&store, &OrderTable::new(0, true)).await.unwrap();
        let b = OrderTableStore::save(&store, &OrderTable::new(0, true)).await.unwrap();

        // Grouping commits after `a` was read as ungrouped.
        let group_id = TableGroupId::new();
        let group = TableGroup {
            id: group_id,
            created_at: Utc::now(),
            order_tables: vec![a.joined(group_id), b.joined(group_id)],
        };
        store.insert_with_members(&group).await.unwrap();

        assert!(!store.update_empty(&a.id, true, &OrderStatus::ACTIVE).await.unwrap());

        let stored = OrderTableStore::find_by_id(&store, &a.id).await.unwrap().unwrap();
        assert_eq!(stored.table_group_id, Some(group_id));
        assert!(!stored.empty);
        assert_eq!(store.find_all_by_group_id(&group_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_empty_blocked_by_active_order() {
        let store = MemoryStore::new();
        let table = OrderTableStore::save(&store, &OrderTable::new(2, false)).await.unwrap();
        let request = OrderRequest::new(table.id, vec![OrderLineItemRequest::new(MenuId::new(), 1)]);
        let order = Order::place(OrderId::new(), &table, &request, Utc::now()).unwrap();
        OrderStore::save(&store, &order).await.unwrap();

        assert!(!store.update_empty(&table.id, true, &OrderStatus::ACTIVE).await.unwrap());
        assert!(store.update_empty(&table.id, true, &[]).await.unwrap());
        assert!(!store.update_number_of_guests(&table.id, 4).await.unwrap());
    }
}
