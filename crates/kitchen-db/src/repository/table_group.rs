//! # Table Group Repository
//!
//! Group rows plus the membership writes on `order_tables`.
//!
//! ## Grouping Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    INSERT table_groups (id, created_at)                                │
//! │    for each member:                                                     │
//! │      UPDATE order_tables SET table_group_id = ?, empty = 0             │
//! │      WHERE id = ? AND empty = 1 AND table_group_id IS NULL             │
//! │      rows_affected = 0  →  Conflict, ROLLBACK                          │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ungrouping clears the back-references with a single UPDATE and keeps the
//! group row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::order_table::OrderTableRepository;
use kitchen_core::ports::{StoreResult, TableGroupStore};
use kitchen_core::{TableGroup, TableGroupId};

#[derive(Debug, FromRow)]
struct TableGroupRow {
    id: TableGroupId,
    created_at: DateTime<Utc>,
}

/// Repository for table group database operations.
#[derive(Debug, Clone)]
pub struct TableGroupRepository {
    pool: SqlitePool,
}

impl TableGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TableGroupRepository { pool }
    }

    /// The group with the tables currently referencing it.
    pub async fn get_by_id(&self, id: &TableGroupId) -> DbResult<Option<TableGroup>> {
        let row = sqlx::query_as::<_, TableGroupRow>(
            r#"
            SELECT id, created_at
            FROM table_groups
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let order_tables = OrderTableRepository::new(self.pool.clone())
            .list_by_group(&row.id)
            .await?;

        Ok(Some(TableGroup {
            id: row.id,
            created_at: row.created_at,
            order_tables,
        }))
    }

    /// Inserts the group and joins every member, all or nothing.
    pub async fn insert_with_members(&self, group: &TableGroup) -> DbResult<()> {
        debug!(id = %group.id, members = group.order_tables.len(), "Inserting table group");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO table_groups (id, created_at)
            VALUES (?1, ?2)
            "#,
        )
        .bind(group.id)
        .bind(group.created_at)
        .execute(&mut *tx)
        .await?;

        for member in &group.order_tables {
            let result = sqlx::query(
                r#"
                UPDATE order_tables SET
                    table_group_id = ?1,
                    empty = 0
                WHERE id = ?2 AND empty = 1 AND table_group_id IS NULL
                "#,
            )
            .bind(group.id)
            .bind(member.id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(group_id = %group.id, order_table_id = %member.id, "Member changed before grouping");
                return Err(DbError::conflict("OrderTable", member.id));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Clears `table_group_id` on every member. Returns how many were released.
    pub async fn release_members(&self, id: &TableGroupId) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE order_tables SET table_group_id = NULL
            WHERE table_group_id = ?1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        debug!(id = %id, released = result.rows_affected(), "Released table group members");
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TableGroupStore for TableGroupRepository {
    async fn find_by_id(&self, id: &TableGroupId) -> StoreResult<Option<TableGroup>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn insert_with_members(&self, group: &TableGroup) -> StoreResult<TableGroup> {
        TableGroupRepository::insert_with_members(self, group).await?;
        Ok(group.clone())
    }

    async fn release_members(&self, id: &TableGroupId) -> StoreResult<u64> {
        Ok(TableGroupRepository::release_members(self, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use kitchen_core::{OrderTable, TableGroupRequest};

    async fn seeded(db: &Database, empties: &[bool]) -> Vec<OrderTable> {
        let mut tables = Vec::new();
        for &empty in empties {
            let table = OrderTable::new(0, empty);
            db.order_tables().upsert(&table).await.unwrap();
            tables.push(table);
        }
        tables
    }

    fn group_of(tables: &[OrderTable]) -> TableGroup {
        let request = TableGroupRequest::new(tables.iter().map(|t| t.id).collect());
        TableGroup::form(TableGroupId::new(), &request, tables.to_vec(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = seeded(&db, &[true, true]).await;
        let group = group_of(&tables);

        db.table_groups().insert_with_members(&group).await.unwrap();

        let stored = db.table_groups().get_by_id(&group.id).await.unwrap().unwrap();
        assert_eq!(stored.order_tables.len(), 2);
        assert!(stored
            .order_tables
            .iter()
            .all(|t| t.table_group_id == Some(group.id) && !t.empty));
    }

    #[tokio::test]
    async fn test_insert_rolls_back_on_stale_member() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = seeded(&db, &[true, true]).await;
        let group = group_of(&tables);

        // Someone seats the second table after the group was formed.
        db.order_tables()
            .upsert(&tables[1].with_empty(false).unwrap())
            .await
            .unwrap();

        let err = db.table_groups().insert_with_members(&group).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        assert!(db.table_groups().get_by_id(&group.id).await.unwrap().is_none());
        let first = db.order_tables().get_by_id(&tables[0].id).await.unwrap().unwrap();
        assert!(first.empty && first.table_group_id.is_none());
    }

    #[tokio::test]
    async fn test_release_members() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tables = seeded(&db, &[true, true, true]).await;
        let group = group_of(&tables);
        db.table_groups().insert_with_members(&group).await.unwrap();

        assert_eq!(db.table_groups().release_members(&group.id).await.unwrap(), 3);
        assert_eq!(db.table_groups().release_members(&group.id).await.unwrap(), 0);

        let stored = db.table_groups().get_by_id(&group.id).await.unwrap().unwrap();
        assert!(stored.order_tables.is_empty());
        for table in db.order_tables().list().await.unwrap() {
            assert!(table.table_group_id.is_none());
            assert!(!table.empty);
        }
    }
}
