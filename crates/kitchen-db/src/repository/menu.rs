//! # Menu Repository
//!
//! Menu catalog rows. The order flow only asks how many of a set of menu ids
//! exist; inserts and listing serve seeding.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kitchen_core::ports::{MenuCatalog, StoreResult};
use kitchen_core::{Menu, MenuId};

/// Repository for menu database operations.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    pub async fn insert(&self, menu: &Menu) -> DbResult<()> {
        debug!(id = %menu.id, name = %menu.name, "Inserting menu");

        sqlx::query(
            r#"
            INSERT INTO menus (id, name, price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(menu.price_cents)
        .bind(menu.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list(&self) -> DbResult<Vec<Menu>> {
        let menus = sqlx::query_as::<_, Menu>(
            r#"
            SELECT id, name, price_cents, created_at
            FROM menus
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(menus)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Counts how many of `ids` have a menu row.
    pub async fn count_existing(&self, ids: &BTreeSet<MenuId>) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM menus WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let count: i64 = query.build_query_scalar().fetch_one(&self.pool).await?;
        debug!(requested = ids.len(), found = count, "Counted existing menus");

        Ok(count as u64)
    }
}

#[async_trait]
impl MenuCatalog for MenuRepository {
    async fn count_existing_menus(&self, ids: &BTreeSet<MenuId>) -> StoreResult<u64> {
        Ok(self.count_existing(ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let menus = db.menus();

        let menu = Menu::new("Fried Chicken", 16000, Utc::now()).unwrap();
        menus.insert(&menu).await.unwrap();

        let listed = menus.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, menu.id);
        assert_eq!(listed[0].name, "Fried Chicken");
        assert_eq!(menus.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_existing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let menus = db.menus();

        let a = Menu::new("Fried Chicken", 16000, Utc::now()).unwrap();
        let b = Menu::new("Seasoned Chicken", 17000, Utc::now()).unwrap();
        menus.insert(&a).await.unwrap();
        menus.insert(&b).await.unwrap();

        let ids: BTreeSet<_> = [a.id, b.id, MenuId::new()].into_iter().collect();
        assert_eq!(menus.count_existing(&ids).await.unwrap(), 2);
        assert_eq!(menus.count_existing(&BTreeSet::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_insert_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let menus = db.menus();
        let menu = Menu::new("Fried Chicken", 16000, Utc::now()).unwrap();

        menus.insert(&menu).await.unwrap();
        assert!(menus.insert(&menu).await.is_err());
    }
}
