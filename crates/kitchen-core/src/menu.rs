//! # Menu
//!
//! Catalog entry referenced by order line items. Orders only ever ask the
//! catalog whether menus exist; the rest of the catalog is seeded data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::ids::MenuId;
use crate::validation::{validate_menu_name, validate_price_cents};

/// A sellable menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Menu {
    pub id: MenuId,

    /// Display name.
    pub name: String,

    /// Price in cents (smallest currency unit).
    pub price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Menu {
    /// Creates a validated menu with a fresh id.
    pub fn new(name: impl Into<String>, price_cents: i64, now: DateTime<Utc>) -> CoreResult<Self> {
        let name = name.into();
        validate_menu_name(&name)?;
        validate_price_cents(price_cents)?;

        Ok(Menu {
            id: MenuId::new(),
            name: name.trim().to_string(),
            price_cents,
            created_at: now,
        })
    }
}
