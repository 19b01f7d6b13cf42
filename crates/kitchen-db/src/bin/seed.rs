//! # Seed Data Generator
//!
//! Populates the database with a menu catalog and empty tables for
//! development.
//!
//! ## Usage
//! ```bash
//! # Default: 8 tables, database from KITCHEN_DB_PATH or ./kitchen_dev.db
//! cargo run -p kitchen-db --bin seed
//!
//! # Custom table count
//! cargo run -p kitchen-db --bin seed -- --tables 12
//!
//! # Specify database path
//! cargo run -p kitchen-db --bin seed -- --db ./data/kitchen.db
//! ```

use chrono::Utc;
use std::env;
use tracing::{info, warn};

use kitchen_core::Menu;
use kitchen_db::{init_tracing, Database, KitchenConfig};

/// Menu catalog: (name, price in cents)
const MENUS: &[(&str, i64)] = &[
    ("Fried Chicken", 16000),
    ("Seasoned Chicken", 17000),
    ("Half Fried Half Seasoned", 17000),
    ("Soy Garlic Chicken", 18000),
    ("Green Onion Chicken", 18000),
    ("Boneless Fried Chicken", 17500),
    ("Chicken Salad", 9000),
    ("French Fries", 5000),
    ("Coke", 2000),
    ("Draft Beer", 4500),
];

const DEFAULT_TABLES: usize = 8;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = KitchenConfig::load()?;
    let mut tables = DEFAULT_TABLES;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" | "-t" => {
                if i + 1 < args.len() {
                    tables = args[i + 1].parse().unwrap_or(DEFAULT_TABLES);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.db_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kitchen POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -t, --tables <N>   Number of empty tables to create (default: {DEFAULT_TABLES})");
                println!("  -d, --db <PATH>    Database file path (default: KITCHEN_DB_PATH or ./kitchen_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing(&config.log_filter);

    info!(path = %config.db_path.display(), tables, "Seeding database");

    let db = Database::new(config.db_config()).await?;

    let existing = db.menus().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has menus; skipping seed");
        println!("Database already has {existing} menus. Delete the file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    for (name, price_cents) in MENUS {
        let menu = Menu::new(*name, *price_cents, now)?;
        db.menus().insert(&menu).await?;
    }

    let services = db.services();
    for _ in 0..tables {
        services.tables.create(0, true).await?;
    }

    info!(menus = MENUS.len(), tables, "Seed complete");
    println!("✓ Seeded {} menus and {} tables", MENUS.len(), tables);

    db.close().await;
    Ok(())
}
