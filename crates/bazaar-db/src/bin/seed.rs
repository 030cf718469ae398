//! # Seed Data Generator
//!
//! Populates the database with development data: warehouses, items with
//! opening stock, customers, suppliers and workers.
//!
//! ## Usage
//! ```bash
//! # Default database path, 200 items
//! cargo run -p bazaar-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p bazaar-db --bin seed -- --count 500 --db ./data/bazaar.db
//! ```

use std::env;

use chrono::Utc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use bazaar_core::movement::StockLedger;
use bazaar_core::{Customer, Item, Supplier, Warehouse, Worker};
use bazaar_db::{Database, DbConfig};

/// Item name stems combined with brands below.
const ITEM_NAMES: &[&str] = &[
    "Cola 1.5L",
    "Cola 300ml",
    "Lemon Soda 1.5L",
    "Mineral Water 500ml",
    "Washing Soap",
    "Detergent 1kg",
    "Cooking Oil 5L",
    "Ghee 1kg",
    "Tea 475g",
    "Tea 950g",
    "Sugar 1kg",
    "Rice Basmati 5kg",
    "Flour 10kg",
    "Biscuits Family Pack",
    "Chips Large",
    "Shampoo 400ml",
    "Toothpaste 140g",
    "Milk Powder 900g",
    "Noodles Multipack",
    "Salt 800g",
];

const BRANDS: &[&str] = &["Sufi", "Tapal", "National", "Shan", "Kolson", "Rio", "Dalda"];

const CITIES: &[&str] = &["Lahore", "Karachi", "Faisalabad", "Multan", "Gujranwala"];

const WAREHOUSES: &[&str] = &["Main Store", "Godown A", "Godown B"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./bazaar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Bazaar POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    // Warehouses
    let mut warehouse_ids = Vec::new();
    for name in WAREHOUSES {
        let warehouse = Warehouse {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            address: None,
            is_active: true,
            created_at: now,
        };
        db.warehouses().insert(&warehouse).await?;
        warehouse_ids.push(warehouse.id);
    }
    println!("✓ {} warehouses", warehouse_ids.len());

    // Items with opening stock spread over the warehouses
    let ledger = db.stock();
    let mut generated = 0;
    'outer: for (brand_idx, brand) in BRANDS.iter().enumerate() {
        for (name_idx, name) in ITEM_NAMES.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let seed = brand_idx * ITEM_NAMES.len() + name_idx;
            let purchase = 2_000 + ((seed * 137) % 20_000) as i64;
            let margin = 10 + (seed % 25) as i64; // 10-34 percent
            let item = Item {
                id: Uuid::new_v4().to_string(),
                name: format!("{} {}", brand, name),
                brand: Some(brand.to_string()),
                purchase_price_cents: purchase,
                retail_price_cents: purchase + purchase * margin / 100,
                min_stock_level: 10,
                max_stock_level: 400,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            db.items().insert(&item).await?;

            let opening = (seed % 60) as i64;
            if opening > 0 {
                let warehouse = &warehouse_ids[seed % warehouse_ids.len()];
                ledger.adjust(&item.id, warehouse, opening).await?;
            }

            generated += 1;
            if generated % 50 == 0 {
                println!("  Generated {} items...", generated);
            }
        }
    }
    println!("✓ {} items with opening stock", generated);

    // Parties
    for i in 0..12 {
        db.parties()
            .insert_customer(&Customer {
                id: Uuid::new_v4().to_string(),
                name: format!("Customer {:02}", i + 1),
                phone: Some(format!("03{:09}", 100_000_000 + i * 7_919)),
                city: Some(CITIES[i % CITIES.len()].to_string()),
                balance_cents: 0,
                created_at: now,
            })
            .await?;
    }
    for i in 0..6 {
        db.parties()
            .insert_supplier(&Supplier {
                id: Uuid::new_v4().to_string(),
                name: format!("Supplier {:02}", i + 1),
                phone: Some(format!("04{:09}", 200_000_000 + i * 6_133)),
                city: Some(CITIES[i % CITIES.len()].to_string()),
                balance_cents: 0,
                created_at: now,
            })
            .await?;
    }
    println!("✓ 12 customers, 6 suppliers");

    for name in ["Asif", "Bilal", "Danish"] {
        db.workers()
            .insert(&Worker {
                id: Uuid::new_v4().to_string(),
                name: name.to_string(),
                phone: None,
                created_at: now,
            })
            .await?;
    }
    println!("✓ 3 workers");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
