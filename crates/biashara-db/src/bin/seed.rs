//! # Seed Data Generator
//!
//! Stocks a shop with products for local development.
//!
//! ## Usage
//! ```bash
//! # 60 products for owner 1 (default)
//! cargo run -p biashara-db --bin seed
//!
//! # Another owner, fewer products, custom file
//! cargo run -p biashara-db --bin seed -- --owner 2 --count 10 --db ./data/biashara.db
//! ```
//!
//! Every product gets opening stock (recorded as a PURCHASE movement) and a
//! low-stock threshold. A few start at or near their threshold so the
//! dashboard's alert list has something to show after a sale or two.

use std::env;

use biashara_db::{Database, DbConfig, NewProduct};

/// Categories and the goods a small Kenyan duka typically carries.
const CATALOG: &[(&str, &[(&str, i64)])] = &[
    (
        "Foodstuffs",
        &[
            ("Unga wa Ugali 2kg", 18_500),
            ("Rice Pishori 1kg", 22_000),
            ("Sugar 1kg", 16_000),
            ("Cooking Oil 1L", 35_000),
            ("Beans Rosecoco 1kg", 20_000),
            ("Salt 500g", 3_500),
            ("Tea Leaves 250g", 14_000),
            ("Wheat Flour 2kg", 19_500),
        ],
    ),
    (
        "Dairy & Bakery",
        &[
            ("Milk 500ml", 6_500),
            ("Bread 400g", 6_000),
            ("Eggs Tray", 45_000),
            ("Yoghurt 500ml", 11_000),
            ("Margarine 250g", 12_500),
        ],
    ),
    (
        "Household",
        &[
            ("Bar Soap", 12_000),
            ("Washing Powder 500g", 18_000),
            ("Matchbox", 500),
            ("Candles 6pc", 9_000),
            ("Toilet Paper 4pc", 22_000),
            ("Paraffin 1L", 17_000),
        ],
    ),
    (
        "Beverages",
        &[
            ("Soda 500ml", 6_000),
            ("Mineral Water 1L", 7_000),
            ("Juice 1L", 15_000),
            ("Drinking Chocolate 200g", 28_000),
        ],
    ),
    (
        "Airtime & Misc",
        &[
            ("Airtime Voucher 100", 10_000),
            ("Exercise Book", 5_000),
            ("Biro Pen", 2_000),
        ],
    ),
];

/// Pack-size variants; the second value is added to the base price.
const VARIANTS: &[(&str, i64)] = &[("", 0), ("(Bulk)", 5_000)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut owner_id: i64 = 1;
    let mut db_path = String::from("./biashara_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner_id = args[i + 1].parse().unwrap_or(1);
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
                println!("BiasharaTrack Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to create (default: 60)");
                println!("  -o, --owner <ID>   Owning user id (default: 1)");
                println!("  -d, --db <PATH>    Database file path (default: ./biashara_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 BiasharaTrack Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!("Owner:    {}", owner_id);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count(owner_id).await?;
    if existing > 0 {
        println!("⚠ Owner {} already has {} products", owner_id, existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    println!();
    println!("Creating products...");

    let start = std::time::Instant::now();
    let mut created = 0;

    'outer: for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
        for (category_idx, (category, goods)) in CATALOG.iter().enumerate() {
            for (item_idx, (name, price_cents)) in goods.iter().enumerate() {
                if created >= count {
                    break 'outer;
                }

                let seed = variant_idx * 1000 + category_idx * 100 + item_idx;
                let full_name = if variant.is_empty() {
                    name.to_string()
                } else {
                    format!("{} {}", name, variant)
                };

                let product = NewProduct::new(full_name, price_cents + price_addon)
                    .category(*category)
                    .barcode(format!("616{:09}", seed));

                // Every seventh product starts close to its threshold
                let threshold = 3 + (seed % 3) as i64;
                let quantity = if seed % 7 == 0 {
                    threshold + 1
                } else {
                    10 + ((seed * 13) % 90) as i64
                };

                if let Err(e) = db
                    .products()
                    .create_with_stock(owner_id, &product, quantity, threshold)
                    .await
                {
                    eprintln!("Failed to create {}: {}", product.name, e);
                    continue;
                }

                created += 1;
            }
        }
    }

    println!();
    println!("✓ Created {} products in {:?}", created, start.elapsed());

    let stocked = db.inventory().list(owner_id).await?;
    let low = stocked.iter().filter(|r| r.is_low_stock()).count();
    println!("  Inventory records: {}", stocked.len());
    println!("  Already low on stock: {}", low);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
