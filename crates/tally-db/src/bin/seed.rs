//! # Seed Data Generator
//!
//! Populates the database with the grocery catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default development database
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db
//! ```
//!
//! Does nothing if the catalog already has items; delete the database file
//! to regenerate.

use clap::Parser;
use tally_db::seed::seed_catalog;
use tally_db::{Database, DbConfig};

/// Tally POS seed data generator
#[derive(Debug, Parser)]
#[command(name = "seed", about = "Populate the catalog with grocery items")]
struct Args {
    /// Database file path
    #[arg(short, long, default_value = "./tally_dev.db")]
    db: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {}", args.db);
    println!();

    let db = Database::new(DbConfig::file(&args.db)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let start = std::time::Instant::now();
    let inserted = seed_catalog(&db).await?;

    if inserted == 0 {
        println!("⚠ Catalog already has {} items", db.catalog().count().await?);
        println!("  Skipping seed to avoid duplicates.");
    } else {
        println!("✓ Seeded {} items in {:?}", inserted, start.elapsed());
        let categories = db.catalog().categories().await?;
        println!("  Categories: {}", categories.join(", "));
    }

    db.close().await;
    Ok(())
}
