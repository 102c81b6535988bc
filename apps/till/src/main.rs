//! # Tally Till Entry Point
//!
//! A line-oriented terminal till over the command layer.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Initialize logging (stderr, RUST_LOG or default filter)             │
//! │  2. AppConfig::from_env(), then CLI flags on top                        │
//! │  3. Open database (file with WAL, or in-memory), run migrations         │
//! │  4. Optionally seed the grocery catalog                                 │
//! │  5. One Session over the SQLite record store                            │
//! │  6. Read commands from stdin until `quit` or EOF                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use tally_checkout::{CheckoutCommitter, RecordStore};
use tally_core::catalog::ALL_CATEGORIES;
use tally_db::seed::seed_catalog;
use tally_db::{Database, DbConfig};
use tally_till::commands::{self, CartResponse, CatalogItemDto, ReceiptResponse};
use tally_till::{database_path, init_tracing, ApiError, AppConfig, Session};

/// Tally POS terminal till
#[derive(Debug, Parser)]
#[command(name = "tally-till", version, about)]
struct Args {
    /// Database file (overrides TALLY_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Use a throwaway in-memory database
    #[arg(long, conflicts_with = "db")]
    in_memory: bool,

    /// Populate the catalog with grocery items if it is empty
    #[arg(long)]
    seed: bool,
}

const HELP: &str = "\
Commands:
  cats                     list category tabs
  list [category]          list items (default: All)
  search <text>            search item names in All
  add <item-id>            add one unit to the cart
  qty <item-id> <n>        set quantity (below 1 becomes 1)
  inc <item-id>            quantity + 1
  dec <item-id>            quantity - 1 (never below 1)
  rm <item-id>             remove the line
  cart                     show the cart
  clear                    empty the cart
  pay                      check out and print the receipt
  reprint <bill-number>    print an earlier receipt
  help                     this text
  quit                     exit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(db) = args.db {
        config.db_path = Some(db);
    }

    let db_config = if args.in_memory {
        DbConfig::in_memory()
    } else {
        DbConfig::file(database_path(&config)?)
    };
    let db = Database::new(db_config).await?;
    info!("Database connected and migrations applied");

    if args.seed {
        let inserted = seed_catalog(&db).await?;
        info!(inserted, "Seed finished");
    }

    let store: Arc<dyn RecordStore> = Arc::new(db.record_store());
    let committer = CheckoutCommitter::new(store).with_config(config.checkout_config());
    let mut session = Session::new(committer);

    println!("{} - type `help` for commands", config.store_name);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, rest)) = words.split_first() else {
            continue;
        };

        let outcome = match (command, rest) {
            ("quit" | "exit", _) => break,
            ("help", _) => {
                println!("{}", HELP);
                Ok(())
            }
            ("cats", _) => commands::list_categories(&db)
                .await
                .map(|cats| println!("{}", cats.join(" | "))),
            ("list", _) => {
                let category = if rest.is_empty() { ALL_CATEGORIES.to_string() } else { rest.join(" ") };
                commands::list_catalog(&db, "", &category)
                    .await
                    .map(|items| print_items(&config, &items))
            }
            ("search", _) => commands::list_catalog(&db, &rest.join(" "), ALL_CATEGORIES)
                .await
                .map(|items| print_items(&config, &items)),
            ("add", [id]) => commands::add_to_cart(&db, &mut session, id)
                .await
                .map(|cart| print_cart(&config, &cart)),
            ("qty", [id, n]) => match n.parse::<i64>() {
                Ok(n) => commands::update_cart_item(&mut session, id, n).map(|cart| print_cart(&config, &cart)),
                Err(_) => Err(ApiError::validation(format!("Not a number: {}", n))),
            },
            ("inc", [id]) => commands::increment_cart_item(&mut session, id).map(|cart| print_cart(&config, &cart)),
            ("dec", [id]) => commands::decrement_cart_item(&mut session, id).map(|cart| print_cart(&config, &cart)),
            ("rm", [id]) => {
                print_cart(&config, &commands::remove_from_cart(&mut session, id));
                Ok(())
            }
            ("cart", _) => {
                print_cart(&config, &commands::get_cart(&session));
                Ok(())
            }
            ("clear", _) => {
                print_cart(&config, &commands::clear_cart(&mut session));
                Ok(())
            }
            ("pay", _) => commands::checkout(&mut session, &config)
                .await
                .map(|receipt| print_receipt(&config, &receipt)),
            ("reprint", [number]) => commands::reprint_receipt(&db, &config, number)
                .await
                .map(|receipt| print_receipt(&config, &receipt)),
            _ => Err(ApiError::validation(format!("Unknown command: {} (try `help`)", line.trim()))),
        };

        if let Err(err) = outcome {
            let hint = if err.retriable { " (you can try again)" } else { "" };
            println!("! {}{}", err.message, hint);
        }
    }

    db.close().await;
    Ok(())
}

fn print_items(config: &AppConfig, items: &[CatalogItemDto]) {
    for item in items {
        if item.discount_percentage > 0.0 {
            println!(
                "  {:<20} {:<28} {:>10} {:>10}  {}% OFF",
                item.id,
                item.name,
                config.format_currency(item.base_price_cents),
                config.format_currency(item.effective_price_cents),
                item.discount_percentage
            );
        } else {
            println!(
                "  {:<20} {:<28} {:>10} {:>10}",
                item.id,
                item.name,
                "",
                config.format_currency(item.effective_price_cents)
            );
        }
    }
}

fn print_cart(config: &AppConfig, cart: &CartResponse) {
    if cart.lines.is_empty() {
        println!("  (cart is empty)");
        return;
    }

    for line in &cart.lines {
        println!(
            "  {:<28} {:>3} x {:>10} = {:>10}  (saved {})",
            line.name,
            line.quantity,
            config.format_currency(line.effective_unit_price_cents),
            config.format_currency(line.subtotal_cents),
            config.format_currency(line.discount_applied_cents)
        );
    }
    println!(
        "  {} items | discount {} | TOTAL {}",
        cart.totals.total_item_count,
        config.format_currency(cart.totals.total_discount_cents),
        config.format_currency(cart.totals.total_amount_cents)
    );
}

fn print_receipt(config: &AppConfig, receipt: &ReceiptResponse) {
    println!("========================================");
    println!("{:^40}", receipt.store_name);
    println!("Bill: {}", receipt.bill_number);
    println!("Date: {}", receipt.timestamp);
    println!("----------------------------------------");
    for line in &receipt.lines {
        println!("{}", line.name);
        println!(
            "  {} x {:<12} {:>20}",
            line.quantity,
            config.format_currency(line.effective_unit_price_cents),
            config.format_currency(line.subtotal_cents)
        );
        if line.discount_applied_cents > 0 {
            println!("  discount {:>29}", config.format_currency(line.discount_applied_cents));
        }
    }
    println!("----------------------------------------");
    println!("Subtotal {:>31}", config.format_currency(receipt.subtotal_before_discount));
    println!("Discount {:>31}", config.format_currency(receipt.total_discount));
    println!("TOTAL    {:>31}", config.format_currency(receipt.total_amount));
    println!("========================================");
}
