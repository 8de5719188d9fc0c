//! Handicrafts CLI - browse the catalog and manage a local cart.
//!
//! # Usage
//!
//! ```bash
//! # List products, cheapest first
//! hc-cli products list --sort price-low
//!
//! # Search within a category
//! hc-cli products list --query scarf --category Crochet
//!
//! # Show one product
//! hc-cli products show 2
//!
//! # Work with the cart (persisted in --data-dir)
//! hc-cli cart add 2 --quantity 3
//! hc-cli cart set 2 1
//! hc-cli cart show
//! hc-cli cart clear
//! ```
//!
//! # Commands
//!
//! - `products list` - Filter and sort the catalog
//! - `products show` - Product details
//! - `cart show|add|remove|set|clear` - Cart stored as JSON under the data directory

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use handicrafts_core::listing::{CategoryFilter, ListingQuery, SortKey};
use handicrafts_core::CartManager;
use handicrafts_storefront::FileStore;
use handicrafts_storefront::state::load_catalog;

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "hc-cli")]
#[command(author, version, about = "Handicrafts CLI tools")]
struct Cli {
    /// Product catalog JSON file
    #[arg(long, default_value = "crates/storefront/data/products.json")]
    catalog: PathBuf,

    /// Directory holding the persisted cart
    #[arg(long, default_value = ".handicrafts")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products matching a search
    List {
        /// Case-insensitive text to find in titles and descriptions
        #[arg(short, long, default_value = "")]
        query: String,

        /// Category name, or "All"
        #[arg(short, long, default_value = "All")]
        category: String,

        /// Sort order (`name`, `price-low`, `price-high`, `rating`)
        #[arg(short, long, default_value = "name")]
        sort: String,
    },
    /// Show a single product
    Show {
        /// Product id
        id: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and total
    Show,
    /// Add a product to the cart
    Add {
        /// Product id
        id: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        id: String,
    },
    /// Set a product's quantity (zero or less removes it)
    Set {
        /// Product id
        id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match run(cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let catalog = load_catalog(&cli.catalog)?;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                query,
                category,
                sort,
            } => {
                let query = ListingQuery {
                    query,
                    category: CategoryFilter::from(category),
                    sort: SortKey::from(sort.as_str()),
                };
                commands::products::list(&catalog, &query, out)?;
            }
            ProductsAction::Show { id } => commands::products::show(&catalog, &id, out)?,
        },
        Commands::Cart { action } => {
            let store = FileStore::open(&cli.data_dir)?;
            let mut cart = CartManager::hydrate(store);
            match action {
                CartAction::Show => {}
                CartAction::Add { id, quantity } => {
                    commands::cart::add(&mut cart, &catalog, &id, quantity)?;
                }
                CartAction::Remove { id } => commands::cart::remove(&mut cart, &id)?,
                CartAction::Set { id, quantity } => {
                    commands::cart::set_quantity(&mut cart, &id, quantity)?;
                }
                CartAction::Clear => cart.clear(),
            }
            commands::cart::show(cart.cart(), out)?;
        }
    }
    Ok(())
}
