//! Greenhouse CLI - browse the plant catalog and manage a cart and wishlist.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! greenhouse plants list --search fern --category Indoor --in-stock
//!
//! # Add a plant to the cart
//! greenhouse cart add 64f1c0ffee --quantity 2
//!
//! # Toggle a plant on the wishlist
//! greenhouse wishlist toggle 64f1c0ffee
//! ```
//!
//! # Environment Variables
//!
//! See `greenhouse_storefront::config` for backend settings. `SENTRY_DSN`
//! enables error reporting. `RUST_LOG` overrides the log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use greenhouse_core::{CareLevel, LightRequirement};
use greenhouse_storefront::{Session, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "greenhouse")]
#[command(author, version, about = "Greenhouse plant shop")]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and manage the plant catalog
    Plants {
        #[command(subcommand)]
        action: PlantsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Print the local user id
    Whoami,
}

#[derive(Subcommand)]
enum PlantsAction {
    /// List plants, filtered locally
    List {
        /// Substring of the common or scientific name
        #[arg(short, long)]
        search: Option<String>,

        /// Only plants in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Hide plants that are out of stock
        #[arg(long)]
        in_stock: bool,
    },
    /// Show one plant
    Show { id: String },
    /// List category labels
    Categories,
    /// Add a plant to the catalog
    Add(AddPlantArgs),
    /// Delete a plant from the catalog
    Delete { id: String },
}

#[derive(clap::Args)]
struct AddPlantArgs {
    #[arg(short, long)]
    name: String,

    /// Price, e.g. 199 or 249.50
    #[arg(short, long)]
    price: String,

    /// Category label; repeat for several
    #[arg(short, long = "category", required = true)]
    categories: Vec<String>,

    #[arg(long)]
    scientific_name: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    /// Care level (Easy, Medium, Hard)
    #[arg(long, default_value = "Medium")]
    care: CareLevel,

    /// Light requirement (Low, Medium, High)
    #[arg(long, default_value = "Medium")]
    light: LightRequirement,

    /// Create the plant as unavailable
    #[arg(long)]
    out_of_stock: bool,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and order summary
    Show,
    /// Add a plant to the cart
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity; zero or less removes it
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { id: String },
    /// Empty the cart
    Clear,
    /// Proceed to checkout
    Checkout,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show wishlisted plants
    Show,
    /// Add a plant
    Add { id: String },
    /// Remove a plant
    Remove { id: String },
    /// Add the plant if absent, remove it if present
    Toggle { id: String },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN")
        .ok()
        .filter(|dsn| !dsn.trim().is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "greenhouse_storefront=info,greenhouse=info".into());

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configuration first: it loads `.env`, which may carry SENTRY_DSN.
    let config = StorefrontConfig::from_env();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry();
    init_tracing(cli.json_logs);

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    // Returning (rather than exiting) drops the Sentry guard, which flushes
    // queued events.
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if greenhouse_storefront::error::is_reportable(e.as_ref()) {
                tracing::error!("Command failed: {e}");
            } else {
                tracing::warn!("Command failed: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new(config)?;
    let output = commands::Output::new(cli.json, session.notifications().subscribe());

    let result = match cli.command {
        Commands::Plants { action } => match action {
            PlantsAction::List {
                search,
                category,
                in_stock,
            } => commands::plants::list(&session, &output, search, category, in_stock).await,
            PlantsAction::Show { id } => commands::plants::show(&session, &output, &id).await,
            PlantsAction::Categories => commands::plants::categories(&session, &output).await,
            PlantsAction::Add(args) => {
                let mut form = greenhouse_storefront::forms::AddPlantForm::new();
                form.open();
                form.name = args.name;
                form.price = args.price;
                for category in &args.categories {
                    form.add_category(category);
                }
                form.scientific_name = args.scientific_name.unwrap_or_default();
                form.description = args.description.unwrap_or_default();
                form.image = args.image.unwrap_or_default();
                form.care_level = args.care;
                form.light_requirement = args.light;
                form.stock = !args.out_of_stock;
                commands::plants::add(&session, &output, form).await
            }
            PlantsAction::Delete { id } => commands::plants::delete(&session, &output, &id).await,
        },
        Commands::Cart { action } => {
            session.start().await;
            match action {
                CartAction::Show => commands::cart::show(&session, &output),
                CartAction::Add { id, quantity } => {
                    commands::cart::add(&session, &output, &id, quantity).await
                }
                CartAction::Set { id, quantity } => {
                    commands::cart::set(&session, &output, &id, quantity).await
                }
                CartAction::Remove { id } => commands::cart::remove(&session, &output, &id).await,
                CartAction::Clear => commands::cart::clear(&session, &output).await,
                CartAction::Checkout => commands::cart::checkout(&session, &output),
            }
        }
        Commands::Wishlist { action } => {
            session.start().await;
            match action {
                WishlistAction::Show => commands::wishlist::show(&session, &output).await,
                WishlistAction::Add { id } => commands::wishlist::add(&session, &output, &id).await,
                WishlistAction::Remove { id } => {
                    commands::wishlist::remove(&session, &output, &id).await
                }
                WishlistAction::Toggle { id } => {
                    commands::wishlist::toggle(&session, &output, &id).await
                }
            }
        }
        Commands::Whoami => {
            output.line(session.user_id().as_str());
            Ok(())
        }
    };

    // Let confirmatory refetches land so the printed state is final.
    session.shutdown().await;
    output.flush_notices();

    result
}
