//! Cartwheel CLI - inspect and edit a storefront cart, browse categories,
//! and try search suggestions against a live backend.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart with totals
//! cartwheel cart show
//!
//! # Add two units to one line, remove one from another, then save
//! cartwheel cart adjust --inc 64f0c1 --inc 64f0c1 --dec 64f0c2
//!
//! # Preview the same edits without saving
//! cartwheel cart adjust --inc 64f0c1 --dry-run
//!
//! # Browse pages 1, 2, then 1 again (served from cache)
//! cartwheel category 65a1 --page 1 --page 2 --page 1 --sort price-asc
//!
//! # Fetch search suggestions
//! cartwheel suggest "green tea"
//! ```
//!
//! # Environment Variables
//!
//! See `cartwheel_client::config`. `RUST_LOG` controls log verbosity and
//! `CARTWHEEL_LOG_JSON=1` switches logs to JSON. Logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cartwheel_core::SortMode;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "cartwheel")]
#[command(author, version, about = "Cartwheel storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Browse a category listing
    Category {
        /// Category ID
        id: String,

        /// Page to load; repeat to load several in order
        #[arg(short, long = "page", default_value = "1")]
        pages: Vec<u32>,

        /// Sort order (`newest`, `price-asc`, `price-desc`)
        #[arg(short, long, default_value = "newest")]
        sort: SortMode,
    },
    /// Fetch search suggestions for a query
    Suggest {
        /// Partial search query
        query: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Change line quantities and save
    Adjust {
        /// Cart line to increment; repeat for more units
        #[arg(long = "inc")]
        increments: Vec<String>,

        /// Cart line to decrement; repeat for more units
        #[arg(long = "dec")]
        decrements: Vec<String>,

        /// Show the pending result without saving
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove a cart line
    Remove {
        /// Cart line ID
        id: String,
    },
    /// Remove every line from the cart
    Clear,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwheel_client=info,cartwheel_cli=info".into());

    let json = std::env::var("CARTWHEEL_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = commands::connect()?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&mut store).await?,
            CartAction::Adjust {
                increments,
                decrements,
                dry_run,
            } => commands::cart::adjust(&mut store, &increments, &decrements, dry_run).await?,
            CartAction::Remove { id } => commands::cart::remove(&mut store, &id).await?,
            CartAction::Clear => commands::cart::clear(&mut store).await?,
        },
        Commands::Category { id, pages, sort } => {
            commands::catalog::browse(&mut store, &id, &pages, sort).await?;
        }
        Commands::Suggest { query } => commands::search::suggest(&mut store, &query).await?,
    }
    Ok(())
}
