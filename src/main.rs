//! # Showroom CLI
//!
//! The `showroom` binary serves the chat and product-search API and offers
//! terminal equivalents of the search endpoints for quick inspection.
//!
//! ## Usage
//!
//! ```bash
//! showroom --config ./config/showroom.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `showroom serve` | Start the HTTP server |
//! | `showroom search "<query>"` | Run a hybrid search from the terminal |
//! | `showroom get <id>` | Print one catalog item as JSON |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use showroom::cache::EmbeddingCache;
use showroom::catalog::CatalogStore;
use showroom::config::load_config;
use showroom::embedding;
use showroom::search::RetrievalEngine;
use showroom::server::run_server;

/// Showroom — chat-driven product discovery for architecture and design
/// catalogs.
#[derive(Parser)]
#[command(
    name = "showroom",
    about = "Chat-driven product discovery for architecture and design catalogs",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/showroom.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    ///
    /// Loads the catalog, initializes the embedding and chat providers,
    /// and serves the chat, search, and moodboard endpoints.
    Serve,

    /// Search the catalog from the terminal.
    ///
    /// Runs the same hybrid (lexical + semantic) engine the server uses
    /// and prints the ranked results.
    Search {
        /// Free-text query.
        query: String,

        /// Maximum number of results.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print one catalog item as JSON.
    Get {
        /// Catalog item id.
        id: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => run_server(&config).await,
        Commands::Search { query, limit } => run_search(&config, &query, limit).await,
        Commands::Get { id } => run_get(&config, id),
    }
}

async fn run_search(
    config: &showroom::config::Config,
    query: &str,
    limit: Option<usize>,
) -> Result<()> {
    let catalog = Arc::new(CatalogStore::load(&config.catalog.path));
    let provider: Arc<dyn embedding::EmbeddingProvider> =
        embedding::create_provider(&config.embedding)?.into();

    let engine = RetrievalEngine::new(
        catalog,
        Arc::new(EmbeddingCache::new()),
        provider,
        config,
    );

    let mut results = engine.search(query).await;
    if let Some(limit) = limit {
        results.truncate(limit);
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, item) in results.iter().enumerate() {
        println!("{}. {} / {}", i + 1, item.name, item.manufacturer);
        println!("    category: {}", item.category);
        if !item.materials.is_empty() {
            println!("    materials: {}", item.materials);
        }
        if !item.tags.is_empty() {
            println!("    tags: {}", item.tags.join(", "));
        }
        println!("    id: {}", item.id);
        println!();
    }

    Ok(())
}

fn run_get(config: &showroom::config::Config, id: u32) -> Result<()> {
    let catalog = CatalogStore::load(&config.catalog.path);
    match catalog.get(id) {
        Some(item) => {
            println!("{}", serde_json::to_string_pretty(item)?);
            Ok(())
        }
        None => anyhow::bail!("product {} not found", id),
    }
}
