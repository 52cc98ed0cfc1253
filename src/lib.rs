//! # Showroom
//!
//! Chat-driven product discovery for architecture and design catalogs.
//!
//! Showroom relays conversation turns to an LLM provider, detects when the
//! user's intent concerns the product catalog, retrieves matching entries
//! via hybrid (lexical + embedding-similarity) search, and returns a reply
//! annotated with the matched products.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌───────────────────────┐
//! │  Client  │──▶│ HTTP (axum)│──▶│ Chat pipeline          │
//! └──────────┘   └────────────┘   │ intent → search → LLM │
//!                                 └───────────┬───────────┘
//!                         ┌──────────────────┼──────────────────┐
//!                         ▼                  ▼                  ▼
//!                  ┌────────────┐    ┌──────────────┐   ┌─────────────┐
//!                  │  Lexical   │    │  Embedding   │   │  Response   │
//!                  │  matcher   │    │  cache       │   │  cache      │
//!                  └────────────┘    └──────────────┘   └─────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Typed error kinds |
//! | [`catalog`] | In-memory catalog store |
//! | [`similarity`] | Cosine similarity |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`cache`] | Embedding and response caches |
//! | [`lexical`] | Substring/keyword matching |
//! | [`search`] | Hybrid retrieval engine |
//! | [`intent`] | Product-intent classification |
//! | [`chat`] | Chat providers and turn orchestration |
//! | [`server`] | HTTP server |

pub mod cache;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod embedding;
pub mod error;
pub mod intent;
pub mod lexical;
pub mod models;
pub mod search;
pub mod server;
pub mod similarity;
