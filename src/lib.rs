//! babytalk - teachable reply bot
//!
//! Clients teach trigger/reply pairs and later ask with a message; the bot
//! answers with one of the replies taught for the best-matching trigger:
//! - exact message match first, then the first trigger contained in the input
//! - teach appends, edit replaces, remove drops a trigger or a single reply
//! - every mutation persists the full state under a single writer lock
//! - per-teacher contribution counts and derived stats
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use babytalk::brain::{Brain, MemoryStore, OneOrMany};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let brain = Brain::new(Arc::new(MemoryStore::new()));
//!     brain.teach("hello", OneOrMany::one("hi there"), Some("u1")).await?;
//!     println!("{}", brain.lookup("well hello"));
//!     Ok(())
//! }
//! ```

pub mod brain;
pub mod cli;
pub mod config;
pub mod server;

pub use brain::{Brain, BrainError, JsonFileStore, MemoryStore, Request, Response, StateStore};
pub use config::Config;
pub use server::{router, ServerState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
