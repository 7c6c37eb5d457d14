//! # Socratic Dialogue
//!
//! A conversational assistant that questions instead of answering. Each user
//! message goes to a remote language model through the completion gateway;
//! replies are revealed with a typewriter effect and the conversation is drawn
//! as a branching graph of topics.
//!
//! ## Architecture
//!
//! ```text
//! terminal (socratic chat) ──► Dialogue ──► ChatGateway ──► socratic serve ──► upstream model
//!                                │                        (or direct upstream)
//!                                ├─► SessionState ─► TopologyModel ─► GraphCanvas
//!                                └─► Typewriter (reveal)     export_session ◄─┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use socratic_dialogue::{Config, server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     server::serve(config).await?;
//!     Ok(())
//! }
//! ```

/// Terminal client and subcommands.
pub mod cli;
/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// HTML export of a session.
pub mod export;
/// Completion gateway client, wire types and trait.
pub mod gateway;
/// Topic graph layout, rendering and hit-testing.
pub mod graph;
/// System prompt and fixed user-facing texts.
pub mod prompts;
/// Typewriter reveal of assistant replies.
pub mod reveal;
/// HTTP server for the completion gateway.
pub mod server;
/// Session state and the turn driver.
pub mod session;
/// Topic node model.
pub mod topology;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, SharedState};
pub use session::{Dialogue, SessionState};
