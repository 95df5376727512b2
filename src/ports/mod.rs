//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires from
//! the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `MarketClient`: per-platform market search and lookup
//! - `ClientError`: failure taxonomy shared by every client

pub mod error;
pub mod market_client;

pub use error::{ClientError, ClientResult};
pub use market_client::MarketClient;
