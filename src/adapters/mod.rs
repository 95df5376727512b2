//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the [`MarketClient`](crate::ports::MarketClient) port once per
//! platform. Each adapter owns its HTTP plumbing, raw payload types and the
//! normalizer that maps them into the unified schema.
//!
//! Adapter categories:
//! - `betfair`: session-authenticated exchange REST API (back/lay books)
//! - `polymarket`: public site scraper (embedded page payload)

pub mod betfair;
pub mod polymarket;
