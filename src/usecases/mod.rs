//! Use Cases Layer - Application Workflows
//!
//! Orchestrates the platform ports into the operations the command
//! surface exposes.
//!
//! Use cases:
//! - `Aggregator`: parallel search, merge, filter, sort, limit; market
//!   lookup and credential diagnostics
//! - `formatter`: markdown table rendering of aggregated results

pub mod aggregator;
pub mod formatter;

pub use aggregator::Aggregator;
