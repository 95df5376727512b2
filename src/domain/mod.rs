//! Domain layer - Unified market model and pure conversions.
//!
//! No I/O here (hexagonal architecture inner ring). Adapters translate
//! platform payloads into these types; usecases merge and rank them.

pub mod display;
pub mod market;
pub mod odds;
pub mod ranking;
pub mod search;

// Re-export core types for convenience
pub use market::{MarketStatus, Outcome, Platform, UnifiedMarket};
pub use search::{
    AggregatedResult, AuthStatus, PlatformFilters, PlatformStatus, ResultMeta, SearchOptions,
    SortBy,
};
