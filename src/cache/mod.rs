//! Cache module - Rendered document cache
//!
//! Provides:
//! - RenderCache keyed by explicit string or file identity
//! - Fingerprint, TTL and capacity bookkeeping

pub mod render_cache;

pub use render_cache::{CacheKey, CacheStats, Clock, RenderCache, SystemClock};
