//! Derived podcast feature cache.
//!
//! Features are computed by the extractor, cached here with a freshness
//! timestamp, and fully recomputed (never patched in place) when stale or
//! absent.

mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{
    ComplexityLevel, ContentStyle, FeatureCacheStats, PodcastFeatures, UpdateFrequency,
};
pub use store::SqliteFeatureStore;
pub use trait_def::FeatureStore;
