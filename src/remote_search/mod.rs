//! Remote podcast-search capability.
//!
//! The remote tier queries an external podcast directory for supplementary
//! candidates when the local catalogue is not enough. Requests toward the
//! directory are budgeted by a sliding-window rate limiter.

mod listen_api;
mod provider;
mod rate_limit;

pub use listen_api::ListenApiSearchProvider;
pub use provider::{PodcastSearchProvider, SearchError, SearchPage, SearchQuery};
pub use rate_limit::{RateLimiterConfig, SlidingWindowLimiter};
