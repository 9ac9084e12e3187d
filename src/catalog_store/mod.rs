//! Podcast catalogue storage.
//!
//! The catalogue holds the locally known podcast records that the local
//! matching tier iterates over. Remote search results are scored against
//! the same model without being written back here.

mod models;
mod null_store;
mod schema;
mod store;
mod trait_def;

pub use models::Podcast;
pub use null_store::NullCatalogStore;
pub use store::SqliteCatalogStore;
pub use trait_def::CatalogStore;
