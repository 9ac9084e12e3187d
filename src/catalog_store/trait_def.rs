//! CatalogStore trait definition.

use super::models::Podcast;
use anyhow::Result;

/// Trait for podcast catalogue backends.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait CatalogStore: Send + Sync {
    /// Get a podcast by ID.
    fn get_podcast(&self, podcast_id: &str) -> Result<Option<Podcast>>;

    /// Get every podcast in the catalogue.
    fn get_all_podcasts(&self) -> Result<Vec<Podcast>>;

    /// Insert or update a podcast record.
    fn upsert_podcast(&self, podcast: &Podcast) -> Result<()>;

    /// Number of podcasts in the catalogue.
    fn get_podcast_count(&self) -> Result<usize>;
}
