//! Empty catalogue for tests and matcher-less deployments.

use super::models::Podcast;
use super::trait_def::CatalogStore;
use anyhow::Result;

/// A catalogue that contains nothing and swallows writes.
pub struct NullCatalogStore;

impl CatalogStore for NullCatalogStore {
    fn get_podcast(&self, _podcast_id: &str) -> Result<Option<Podcast>> {
        Ok(None)
    }

    fn get_all_podcasts(&self) -> Result<Vec<Podcast>> {
        Ok(vec![])
    }

    fn upsert_podcast(&self, _podcast: &Podcast) -> Result<()> {
        Ok(())
    }

    fn get_podcast_count(&self) -> Result<usize> {
        Ok(0)
    }
}
