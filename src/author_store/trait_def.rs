//! AuthorStore trait definition.

use super::models::{AuthorPreferences, PreferenceAdjustment};
use anyhow::Result;

/// Trait for author preference backends.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait AuthorStore: Send + Sync {
    // =========================================================================
    // Explicit preferences
    // =========================================================================

    /// Get an author's explicit preferences.
    fn get_preferences(&self, user_id: &str) -> Result<Option<AuthorPreferences>>;

    /// Insert or update an author's explicit preferences.
    fn upsert_preferences(&self, preferences: &AuthorPreferences) -> Result<()>;

    // =========================================================================
    // Derived adjustments
    // =========================================================================

    /// Get the latest derived adjustment for an author.
    fn get_adjustment(&self, user_id: &str) -> Result<Option<PreferenceAdjustment>>;

    /// Insert or replace the derived adjustment for an author.
    fn upsert_adjustment(&self, adjustment: &PreferenceAdjustment) -> Result<()>;
}
