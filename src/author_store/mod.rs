//! Author preference storage.
//!
//! Holds the explicit preferences an author submits through the preference
//! form and, separately, the advisory adjustment weights the feedback
//! processor derives. Adjustments never overwrite explicit preferences;
//! both are read by the scorer.

mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{
    AuthorPreferences, PreferenceAdjustment, PreferredLength, StylePreferences, StyleWeights, Topic,
};
pub use store::SqliteAuthorStore;
pub use trait_def::AuthorStore;
