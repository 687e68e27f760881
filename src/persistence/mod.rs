//! Persistence Module
//!
//! Local key-value storage for the editor: autosave draft, version history,
//! favorite folders, recent files and the default save folder.

mod local;
mod store;

pub use local::{
    DefaultFolder, FavoriteFolder, LocalStore, RecentFile, Snapshot, HISTORY_LIMIT, RECENT_LIMIT,
};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
