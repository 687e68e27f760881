//! Drive Module
//!
//! Remote persistence on Google Drive: cached folder listings, folder
//! creation, record upload and download, and content search.

mod client;
pub mod search;
mod types;

pub use client::{DriveClient, SearchHit};
pub use search::{run_bounded, SEARCH_CONCURRENCY};
pub use types::{folder_prefix, DriveItem, ListQuery, FOLDER_MIME};
