//! Clinical Notes - Backend for clinical record editing and medication charts
//!
//! Provides cached Drive listings, rich-text sanitizing, dose cycling, RUT and
//! age checks, record import and local persistence behind a small HTTP API.

pub mod ai;
pub mod api;
pub mod cache;
pub mod config;
pub mod dose;
pub mod drive;
pub mod error;
pub mod medication;
pub mod models;
pub mod persistence;
pub mod record;
pub mod sanitize;

pub use api::AppState;
pub use config::Config;
pub use error::{AppError, Result};
