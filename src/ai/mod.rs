//! AI Module
//!
//! Generative-text completion used by the editor's writing assistant, with a
//! bounded retry on rate limiting and transient server errors.

mod client;
pub mod retry;

pub use client::GenerativeClient;
pub use retry::{is_retryable, retry_delay, BACKOFF_BASE, MAX_RETRIES, MAX_RETRY_AFTER};
