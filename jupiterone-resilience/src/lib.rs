//! Resilience patterns for the JupiterOne provider
//!
//! A retry executor with exponential backoff, bounded by a deadline.

pub mod retry;

// Re-export commonly used types
pub use retry::{RetryError, RetryExecutor, RetryPolicy, Retryable};
