//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod provider;
