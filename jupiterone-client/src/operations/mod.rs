//! One function per GraphQL operation

pub mod question;
pub mod rule;
