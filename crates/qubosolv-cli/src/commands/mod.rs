//! CLI command implementations.

pub mod common;
pub mod credentials;
pub mod login;
pub mod solve;
pub mod version;
