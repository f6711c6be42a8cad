//! Command implementations.

pub mod serve;
pub mod token;
pub mod version;
