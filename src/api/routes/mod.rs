//! Route handlers, one module per resource.

pub mod defects;
pub mod issues;
pub mod session;
pub mod tasks;
pub mod users;
