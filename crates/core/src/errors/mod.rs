//! Error types for rollbackctx operations

mod builders;
mod display;
mod types;

pub use types::{Error, Result};
