//! Core types, errors, and configuration for the `rollbackctx` workspace.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias used by the
//!   configuration layer and the stock undo actions.
//! - **`config`**: `UnwindConfig`, the knobs of a rollback context, loadable
//!   from `ROLLBACKCTX_*` environment variables.
//! - **`constants`**: environment variable names and defaults.

pub mod config;
pub mod constants;
pub mod errors;

pub use self::{
    config::{DropOutcome, UnwindConfig},
    constants::*,
    errors::{Error, Result},
};
