//! Shared helpers around `rollbackctx`
//!
//! - **`undo`**: undo actions for files, directories and child processes.
//! - **`ext`**: the `RollbackExt` trait that registers them on a context.
//! - **`tracing`**: subscriber initialisation for binaries.

pub mod ext;
pub mod tracing;
pub mod undo;

pub use ext::RollbackExt;
