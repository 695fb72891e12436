//! Registration shortcuts for the stock undo actions.

use crate::undo;
use rollbackctx::{EntryHandle, RollbackContext};
use std::path::PathBuf;
use std::process::Child;
use std::time::Duration;

/// Push the stock undo actions onto a [`RollbackContext`].
///
/// Available for any context whose error type can absorb
/// [`rollbackctx_core::Error`], which includes `anyhow::Error`.
pub trait RollbackExt {
    /// Remove `path` on unwind
    fn push_remove_file(&mut self, path: impl Into<PathBuf>) -> EntryHandle;

    /// Remove the directory tree at `path` on unwind
    fn push_remove_dir(&mut self, path: impl Into<PathBuf>) -> EntryHandle;

    /// Terminate `child` on unwind, killing it after `grace`
    fn push_terminate(&mut self, child: Child, grace: Duration) -> EntryHandle;
}

impl<E> RollbackExt for RollbackContext<'_, E>
where
    E: From<rollbackctx_core::Error>,
{
    fn push_remove_file(&mut self, path: impl Into<PathBuf>) -> EntryHandle {
        self.push_with(
            |path: PathBuf| undo::remove_file(&path).map_err(E::from),
            path.into(),
        )
    }

    fn push_remove_dir(&mut self, path: impl Into<PathBuf>) -> EntryHandle {
        self.push_with(
            |path: PathBuf| undo::remove_dir_all(&path).map_err(E::from),
            path.into(),
        )
    }

    fn push_terminate(&mut self, child: Child, grace: Duration) -> EntryHandle {
        self.push_with(
            move |child: Child| undo::terminate_process(child, grace).map_err(E::from),
            child,
        )
    }
}
