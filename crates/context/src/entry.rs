//! Undo entries and the handles returned when they are registered.

use crate::failure::Failure;
use std::cell::Cell;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

type UndoFn<'a, E> = Box<dyn FnOnce() -> Result<(), E> + 'a>;

/// One registered undo action.
///
/// Owned by the context's stack. Consumed either by running it during
/// unwind, by skipping it, or by `commit_all`.
pub struct UndoEntry<'a, E> {
    action: UndoFn<'a, E>,
    auto_commit: Rc<Cell<bool>>,
}

impl<'a, E> UndoEntry<'a, E> {
    pub(crate) fn new<F>(action: F) -> (Self, EntryHandle)
    where
        F: FnOnce() -> Result<(), E> + 'a,
    {
        let auto_commit = Rc::new(Cell::new(false));
        let handle = EntryHandle {
            auto_commit: Rc::clone(&auto_commit),
        };
        let entry = Self {
            action: Box::new(action),
            auto_commit,
        };
        (entry, handle)
    }

    /// Bind `args` to `action` now; the entry calls `action(args)` at unwind.
    pub(crate) fn bound<A, F>(action: F, args: A) -> (Self, EntryHandle)
    where
        A: 'a,
        F: FnOnce(A) -> Result<(), E> + 'a,
    {
        Self::new(move || action(args))
    }

    pub(crate) fn is_auto_commit(&self) -> bool {
        self.auto_commit.get()
    }

    /// Run the action. With `catch_panics` a panic is turned into
    /// `Failure::Panic` instead of unwinding through the caller.
    pub(crate) fn invoke(self, catch_panics: bool) -> Result<(), Failure<E>> {
        let action = self.action;
        if catch_panics {
            match catch_unwind(AssertUnwindSafe(action)) {
                Ok(result) => result.map_err(Failure::Error),
                Err(payload) => Err(Failure::Panic(payload)),
            }
        } else {
            action().map_err(Failure::Error)
        }
    }
}

impl<E> fmt::Debug for UndoEntry<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoEntry")
            .field("auto_commit", &self.auto_commit.get())
            .finish_non_exhaustive()
    }
}

/// Handle to a registered undo entry.
///
/// Shares the entry's auto-commit flag, so it stays usable while more
/// entries are pushed. Calling it after the entry ran has no effect.
#[derive(Debug, Clone)]
pub struct EntryHandle {
    auto_commit: Rc<Cell<bool>>,
}

impl EntryHandle {
    /// Skip this entry if the scope exits successfully.
    ///
    /// A failing scope still runs it.
    pub fn set_auto_commit(&self) {
        self.auto_commit.set(true);
    }

    pub fn is_auto_commit(&self) -> bool {
        self.auto_commit.get()
    }
}
