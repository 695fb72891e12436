//! The rollback stack manager.

use crate::entry::{EntryHandle, UndoEntry};
use crate::failure::{ExitKind, Failure, Suppressed};
use crate::unwind::{self, SuppressedHook, UnwindReport};
use rollbackctx_core::UnwindConfig;
use std::collections::VecDeque;
use std::fmt;

/// A stack of undo actions that is unwound exactly once when its scope ends.
///
/// The front of the deque is the top of the stack. `push` inserts at the
/// front and `push_bottom` appends at the back, so one front-to-back walk
/// runs top entries newest first and bottom entries in the order they were
/// registered.
///
/// ```rust
/// use rollbackctx::RollbackContext;
/// use std::cell::RefCell;
///
/// let log = RefCell::new(Vec::new());
/// let result: anyhow::Result<()> = RollbackContext::run(|rollback| {
///     rollback.push(|| {
///         log.borrow_mut().push("release lease");
///         Ok(())
///     });
///     rollback.push(|| {
///         log.borrow_mut().push("unmount");
///         Ok(())
///     });
///     anyhow::bail!("attach failed")
/// });
///
/// assert!(result.is_err());
/// assert_eq!(*log.borrow(), ["unmount", "release lease"]);
/// ```
pub struct RollbackContext<'a, E = anyhow::Error> {
    entries: VecDeque<UndoEntry<'a, E>>,
    config: UnwindConfig,
    on_suppressed: Option<SuppressedHook<'a, E>>,
    exited: bool,
}

impl<'a, E> RollbackContext<'a, E> {
    pub fn new() -> Self {
        Self::with_config(UnwindConfig::default())
    }

    pub fn with_config(config: UnwindConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            config,
            on_suppressed: None,
            exited: false,
        }
    }

    /// Run `body` in a fresh context and unwind it when `body` returns.
    ///
    /// Returns `body`'s error if it failed, otherwise the first error raised
    /// by an undo action, otherwise `body`'s value.
    pub fn run<T, F>(body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        Self::run_with_config(UnwindConfig::default(), body)
    }

    pub fn run_with_config<T, F>(config: UnwindConfig, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let mut context = Self::with_config(config);
        let outcome = body(&mut context);
        context.exit(outcome)
    }

    /// Register an undo action on top of the stack.
    pub fn push<F>(&mut self, action: F) -> EntryHandle
    where
        F: FnOnce() -> Result<(), E> + 'a,
    {
        let (entry, handle) = UndoEntry::new(action);
        self.entries.push_front(entry);
        tracing::trace!(pending = self.entries.len(), "pushed undo entry");
        handle
    }

    /// Register `action` with `args` bound now, on top of the stack.
    pub fn push_with<A, F>(&mut self, action: F, args: A) -> EntryHandle
    where
        A: 'a,
        F: FnOnce(A) -> Result<(), E> + 'a,
    {
        let (entry, handle) = UndoEntry::bound(action, args);
        self.entries.push_front(entry);
        tracing::trace!(pending = self.entries.len(), "pushed undo entry");
        handle
    }

    /// Register an undo action at the bottom of the stack.
    ///
    /// Bottom entries run after every top entry, oldest first.
    pub fn push_bottom<F>(&mut self, action: F) -> EntryHandle
    where
        F: FnOnce() -> Result<(), E> + 'a,
    {
        let (entry, handle) = UndoEntry::new(action);
        self.entries.push_back(entry);
        tracing::trace!(pending = self.entries.len(), "pushed undo entry at bottom");
        handle
    }

    pub fn push_bottom_with<A, F>(&mut self, action: F, args: A) -> EntryHandle
    where
        A: 'a,
        F: FnOnce(A) -> Result<(), E> + 'a,
    {
        let (entry, handle) = UndoEntry::bound(action, args);
        self.entries.push_back(entry);
        tracing::trace!(pending = self.entries.len(), "pushed undo entry at bottom");
        handle
    }

    /// Discard every pending entry without running it.
    ///
    /// Entries pushed afterwards are unwound as usual.
    pub fn commit_all(&mut self) {
        tracing::debug!(
            label = %self.config.label,
            discarded = self.entries.len(),
            "committing all undo entries"
        );
        self.entries.clear();
    }

    /// Receive the undo failures dropped by the earliest-error-wins rule.
    ///
    /// Without a hook they are discarded silently.
    pub fn on_suppressed<H>(&mut self, hook: H)
    where
        H: FnMut(Suppressed<E>) + 'a,
    {
        self.on_suppressed = Some(Box::new(hook));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> &UnwindConfig {
        &self.config
    }

    /// End the scope with the body's `outcome` and unwind.
    ///
    /// If `outcome` is `Ok` and an undo action panicked before any undo
    /// action returned `Err`, the panic is resumed once every entry ran.
    pub fn exit<T>(self, outcome: Result<T, E>) -> Result<T, E> {
        self.exit_with_report(outcome).0
    }

    /// Same as [`exit`](Self::exit), also returning what the unwind did.
    pub fn exit_with_report<T>(mut self, outcome: Result<T, E>) -> (Result<T, E>, UnwindReport) {
        self.exited = true;
        let exit = ExitKind::of(&outcome);
        let (report, earliest) = self.unwind(exit);

        let result = match (outcome, earliest) {
            (Err(e), _) => Err(e),
            (Ok(value), None) => Ok(value),
            (Ok(_), Some((_, Failure::Error(e)))) => Err(e),
            (Ok(_), Some((_, Failure::Panic(payload)))) => std::panic::resume_unwind(payload),
        };
        (result, report)
    }

    fn unwind(&mut self, exit: ExitKind) -> (UnwindReport, Option<(usize, Failure<E>)>) {
        unwind::unwind(&mut self.entries, exit, &self.config, &mut self.on_suppressed)
    }
}

impl<E> Default for RollbackContext<'_, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for RollbackContext<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RollbackContext")
            .field("entries", &self.entries)
            .field("config", &self.config)
            .field("on_suppressed", &self.on_suppressed.is_some())
            .field("exited", &self.exited)
            .finish()
    }
}

impl<E> Drop for RollbackContext<'_, E> {
    fn drop(&mut self) {
        if self.exited {
            return;
        }
        self.exited = true;
        if self.entries.is_empty() {
            return;
        }

        let panicking = std::thread::panicking();
        let exit = if panicking {
            ExitKind::Failure
        } else {
            ExitKind::from(self.config.drop_outcome)
        };
        tracing::debug!(
            label = %self.config.label,
            pending = self.entries.len(),
            exit = %exit,
            panicking,
            "rollback context dropped without exit"
        );

        // Only the success path hands a failure back, and it is never
        // chosen while a panic is in flight.
        if let Some((position, failure)) = self.unwind(exit).1 {
            match failure {
                Failure::Panic(payload) => std::panic::resume_unwind(payload),
                failure => {
                    if let Some(hook) = self.on_suppressed.as_mut() {
                        hook(Suppressed {
                            position,
                            exit,
                            failure,
                        });
                    }
                }
            }
        }
    }
}
