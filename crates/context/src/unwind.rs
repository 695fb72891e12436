//! The unwind traversal.

use crate::entry::UndoEntry;
use crate::failure::{ExitKind, Failure, Suppressed};
use rollbackctx_core::UnwindConfig;
use std::collections::VecDeque;

pub(crate) type SuppressedHook<'a, E> = Box<dyn FnMut(Suppressed<E>) + 'a>;

/// What one unwind did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnwindReport {
    /// Entries whose action ran, failed ones included
    pub invoked: usize,
    /// Auto-committed entries skipped on the success path
    pub skipped: usize,
    /// Entries whose action returned `Err` or panicked
    pub failed: usize,
}

/// Drain `entries` front to back, running or skipping each one.
///
/// On the success path the first failure is handed back to the caller and
/// every later one goes to `hook`. On the failure path the caller already
/// holds the primary error, so every undo failure goes to `hook`.
pub(crate) fn unwind<'a, E>(
    entries: &mut VecDeque<UndoEntry<'a, E>>,
    exit: ExitKind,
    config: &UnwindConfig,
    hook: &mut Option<SuppressedHook<'a, E>>,
) -> (UnwindReport, Option<(usize, Failure<E>)>) {
    let span = tracing::debug_span!(
        "unwind",
        label = %config.label,
        exit = %exit,
        pending = entries.len()
    );
    let _guard = span.enter();

    let mut report = UnwindReport::default();
    let mut earliest = None;
    let mut position = 0;

    while let Some(entry) = entries.pop_front() {
        let current = position;
        position += 1;

        if exit.is_success() && entry.is_auto_commit() {
            tracing::trace!(position = current, "skipping auto-committed undo entry");
            report.skipped += 1;
            continue;
        }

        tracing::trace!(position = current, "running undo entry");
        report.invoked += 1;

        let failure = match entry.invoke(config.catch_undo_panics) {
            Ok(()) => continue,
            Err(failure) => failure,
        };

        report.failed += 1;
        tracing::debug!(
            position = current,
            panic = failure.is_panic(),
            "undo entry failed, continuing"
        );

        if exit.is_success() && earliest.is_none() {
            earliest = Some((current, failure));
        } else if let Some(hook) = hook.as_mut() {
            hook(Suppressed {
                position: current,
                exit,
                failure,
            });
        }
    }

    tracing::debug!(
        invoked = report.invoked,
        skipped = report.skipped,
        failed = report.failed,
        "unwind finished"
    );

    (report, earliest)
}
