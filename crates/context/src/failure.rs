//! Failures raised by undo actions and the ones that get suppressed.

use std::any::Any;
use std::fmt;

/// Payload of a caught panic, as returned by `std::panic::catch_unwind`.
pub type PanicPayload = Box<dyn Any + Send + 'static>;

/// The way an unwind was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// The scope body returned `Ok`. Auto-committed entries are skipped.
    Success,
    /// The scope body returned `Err`, panicked, or was abandoned.
    Failure,
}

impl ExitKind {
    pub fn of<T, E>(outcome: &Result<T, E>) -> Self {
        match outcome {
            Ok(_) => ExitKind::Success,
            Err(_) => ExitKind::Failure,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitKind::Success)
    }
}

impl From<rollbackctx_core::DropOutcome> for ExitKind {
    fn from(outcome: rollbackctx_core::DropOutcome) -> Self {
        match outcome {
            rollbackctx_core::DropOutcome::Failure => ExitKind::Failure,
            rollbackctx_core::DropOutcome::Success => ExitKind::Success,
        }
    }
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitKind::Success => f.write_str("success"),
            ExitKind::Failure => f.write_str("failure"),
        }
    }
}

/// A failed undo action.
pub enum Failure<E> {
    /// The action returned `Err`
    Error(E),
    /// The action panicked and the panic was caught
    Panic(PanicPayload),
}

impl<E> Failure<E> {
    pub fn is_panic(&self) -> bool {
        matches!(self, Failure::Panic(_))
    }

    /// The error, if the action returned one
    pub fn into_error(self) -> Option<E> {
        match self {
            Failure::Error(e) => Some(e),
            Failure::Panic(_) => None,
        }
    }

    /// The panic message, when the payload is a string
    pub fn panic_message(&self) -> Option<String> {
        match self {
            Failure::Panic(payload) => panic_message(payload.as_ref()),
            Failure::Error(_) => None,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Failure::Panic(payload) => f
                .debug_tuple("Panic")
                .field(&panic_message(payload.as_ref()).unwrap_or_else(|| "<non-string>".into()))
                .finish(),
        }
    }
}

impl<E: fmt::Display> fmt::Display for Failure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Error(e) => fmt::Display::fmt(e, f),
            Failure::Panic(payload) => match panic_message(payload.as_ref()) {
                Some(message) => write!(f, "undo action panicked: {message}"),
                None => f.write_str("undo action panicked"),
            },
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        Some((*s).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

/// An undo failure discarded because an earlier failure takes precedence.
#[derive(Debug)]
pub struct Suppressed<E> {
    /// Index of the entry in unwind order, starting at 0 for the top
    pub position: usize,
    /// Kind of the unwind the failure happened in
    pub exit: ExitKind,
    pub failure: Failure<E>,
}

/// Hook that reports suppressed failures as `tracing` warnings.
///
/// ```rust
/// use rollbackctx::{log_suppressed, RollbackContext};
///
/// let mut rollback = RollbackContext::<anyhow::Error>::new();
/// rollback.on_suppressed(log_suppressed);
/// ```
pub fn log_suppressed<E: fmt::Display>(suppressed: Suppressed<E>) {
    tracing::warn!(
        position = suppressed.position,
        exit = %suppressed.exit,
        panic = suppressed.failure.is_panic(),
        "suppressed undo failure: {}",
        suppressed.failure
    );
}
