//! Scoped rollback stacks for chains of fallible steps.
//!
//! A [`RollbackContext`] collects undo actions while a sequence of forward
//! operations runs. Each undo action is registered right after the step it
//! compensates succeeds, so the stack always holds exactly what has to be
//! reverted. When the scope ends the stack is unwound once, newest entry
//! first:
//!
//! - if the body failed, every pending entry runs and the body's error is
//!   returned;
//! - if the body succeeded, entries marked with
//!   [`EntryHandle::set_auto_commit`] are skipped and the rest run;
//! - a failing undo action never stops the unwind; the earliest failure is
//!   the one returned, later ones go to the [`on_suppressed`] hook.
//!
//! [`on_suppressed`]: RollbackContext::on_suppressed
//!
//! ## Example
//!
//! ```rust
//! use rollbackctx::RollbackContext;
//! use std::cell::RefCell;
//!
//! let steps = RefCell::new(Vec::new());
//!
//! let result: anyhow::Result<u32> = RollbackContext::run(|rollback| {
//!     // Always runs last, however many steps follow.
//!     rollback.push_bottom(|| {
//!         steps.borrow_mut().push("close session");
//!         Ok(())
//!     });
//!
//!     steps.borrow_mut().push("create volume");
//!     rollback.push(|| {
//!         steps.borrow_mut().push("delete volume");
//!         Ok(())
//!     });
//!
//!     steps.borrow_mut().push("write marker");
//!     // Only needed if a later step fails.
//!     rollback
//!         .push(|| {
//!             steps.borrow_mut().push("remove marker");
//!             Ok(())
//!         })
//!         .set_auto_commit();
//!
//!     Ok(7)
//! });
//!
//! assert_eq!(result.unwrap(), 7);
//! assert_eq!(
//!     *steps.borrow(),
//!     ["create volume", "write marker", "delete volume", "close session"]
//! );
//! ```
//!
//! Contexts are single-threaded and not reusable: [`RollbackContext::exit`]
//! consumes the context. A context dropped without `exit`, because of an
//! early `?` or a panic, still unwinds once from its `Drop` impl.

mod context;
mod entry;
mod failure;
mod unwind;

pub use context::RollbackContext;
pub use entry::{EntryHandle, UndoEntry};
pub use failure::{log_suppressed, ExitKind, Failure, PanicPayload, Suppressed};
pub use rollbackctx_core::{DropOutcome, UnwindConfig};
pub use unwind::UnwindReport;
