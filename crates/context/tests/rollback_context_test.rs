//! Integration tests for unwind ordering, auto-commit and error precedence

use rollbackctx::{ExitKind, RollbackContext, Suppressed};
use std::cell::RefCell;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
enum TestError {
    #[error("first error")]
    First,
    #[error("second error")]
    Second,
}

type Log = RefCell<Vec<u32>>;

fn append(log: &Log, value: u32) -> impl FnOnce() -> Result<(), TestError> + '_ {
    move || {
        log.borrow_mut().push(value);
        Ok(())
    }
}

fn raise(error: TestError) -> impl FnOnce() -> Result<(), TestError> {
    move || Err(error)
}

#[test]
fn test_rollback_runs_in_reverse_push_order() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 1));
        rollback.push(append(&log, 0));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), vec![0, 1]);
}

#[test]
fn test_three_pushes_unwind_lifo() {
    let log = Log::default();
    let result = RollbackContext::<TestError>::run(|rollback| {
        for undo in 0..3 {
            rollback.push(append(&log, undo));
        }
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), vec![2, 1, 0]);
}

#[test]
fn test_bottom_entries_run_last_in_registration_order() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push_bottom(append(&log, 1));
        rollback.push(append(&log, 0));
        rollback.push_bottom(append(&log, 2));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
}

#[test]
fn test_bottom_only_keeps_registration_order() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push_bottom(append(&log, 0));
        rollback.push_bottom(append(&log, 1));
        rollback.push_bottom(append(&log, 2));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
}

#[test]
fn test_interleaved_top_and_bottom_pushes() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 12));
        rollback.push_bottom(append(&log, 20));
        rollback.push(append(&log, 11));
        rollback.push_bottom(append(&log, 21));
        rollback.push(append(&log, 10));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), vec![10, 11, 12, 20, 21]);
}

#[test]
fn test_body_error_runs_registered_undos() {
    let log = Log::default();
    let result: Result<(), TestError> = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 2));
        rollback.push(append(&log, 1));
        Err(TestError::First)
    });

    assert_eq!(result, Err(TestError::First));
    assert_eq!(*log.borrow(), vec![1, 2]);
}

#[test]
fn test_undo_error_does_not_stop_unwind() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 1));
        rollback.push(raise(TestError::First));
        rollback.push(append(&log, 0));
        Ok(())
    });

    assert_eq!(result, Err(TestError::First));
    assert_eq!(*log.borrow(), vec![0, 1]);
}

#[test]
fn test_body_error_preferred_over_undo_error() {
    let result: Result<(), TestError> = RollbackContext::run(|rollback| {
        rollback.push(raise(TestError::Second));
        Err(TestError::First)
    });

    assert_eq!(result, Err(TestError::First));
}

#[test]
fn test_first_undo_error_preferred() {
    let result = RollbackContext::run(|rollback| {
        rollback.push(raise(TestError::Second));
        rollback.push(raise(TestError::First));
        Ok(())
    });

    assert_eq!(result, Err(TestError::First));
}

#[test]
fn test_auto_commit_skipped_on_success() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 2));
        rollback.push(append(&log, 1)).set_auto_commit();
        rollback.push(append(&log, 0));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), vec![0, 2]);
}

#[test]
fn test_auto_commit_ignored_on_body_error() {
    let log = Log::default();
    let result: Result<(), TestError> = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 2));
        rollback.push(append(&log, 1)).set_auto_commit();
        rollback.push(append(&log, 0));
        Err(TestError::First)
    });

    assert_eq!(result, Err(TestError::First));
    assert_eq!(*log.borrow(), vec![0, 1, 2]);
}

#[test]
fn test_auto_commit_still_skipped_when_undo_fails() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 2));
        rollback.push(append(&log, 1)).set_auto_commit();
        rollback.push(append(&log, 0));
        rollback.push(raise(TestError::First));
        Ok(())
    });

    assert_eq!(result, Err(TestError::First));
    assert_eq!(*log.borrow(), vec![0, 2]);
}

#[test]
fn test_only_non_auto_committed_entry_runs() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        let a = rollback.push(append(&log, 0));
        a.set_auto_commit();
        rollback.push(append(&log, 1));
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert_eq!(*log.borrow(), vec![1]);
}

#[test]
fn test_auto_committed_entry_runs_when_body_fails_after_pushes() {
    let log = Log::default();
    let result: Result<(), TestError> = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 0)).set_auto_commit();
        rollback.push(append(&log, 1));
        Err(TestError::Second)
    });

    assert_eq!(result, Err(TestError::Second));
    assert_eq!(*log.borrow(), vec![1, 0]);
}

#[test]
fn test_commit_all_discards_everything() {
    let log = Log::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 2));
        rollback.push(append(&log, 1));
        rollback.push(append(&log, 0));
        rollback.commit_all();
        Ok(())
    });

    assert_eq!(result, Ok(()));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_commit_all_holds_when_body_fails_later() {
    let log = Log::default();
    let result: Result<(), TestError> = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 1));
        rollback.push_bottom(append(&log, 2));
        rollback.commit_all();
        Err(TestError::First)
    });

    assert_eq!(result, Err(TestError::First));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_push_after_commit_all_is_unwound() {
    let log = Log::default();
    let result: Result<(), TestError> = RollbackContext::run(|rollback| {
        rollback.push(append(&log, 1));
        rollback.commit_all();
        rollback.push(append(&log, 2));
        Err(TestError::First)
    });

    assert_eq!(result, Err(TestError::First));
    assert_eq!(*log.borrow(), vec![2]);
}

#[test]
fn test_body_error_with_two_failing_undos() {
    let log = Log::default();
    let suppressed = RefCell::new(Vec::new());
    let result: Result<(), TestError> = RollbackContext::run(|rollback| {
        rollback.on_suppressed(|s: Suppressed<TestError>| {
            assert_eq!(s.exit, ExitKind::Failure);
            suppressed
                .borrow_mut()
                .push((s.position, s.failure.into_error()));
        });
        rollback.push(append(&log, 0));
        rollback.push(raise(TestError::First));
        rollback.push(append(&log, 1));
        rollback.push(raise(TestError::Second));
        Err(TestError::First)
    });

    assert_eq!(result, Err(TestError::First));
    assert_eq!(*log.borrow(), vec![1, 0]);
    assert_eq!(
        *suppressed.borrow(),
        vec![(0, Some(TestError::Second)), (2, Some(TestError::First))]
    );
}

#[test]
fn test_later_undo_errors_reach_hook_on_success() {
    let suppressed = RefCell::new(Vec::new());
    let result = RollbackContext::run(|rollback| {
        rollback.on_suppressed(|s: Suppressed<TestError>| {
            suppressed.borrow_mut().push(s.failure.into_error());
        });
        rollback.push(raise(TestError::Second));
        rollback.push(raise(TestError::First));
        Ok(())
    });

    assert_eq!(result, Err(TestError::First));
    assert_eq!(*suppressed.borrow(), vec![Some(TestError::Second)]);
}

#[test]
fn test_ok_value_passes_through() {
    let result = RollbackContext::<TestError>::run(|_| Ok("mounted"));
    assert_eq!(result, Ok("mounted"));
}

#[test]
fn test_explicit_exit_pair() {
    let log = Log::default();
    let mut rollback = RollbackContext::new();
    rollback.push(append(&log, 1));
    rollback.push(append(&log, 0));

    let outcome: Result<u8, TestError> = Err(TestError::Second);
    assert_eq!(rollback.exit(outcome), Err(TestError::Second));
    assert_eq!(*log.borrow(), vec![0, 1]);
}

#[test]
fn test_unwind_happens_exactly_once() {
    let log = Log::default();
    let mut rollback = RollbackContext::new();
    for value in 0..5 {
        rollback.push(append(&log, value));
    }

    let (result, report) = rollback.exit_with_report(Ok::<_, TestError>(()));
    assert_eq!(result, Ok(()));
    assert_eq!(report.invoked, 5);
    assert_eq!(*log.borrow(), vec![4, 3, 2, 1, 0]);
}

#[test]
fn test_works_with_anyhow_by_default() {
    let log = Log::default();
    let result: anyhow::Result<()> = RollbackContext::run(|rollback| {
        rollback.push(|| {
            log.borrow_mut().push(9);
            Ok(())
        });
        rollback.push(|| anyhow::bail!("undo failed"));
        Ok(())
    });

    assert_eq!(result.unwrap_err().to_string(), "undo failed");
    assert_eq!(*log.borrow(), vec![9]);
}
