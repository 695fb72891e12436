//! Prints the undo order produced by the basic registration patterns.

use rollbackctx::RollbackContext;
use std::cell::RefCell;
use std::fmt::Write as _;

type Out = RefCell<String>;

fn writer<'a>(out: &'a Out, text: &'static str) -> impl FnOnce() -> anyhow::Result<()> + 'a {
    move || {
        writeln!(out.borrow_mut(), "  {text}")?;
        Ok(())
    }
}

fn report(title: &str, out: Out, result: anyhow::Result<()>) {
    println!("{title}");
    print!("{}", out.into_inner());
    match result {
        Ok(()) => println!("  => ok"),
        Err(e) => println!("  => error: {e}"),
    }
}

fn main() -> anyhow::Result<()> {
    rollbackctx_utils::tracing::init().map_err(|e| anyhow::anyhow!(e))?;

    // A: plain pushes unwind newest first
    let out = Out::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(writer(&out, "Undo0"));
        rollback.push(writer(&out, "Undo1"));
        rollback.push(writer(&out, "Undo2"));
        Ok(())
    });
    report("Scenario A: push Undo0, Undo1, Undo2", out, result);

    // B: bottom pushes keep their order
    let out = Out::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push_bottom(writer(&out, "0"));
        rollback.push_bottom(writer(&out, "1"));
        rollback.push_bottom(writer(&out, "2"));
        Ok(())
    });
    report("Scenario B: push_bottom 0, 1, 2", out, result);

    // C: auto-commit skips A on success
    let out = Out::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(writer(&out, "undo A")).set_auto_commit();
        rollback.push(writer(&out, "undo B"));
        Ok(())
    });
    report("Scenario C: A auto-committed, body succeeds", out, result);

    // D: auto-commit is ignored once the body fails
    let out = Out::default();
    let result = RollbackContext::run(|rollback| {
        rollback.push(writer(&out, "undo A")).set_auto_commit();
        rollback.push(writer(&out, "undo B"));
        anyhow::bail!("body failed after both pushes")
    });
    report("Scenario D: A auto-committed, body fails", out, result);

    Ok(())
}
