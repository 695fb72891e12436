//! Builds a small workspace step by step and rolls it back when a step fails.
//!
//! ```text
//! RUST_LOG=debug cargo run -p rollbackctx-demos --bin staged_workspace -- --fail-at 4
//! ```

use clap::Parser;
use rollbackctx::{log_suppressed, RollbackContext};
use rollbackctx_core::UnwindConfig;
use rollbackctx_utils::RollbackExt;
use std::fs;
use std::path::Path;

#[derive(Debug, Parser)]
#[command(about = "Stage a workspace under a temp dir, failing at a chosen step")]
struct Args {
    /// Step number (1-4) that fails; 0 lets every step succeed
    #[arg(long, default_value_t = 0)]
    fail_at: u8,

    /// Keep everything on success instead of removing scratch resources
    #[arg(long)]
    commit: bool,
}

fn step(number: u8, fail_at: u8, what: &str) -> anyhow::Result<()> {
    tracing::info!(step = number, "{what}");
    if number == fail_at {
        anyhow::bail!("step {number} ({what}) failed");
    }
    Ok(())
}

fn stage(root: &Path, args: &Args) -> anyhow::Result<()> {
    let config = UnwindConfig::from_env()?;

    RollbackContext::<anyhow::Error>::run_with_config(config, |rollback| {
        rollback.on_suppressed(log_suppressed);

        // The session log is closed last, whatever else gets registered.
        let session = root.join("session.log");
        fs::write(&session, "session opened\n")?;
        rollback.push_bottom(|| {
            tracing::info!("closing session log");
            Ok(())
        });
        rollback.push_remove_file(&session).set_auto_commit();

        step(1, args.fail_at, "create workspace directory")?;
        let workspace = root.join("workspace");
        fs::create_dir_all(&workspace)?;
        rollback.push_remove_dir(&workspace);

        step(2, args.fail_at, "write manifest")?;
        let manifest = workspace.join("manifest.toml");
        fs::write(&manifest, "[workspace]\nmembers = []\n")?;
        rollback.push_remove_file(&manifest);

        step(3, args.fail_at, "start helper process")?;
        #[cfg(unix)]
        {
            let helper = std::process::Command::new("sleep").arg("60").spawn()?;
            tracing::info!(pid = helper.id(), "helper started");
            rollback.push_terminate(helper, std::time::Duration::from_millis(500));
        }

        step(4, args.fail_at, "verify workspace")?;

        if args.commit {
            rollback.commit_all();
        }
        Ok(())
    })
}

fn main() -> anyhow::Result<()> {
    rollbackctx_utils::tracing::init().map_err(|e| anyhow::anyhow!(e))?;
    let args = Args::parse();

    let root = tempfile::tempdir()?;
    let result = stage(root.path(), &args);

    for entry in walk(root.path())? {
        println!("left behind: {}", entry.display());
    }

    match &result {
        Ok(()) => println!("staging succeeded"),
        Err(e) => println!("staging rolled back: {e}"),
    }
    result
}

fn walk(dir: &Path) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            found.extend(walk(&path)?);
        }
        found.push(path);
    }
    found.sort();
    Ok(found)
}
