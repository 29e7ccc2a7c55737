//! Zombie and orphan demonstration
//!
//! The parent forks one child and never reaps it. While the child has
//! exited and the parent is still sleeping, the child is a zombie
//! (`ps -el | grep defunct`). When the parent exits first, the still
//! running child is an orphan and gets reparented to init or the nearest
//! subreaper.

use crate::config::LifecycleConfig;
use crate::errors::ProcessResult;
use crate::process::{ChildExit, Forked, ProcessApi};
use nix::unistd::Pid;
use std::io::Write;
use tracing::info;

/// Run the demonstration in the calling process. Never returns: the
/// calling process is the demo parent and exits without reaping.
///
/// Returns `Err` only if the initial fork fails.
pub fn run<P, W>(api: &mut P, config: &LifecycleConfig, out: &mut W) -> ProcessResult<std::convert::Infallible>
where
    P: ProcessApi,
    W: Write,
{
    out.flush()?;
    match api.fork()? {
        Forked::Child => {
            let code = match child_side(api, config, out) {
                Ok(()) => 0,
                Err(_) => 1,
            };
            api.terminate(code)
        }
        Forked::Parent { child } => {
            let code = match parent_side(api, child, config, out) {
                Ok(()) => 0,
                Err(_) => 1,
            };
            // wait()せずに終了する: 子は孤児になりinitに引き取られる
            api.terminate(code)
        }
    }
}

/// Host the demonstration in a dedicated stage process so the caller
/// survives the demo parent's early exit.
///
/// Only the stage process is reaped here; the demo child is left to the
/// kernel, exactly as the demonstration intends.
pub fn run_staged<P, W>(api: &mut P, config: &LifecycleConfig, out: &mut W) -> ProcessResult<ChildExit>
where
    P: ProcessApi,
    W: Write,
{
    writeln!(out, "\n--- Task 3: Zombie and Orphan Processes ---")?;
    out.flush()?;

    match api.fork()? {
        Forked::Child => {
            let code = match run(api, config, out) {
                Ok(never) => match never {},
                Err(_) => 1,
            };
            api.terminate(code)
        }
        Forked::Parent { child } => {
            let stage = api.wait_for(child)?;
            info!(stage = %stage.pid, status = %stage.describe(), "lifecycle stage finished");
            Ok(stage)
        }
    }
}

/// Child: announce, stay alive to be observed, announce completion.
pub(crate) fn child_side<P, W>(api: &mut P, config: &LifecycleConfig, out: &mut W) -> ProcessResult<()>
where
    P: ProcessApi,
    W: Write,
{
    writeln!(out, "Child PID {} running; Parent PID {}", api.pid(), api.parent_pid())?;
    out.flush()?;
    api.sleep(config.child_sleep);
    writeln!(out, "Child done (Parent PID now {})", api.parent_pid())?;
    out.flush()?;
    Ok(())
}

/// Parent: announce, skip reaping, linger, announce exit.
pub(crate) fn parent_side<P, W>(api: &mut P, child: Pid, config: &LifecycleConfig, out: &mut W) -> ProcessResult<()>
where
    P: ProcessApi,
    W: Write,
{
    writeln!(out, "Parent PID {} created child {}", api.pid(), child)?;
    writeln!(
        out,
        "Parent sleeping {} seconds before exiting (to create orphan)",
        config.parent_sleep.as_secs_f32()
    )?;
    out.flush()?;
    api.sleep(config.parent_sleep);
    writeln!(out, "Parent exiting now")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeProcess;
    use std::time::Duration;

    #[test]
    fn test_parent_never_reaps() {
        let mut api = FakeProcess::new();
        let config = LifecycleConfig::default();
        let child = Pid::from_raw(4321);
        let mut out = Vec::new();

        parent_side(&mut api, child, &config, &mut out).unwrap();

        assert_eq!(api.wait_any_calls, 0);
        assert!(api.wait_for_calls.is_empty());
        assert_eq!(api.sleeps, vec![Duration::from_secs(5)]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Parent PID 500 created child 4321\n"));
        assert!(text.ends_with("Parent exiting now\n"));
    }

    #[test]
    fn test_child_outlives_parent_by_default() {
        let mut api = FakeProcess::new();
        let config = LifecycleConfig::default();
        let mut out = Vec::new();

        child_side(&mut api, &config, &mut out).unwrap();

        assert_eq!(api.sleeps, vec![Duration::from_secs(10)]);
        assert!(config.child_sleep > config.parent_sleep);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Child PID 500 running; Parent PID 1\n"));
        assert!(text.contains("Child done"));
    }
}
