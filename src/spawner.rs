//! Create N children that announce themselves; the parent reaps them all
//! with the generic any-child wait.

use crate::errors::ProcessResult;
use crate::process::{reap_remaining, ChildExit, Forked, ProcessApi};
use nix::unistd::Pid;
use std::io::{self, Write};
use tracing::{error, info};

/// What the parent observed
#[derive(Debug, Clone, Default)]
pub struct SpawnReport {
    /// Children in creation order
    pub created: Vec<Pid>,
    /// Children in the order the kernel handed them back
    pub reaped: Vec<ChildExit>,
}

impl SpawnReport {
    pub fn wait_count(&self) -> usize {
        self.reaped.len()
    }
}

/// Fork `count` children, then wait for any child `count` times.
///
/// A fork failure aborts the demonstration, but only after the children
/// created so far have been reaped.
pub fn run<P, W>(api: &mut P, count: usize, out: &mut W) -> ProcessResult<SpawnReport>
where
    P: ProcessApi,
    W: Write,
{
    writeln!(out, "\n--- Task 1: Creating {} child processes ---", count)?;

    let mut report = SpawnReport::default();
    for _ in 0..count {
        out.flush()?;
        match api.fork() {
            Ok(Forked::Parent { child }) => report.created.push(child),
            Ok(Forked::Child) => {
                let code = match greet(api, out) {
                    Ok(()) => 0,
                    Err(_) => 1,
                };
                api.terminate(code);
            }
            Err(e) => {
                error!(%e, created = report.created.len(), "fork failed, reaping created children");
                reap_remaining(api, report.created.len());
                return Err(e);
            }
        }
    }

    // 全ての子プロセスを回収する（どの子が先に終わるかは問わない）
    for _ in 0..count {
        report.reaped.push(api.wait_any()?);
    }

    info!(count, "all spawned children reaped");
    writeln!(out, "Task 1 complete: All child processes finished.\n")?;
    Ok(report)
}

/// Child body: print identity, nothing else.
pub(crate) fn greet<P: ProcessApi, W: Write>(api: &P, out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "Child PID: {}, Parent PID: {} - Hello from child!",
        api.pid(),
        api.parent_pid()
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProcessError;
    use crate::fake::FakeProcess;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_spawn_three() {
        let mut api = FakeProcess::new();
        let mut out = Vec::new();

        let report = run(&mut api, 3, &mut out).unwrap();

        assert_eq!(report.created.len(), 3);
        assert_eq!(report.wait_count(), 3);
        assert_eq!(api.wait_any_calls, 3);
        assert!(api.wait_for_calls.is_empty());
        assert_eq!(api.unreaped(), 0);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Creating 3 child processes"));
        assert!(text.contains("All child processes finished"));
    }

    #[test]
    fn test_spawn_zero() {
        let mut api = FakeProcess::new();
        let report = run(&mut api, 0, &mut Vec::new()).unwrap();
        assert!(report.created.is_empty());
        assert_eq!(api.wait_any_calls, 0);
    }

    #[test]
    fn test_fork_failure_reaps_created_children() {
        let mut api = FakeProcess::new().failing_fork_at(2);

        let result = run(&mut api, 5, &mut Vec::new());

        assert!(matches!(result, Err(ProcessError::Fork(_))));
        assert_eq!(api.created.len(), 2);
        assert_eq!(api.unreaped(), 0);
        assert_eq!(api.wait_any_calls, 2);
    }

    #[test]
    fn test_greet() {
        let api = FakeProcess::new();
        let mut out = Vec::new();
        greet(&api, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Child PID: 500, Parent PID: 1 - Hello from child!\n"
        );
    }

    proptest! {
        #[test]
        fn prop_waits_equal_children(count in 0usize..64) {
            let mut api = FakeProcess::new();
            let report = run(&mut api, count, &mut io::sink()).unwrap();

            prop_assert_eq!(report.created.len(), count);
            prop_assert_eq!(api.wait_any_calls, count);

            let unique: HashSet<_> = report.reaped.iter().map(|exit| exit.pid).collect();
            prop_assert_eq!(unique.len(), count);
        }
    }
}
