//! CPU-bound children under different nice values
//!
//! Unlike the spawner, the parent reaps by identifier: it collects every
//! pid first and then waits for each one specifically, so each exit
//! status is attributed to exactly the child that produced it.

use crate::config::PriorityConfig;
use crate::errors::ProcessResult;
use crate::process::{reap_remaining, ChildExit, Forked, ProcessApi};
use crate::utils::count_to;
use nix::unistd::Pid;
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Exit status of a child that could not apply its offset
pub const NICE_FAILURE_CODE: i32 = 1;

/// A reaped child together with the offset it ran under
#[derive(Debug, Clone)]
pub struct PriorityOutcome {
    pub offset: i32,
    pub exit: ChildExit,
    /// Time from the start of the demonstration until this child was reaped
    pub reaped_after: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct PriorityReport {
    /// In creation order, same as the offsets
    pub outcomes: Vec<PriorityOutcome>,
}

/// Fork one CPU-bound child per offset and reap each by pid.
pub fn run<P, W>(api: &mut P, config: &PriorityConfig, out: &mut W) -> ProcessResult<PriorityReport>
where
    P: ProcessApi,
    W: Write,
{
    writeln!(out, "\n--- Task 5: Process Prioritization using nice values ---")?;
    let started = Instant::now();

    let mut children: Vec<(Pid, i32)> = Vec::with_capacity(config.offsets.len());
    for &offset in &config.offsets {
        out.flush()?;
        match api.fork() {
            Ok(Forked::Parent { child }) => children.push((child, offset)),
            Ok(Forked::Child) => {
                let code = prioritized_child(api, offset, config.count_to, out);
                api.terminate(code);
            }
            Err(e) => {
                error!(%e, offset, "fork failed, reaping created children");
                reap_remaining(api, children.len());
                return Err(e);
            }
        }
    }

    let mut report = PriorityReport::default();
    for (pid, offset) in children {
        let exit = api.wait_for(pid)?;
        let reaped_after = started.elapsed();
        info!(%pid, offset, ?reaped_after, status = %exit.describe(), "prioritized child reaped");
        report.outcomes.push(PriorityOutcome {
            offset,
            exit,
            reaped_after,
        });
    }

    writeln!(out, "Task 5 complete: All prioritized processes finished.\n")?;
    Ok(report)
}

/// Child body: lower own priority, burn CPU, report.
pub(crate) fn prioritized_child<P: ProcessApi, W: Write>(
    api: &mut P,
    offset: i32,
    bound: u64,
    out: &mut W,
) -> i32 {
    if let Err(e) = api.adjust_priority(offset) {
        warn!(offset, %e, "nice failed");
        let _ = writeln!(out, "Child PID {} could not apply nice value {}: {}", api.pid(), offset, e);
        let _ = out.flush();
        return NICE_FAILURE_CODE;
    }

    let _ = writeln!(out, "Child PID {} started with nice value {}", api.pid(), offset);
    let _ = out.flush();

    count_to(bound);

    let _ = writeln!(out, "PID {} finished counting.", api.pid());
    let _ = out.flush();
    0
}
