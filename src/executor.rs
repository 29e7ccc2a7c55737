//! Fork one child per command; each child replaces its image with the
//! command via `execvp`.

use crate::errors::ProcessResult;
use crate::process::{reap_remaining, ChildExit, CommandSpec, Forked, ProcessApi};
use nix::unistd::Pid;
use std::collections::HashMap;
use std::io::Write;
use tracing::{error, warn};

/// Exit status used by a child whose image replacement failed
pub const EXEC_FAILURE_CODE: i32 = 1;

/// Outcome of one command
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub command: CommandSpec,
    pub exit: ChildExit,
}

#[derive(Debug, Clone, Default)]
pub struct ExecReport {
    /// In reap order
    pub outcomes: Vec<CommandOutcome>,
}

impl ExecReport {
    pub fn wait_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| !o.exit.success())
    }
}

/// Run every command in its own child, then wait once per child.
///
/// A command that fails to start only affects its own child; a fork
/// failure aborts the demonstration after reaping what was created.
pub fn run<P, W>(api: &mut P, commands: &[CommandSpec], out: &mut W) -> ProcessResult<ExecReport>
where
    P: ProcessApi,
    W: Write,
{
    writeln!(out, "\n--- Task 2: Command Execution by child processes ---")?;

    let mut children: HashMap<Pid, &CommandSpec> = HashMap::with_capacity(commands.len());
    for command in commands {
        out.flush()?;
        match api.fork() {
            Ok(Forked::Parent { child }) => {
                children.insert(child, command);
            }
            Ok(Forked::Child) => {
                let code = exec_child(api, command, out);
                api.terminate(code);
            }
            Err(e) => {
                error!(%e, %command, "fork failed, reaping created children");
                reap_remaining(api, children.len());
                return Err(e);
            }
        }
    }

    let mut report = ExecReport::default();
    for _ in 0..children.len() {
        let exit = api.wait_any()?;
        match children.get(&exit.pid) {
            Some(command) => {
                if !exit.success() {
                    warn!(%command, status = %exit.describe(), "command did not succeed");
                }
                report.outcomes.push(CommandOutcome {
                    command: (*command).clone(),
                    exit,
                });
            }
            None => warn!(pid = %exit.pid, "reaped a child that was not ours"),
        }
    }

    writeln!(out, "Task 2 complete: All commands executed.\n")?;
    Ok(report)
}

/// Child body. Returns only when `execvp` failed, with the exit code to use.
pub(crate) fn exec_child<P: ProcessApi, W: Write>(
    api: &mut P,
    command: &CommandSpec,
    out: &mut W,
) -> i32 {
    let _ = writeln!(
        out,
        "Child PID {} executing command: {}",
        api.pid(),
        command
    );
    let _ = out.flush();

    let err = api.exec(command);
    let _ = writeln!(out, "Execution failed: {}", err);
    let _ = out.flush();
    EXEC_FAILURE_CODE
}
