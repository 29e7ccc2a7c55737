//! Recording stand-in for [`ProcessApi`] used by unit tests.
//!
//! `fork` always answers as the parent, so only the parent's sequencing
//! runs. Child bodies are tested by calling them directly.

use crate::errors::{ProcessError, ProcessResult};
use crate::process::{ChildExit, CommandSpec, Forked, ProcessApi};
use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

pub(crate) const FAKE_PID: i32 = 500;
pub(crate) const FAKE_PPID: i32 = 1;

#[derive(Debug)]
pub(crate) struct FakeProcess {
    next_pid: i32,
    /// Children still in the process table, oldest first
    unreaped: VecDeque<Pid>,
    pub created: Vec<Pid>,
    pub wait_any_calls: usize,
    pub wait_for_calls: Vec<Pid>,
    pub reaped: Vec<Pid>,
    pub exit_codes: HashMap<Pid, i32>,
    /// Fork number (0-based) that fails with EAGAIN
    pub fail_fork_at: Option<usize>,
    pub execs: Vec<CommandSpec>,
    pub exec_errno: Errno,
    pub nice_calls: Vec<i32>,
    pub nice_errno: Option<Errno>,
    pub niceness: i32,
    pub sleeps: Vec<Duration>,
}

impl FakeProcess {
    pub fn new() -> Self {
        Self {
            next_pid: 1000,
            unreaped: VecDeque::new(),
            created: Vec::new(),
            wait_any_calls: 0,
            wait_for_calls: Vec::new(),
            reaped: Vec::new(),
            exit_codes: HashMap::new(),
            fail_fork_at: None,
            execs: Vec::new(),
            exec_errno: Errno::ENOENT,
            nice_calls: Vec::new(),
            nice_errno: None,
            niceness: 0,
            sleeps: Vec::new(),
        }
    }

    pub fn failing_fork_at(mut self, index: usize) -> Self {
        self.fail_fork_at = Some(index);
        self
    }

    pub fn unreaped(&self) -> usize {
        self.unreaped.len()
    }

    fn exit_of(&self, pid: Pid) -> ChildExit {
        let code = self.exit_codes.get(&pid).copied().unwrap_or(0);
        ChildExit {
            pid,
            status: WaitStatus::Exited(pid, code),
        }
    }
}

impl ProcessApi for FakeProcess {
    fn fork(&mut self) -> ProcessResult<Forked> {
        if self.fail_fork_at == Some(self.created.len()) {
            return Err(ProcessError::Fork(Errno::EAGAIN));
        }
        let child = Pid::from_raw(self.next_pid);
        self.next_pid += 1;
        self.created.push(child);
        self.unreaped.push_back(child);
        Ok(Forked::Parent { child })
    }

    fn wait_any(&mut self) -> ProcessResult<ChildExit> {
        self.wait_any_calls += 1;
        let pid = self
            .unreaped
            .pop_front()
            .ok_or(ProcessError::Wait(Errno::ECHILD))?;
        self.reaped.push(pid);
        Ok(self.exit_of(pid))
    }

    fn wait_for(&mut self, pid: Pid) -> ProcessResult<ChildExit> {
        self.wait_for_calls.push(pid);
        let index = self
            .unreaped
            .iter()
            .position(|p| *p == pid)
            .ok_or(ProcessError::Wait(Errno::ECHILD))?;
        self.unreaped.remove(index);
        self.reaped.push(pid);
        Ok(self.exit_of(pid))
    }

    fn exec(&mut self, command: &CommandSpec) -> ProcessError {
        self.execs.push(command.clone());
        ProcessError::Exec {
            command: command.program().to_string(),
            source: self.exec_errno,
        }
    }

    fn adjust_priority(&mut self, offset: i32) -> ProcessResult<i32> {
        self.nice_calls.push(offset);
        if let Some(source) = self.nice_errno {
            return Err(ProcessError::Priority { offset, source });
        }
        self.niceness += offset;
        Ok(self.niceness)
    }

    fn terminate(&mut self, code: i32) -> ! {
        panic!("fake process terminated with code {code}")
    }

    fn pid(&self) -> Pid {
        Pid::from_raw(FAKE_PID)
    }

    fn parent_pid(&self) -> Pid {
        Pid::from_raw(FAKE_PPID)
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}
