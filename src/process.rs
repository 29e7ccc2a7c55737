//! Narrow interface over the OS process primitives
//!
//! Every demonstration talks to the process table only through
//! [`ProcessApi`]. [`SystemProcess`] is the real thing built on `nix`;
//! unit tests substitute a recording fake so the sequencing logic can be
//! checked without creating processes.

use crate::errors::{ProcessError, ProcessResult};
use crate::utils::to_cstring;
use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{wait, waitpid, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};
use std::ffi::CString;
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;
use tracing::{debug, warn};

/// Program name followed by its arguments
///
/// Always holds at least a non-empty program name and never an
/// interior NUL byte, so it can be handed to `execvp` as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
}

impl CommandSpec {
    /// Build a command from its argv
    ///
    /// # Example
    ///
    /// ```
    /// use procdemo::process::CommandSpec;
    ///
    /// let cmd = CommandSpec::new(["ls", "-l"]).unwrap();
    /// assert_eq!(cmd.program(), "ls");
    /// assert_eq!(cmd.to_string(), "ls -l");
    /// ```
    pub fn new<I, S>(argv: I) -> ProcessResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();

        match argv.first() {
            None => return Err(ProcessError::InvalidInput("Command cannot be empty".into())),
            Some(program) if program.is_empty() => {
                return Err(ProcessError::InvalidInput(
                    "Program name cannot be empty".into(),
                ))
            }
            Some(_) => {}
        }

        if argv.iter().any(|arg| arg.contains('\0')) {
            return Err(ProcessError::InvalidInput(
                "Command contains a null byte".into(),
            ));
        }

        Ok(Self { argv })
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    fn to_cstrings(&self) -> ProcessResult<Vec<CString>> {
        self.argv.iter().map(|arg| to_cstring(arg)).collect()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

/// Which side of a fork the caller is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forked {
    Parent { child: Pid },
    Child,
}

/// A reaped child: its identifier and how it terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    pub pid: Pid,
    pub status: WaitStatus,
}

impl ChildExit {
    fn from_status(status: WaitStatus) -> ProcessResult<Self> {
        status
            .pid()
            .map(|pid| Self { pid, status })
            .ok_or_else(|| ProcessError::InvalidInput(format!("wait reported no child: {:?}", status)))
    }

    /// Exit code, if the child exited normally
    pub fn code(&self) -> Option<i32> {
        match self.status {
            WaitStatus::Exited(_, code) => Some(code),
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        self.code() == Some(0)
    }

    /// One-line description for narration
    pub fn describe(&self) -> String {
        match self.status {
            WaitStatus::Exited(_, code) => format!("exited with code {}", code),
            WaitStatus::Signaled(_, sig, core_dumped) => {
                if core_dumped {
                    format!("killed by signal {:?} (core dumped)", sig)
                } else {
                    format!("killed by signal {:?}", sig)
                }
            }
            other => format!("ended with status {:?}", other),
        }
    }
}

/// The OS process primitives the demonstrations rely on
pub trait ProcessApi {
    /// Duplicate the calling process
    fn fork(&mut self) -> ProcessResult<Forked>;

    /// Block until any child terminates
    fn wait_any(&mut self) -> ProcessResult<ChildExit>;

    /// Block until the given child terminates
    fn wait_for(&mut self, pid: Pid) -> ProcessResult<ChildExit>;

    /// Replace the process image, searching `PATH` for the program.
    /// Only returns when the replacement failed.
    fn exec(&mut self, command: &CommandSpec) -> ProcessError;

    /// Apply a relative niceness offset, returning the new niceness
    fn adjust_priority(&mut self, offset: i32) -> ProcessResult<i32>;

    /// Exit immediately, skipping destructors and exit handlers
    fn terminate(&mut self, code: i32) -> !;

    fn pid(&self) -> Pid;

    fn parent_pid(&self) -> Pid;

    fn sleep(&mut self, duration: Duration);
}

/// [`ProcessApi`] backed by the real kernel
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcess;

impl SystemProcess {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessApi for SystemProcess {
    fn fork(&mut self) -> ProcessResult<Forked> {
        // バッファを空にしてからfork（子に未出力データを複製しない）
        io::stdout().flush()?;

        match unsafe { unistd::fork() }.map_err(ProcessError::Fork)? {
            ForkResult::Parent { child } => {
                debug!(%child, "forked child");
                Ok(Forked::Parent { child })
            }
            ForkResult::Child => {
                restore_default_signals();
                Ok(Forked::Child)
            }
        }
    }

    fn wait_any(&mut self) -> ProcessResult<ChildExit> {
        let status = wait().map_err(ProcessError::Wait)?;
        let reaped = ChildExit::from_status(status)?;
        debug!(pid = %reaped.pid, status = ?reaped.status, "reaped child");
        Ok(reaped)
    }

    fn wait_for(&mut self, pid: Pid) -> ProcessResult<ChildExit> {
        let status = waitpid(pid, None).map_err(ProcessError::Wait)?;
        debug!(%pid, ?status, "reaped child");
        Ok(ChildExit { pid, status })
    }

    fn exec(&mut self, command: &CommandSpec) -> ProcessError {
        let argv = match command.to_cstrings() {
            Ok(argv) => argv,
            Err(e) => return e,
        };

        debug!(%command, "replacing process image");
        match unistd::execvp(&argv[0], &argv) {
            Ok(never) => match never {},
            Err(source) => {
                warn!(%command, %source, "exec failed");
                ProcessError::Exec {
                    command: command.program().to_string(),
                    source,
                }
            }
        }
    }

    fn adjust_priority(&mut self, offset: i32) -> ProcessResult<i32> {
        // nice()は正常時にも-1を返しうるのでerrnoで判定する
        let niceness = unsafe {
            Errno::clear();
            libc::nice(offset)
        };
        if niceness == -1 {
            let errno = Errno::last();
            if errno != Errno::UnknownErrno {
                return Err(ProcessError::Priority {
                    offset,
                    source: errno,
                });
            }
        }
        debug!(offset, niceness, "adjusted priority");
        Ok(niceness)
    }

    fn terminate(&mut self, code: i32) -> ! {
        let _ = io::stdout().flush();
        unsafe { libc::_exit(code) }
    }

    fn pid(&self) -> Pid {
        unistd::getpid()
    }

    fn parent_pid(&self) -> Pid {
        unistd::getppid()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Signals a child resets to their default action.
///
/// SIGINT/SIGTERM belong to the parent's interrupt watcher. SIGPIPE is
/// ignored by the Rust runtime and an ignored disposition survives `execvp`.
pub(crate) const CHILD_DEFAULT_SIGNALS: [Signal; 3] =
    [Signal::SIGINT, Signal::SIGTERM, Signal::SIGPIPE];

fn restore_default_signals() {
    for sig in CHILD_DEFAULT_SIGNALS {
        if let Err(e) = unsafe { signal(sig, SigHandler::SigDfl) } {
            warn!(?sig, %e, "failed to restore default disposition");
        }
    }
}

/// Reap `outstanding` children with the any-child wait.
///
/// Used on the error path so a failed fork never leaves zombies behind.
pub(crate) fn reap_remaining<P: ProcessApi>(api: &mut P, outstanding: usize) -> Vec<ChildExit> {
    let mut reaped = Vec::with_capacity(outstanding);
    for _ in 0..outstanding {
        match api.wait_any() {
            Ok(exit) => reaped.push(exit),
            Err(e) => {
                warn!(%e, "stopped reaping early");
                break;
            }
        }
    }
    reaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_validation() {
        assert!(CommandSpec::new(Vec::<String>::new()).is_err());
        assert!(CommandSpec::new([""]).is_err());
        assert!(CommandSpec::new(["echo", "a\0b"]).is_err());

        let cmd = CommandSpec::new(["ps", "aux"]).unwrap();
        assert_eq!(cmd.program(), "ps");
        assert_eq!(cmd.args(), ["aux".to_string()]);
        assert_eq!(cmd.argv().len(), 2);
        assert_eq!(cmd.to_string(), "ps aux");
    }

    #[test]
    fn test_command_spec_cstrings() {
        let cmd = CommandSpec::new(["echo", "hi"]).unwrap();
        let argv = cmd.to_cstrings().unwrap();
        assert_eq!(argv[0].to_str().unwrap(), "echo");
        assert_eq!(argv[1].to_str().unwrap(), "hi");
    }

    #[test]
    fn test_child_resets_pipe_and_interrupt_signals() {
        assert!(CHILD_DEFAULT_SIGNALS.contains(&Signal::SIGPIPE));
        assert!(CHILD_DEFAULT_SIGNALS.contains(&Signal::SIGINT));
        assert!(CHILD_DEFAULT_SIGNALS.contains(&Signal::SIGTERM));
    }

    #[test]
    fn test_child_exit_describe() {
        let pid = Pid::from_raw(77);

        let ok = ChildExit::from_status(WaitStatus::Exited(pid, 0)).unwrap();
        assert!(ok.success());
        assert_eq!(ok.describe(), "exited with code 0");

        let failed = ChildExit::from_status(WaitStatus::Exited(pid, 1)).unwrap();
        assert!(!failed.success());
        assert_eq!(failed.code(), Some(1));

        let killed = ChildExit::from_status(WaitStatus::Signaled(pid, Signal::SIGKILL, false)).unwrap();
        assert_eq!(killed.code(), None);
        assert_eq!(killed.describe(), "killed by signal SIGKILL");

        assert!(ChildExit::from_status(WaitStatus::StillAlive).is_err());
    }
}
