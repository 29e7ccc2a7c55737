//! Read process metadata from the proc filesystem
//!
//! Three independent reads per process: the `status` record, the `exe`
//! link and the `fd/` directory. Each can fail on its own (process gone,
//! permission denied) and is reported on its own.

use crate::errors::{ProcessError, ProcessResult};
use nix::unistd::Pid;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Parse user input as a process identifier.
///
/// Only trimmed, all-digit input is accepted; anything else means
/// "skip the inspection".
pub fn parse_pid(input: &str) -> Option<Pid> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i32>().ok().map(Pid::from_raw)
}

/// Ask for a pid on `out`, read one line from `input`.
///
/// `Ok(None)` when the answer is empty or not numeric.
pub fn prompt_pid<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<Option<Pid>> {
    write!(out, "\nEnter a PID to inspect from /proc (or press Enter to skip): ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(parse_pid(&line))
}

/// Verbatim copy of `/proc/<pid>/status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    raw: String,
}

impl StatusSnapshot {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Value of a `Key:\tvalue` line, trimmed
    pub fn field(&self, key: &str) -> Option<&str> {
        self.raw.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k == key).then(|| v.trim())
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.field("Name")
    }

    /// e.g. `R (running)`, `S (sleeping)`, `Z (zombie)`
    pub fn state(&self) -> Option<&str> {
        self.field("State")
    }

    /// Single-letter state code
    pub fn state_code(&self) -> Option<char> {
        self.state().and_then(|s| s.chars().next())
    }

    pub fn parent_pid(&self) -> Option<Pid> {
        self.field("PPid")?.parse().ok().map(Pid::from_raw)
    }
}

/// One open descriptor and what it points at
#[derive(Debug)]
pub struct FdEntry {
    pub fd: u32,
    pub target: ProcessResult<PathBuf>,
}

/// Reader bound to a proc mount point
#[derive(Debug, Clone)]
pub struct ProcInspector {
    root: PathBuf,
}

impl Default for ProcInspector {
    fn default() -> Self {
        Self::new("/proc")
    }
}

impl ProcInspector {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn process_dir(&self, pid: Pid) -> PathBuf {
        self.root.join(pid.to_string())
    }

    /// Read the status record
    pub fn read_status(&self, pid: Pid) -> ProcessResult<StatusSnapshot> {
        let path = self.process_dir(pid).join("status");
        let raw = fs::read_to_string(&path).map_err(|e| ProcessError::from_io(e, pid, "status"))?;
        Ok(StatusSnapshot::new(raw))
    }

    /// Resolve the executable link
    ///
    /// A dangling link on a live process (kernel threads have none) is
    /// `ExecutableUnreadable`, not `ProcessNotFound`.
    pub fn executable(&self, pid: Pid) -> ProcessResult<PathBuf> {
        let dir = self.process_dir(pid);
        fs::read_link(dir.join("exe")).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound && dir.is_dir() {
                ProcessError::ExecutableUnreadable { pid, source: e }
            } else {
                ProcessError::from_io(e, pid, "exe link")
            }
        })
    }

    /// Enumerate open descriptors, sorted by number.
    ///
    /// Failing to resolve a single descriptor is recorded in its entry;
    /// only an unreadable directory fails the whole call. An error while
    /// walking the directory keeps what was listed so far.
    pub fn descriptors(&self, pid: Pid) -> ProcessResult<Vec<FdEntry>> {
        let dir = self.process_dir(pid).join("fd");
        let entries = fs::read_dir(&dir).map_err(|e| ProcessError::from_io(e, pid, "fd directory"))?;

        let mut fds = collect_descriptors(
            pid,
            entries.map(|entry| entry.map(|e| (e.file_name(), e.path()))),
        );
        fds.sort_by_key(|entry| entry.fd);
        Ok(fds)
    }

    /// Print everything, isolating failures per step.
    ///
    /// A missing or unreadable status record stops the inspection; the
    /// other steps report and carry on.
    pub fn inspect<W: Write>(&self, pid: Pid, out: &mut W) -> io::Result<()> {
        let proc_dir = self.process_dir(pid);
        writeln!(out, "\n--- Task 4: Inspecting {} ---", proc_dir.display())?;

        match self.read_status(pid) {
            Ok(status) => {
                writeln!(out, "Process Status:")?;
                writeln!(out, "{}", status.raw())?;
            }
            Err(e) => {
                warn!(%pid, %e, "status unreadable");
                writeln!(out, "Error reading {}/status: {}", proc_dir.display(), e)?;
                return Ok(());
            }
        }

        match self.executable(pid) {
            Ok(exe) => writeln!(out, "\nExecutable Path:\n{}", exe.display())?,
            Err(e) => {
                warn!(%pid, %e, "exe link unreadable");
                writeln!(out, "Error reading {}/exe: {}", proc_dir.display(), e)?;
            }
        }

        match self.descriptors(pid) {
            Ok(fds) => {
                writeln!(out, "\nOpen File Descriptors:")?;
                for entry in fds {
                    match entry.target {
                        Ok(target) => writeln!(out, "FD {}: {}", entry.fd, target.display())?,
                        Err(e) => {
                            debug!(%pid, fd = entry.fd, %e, "fd unreadable");
                            writeln!(out, "FD {}: Permission denied or error", entry.fd)?;
                        }
                    }
                }
            }
            Err(e) => {
                warn!(%pid, %e, "fd directory unreadable");
                writeln!(out, "Error reading {}/fd: {}", proc_dir.display(), e)?;
            }
        }

        out.flush()
    }
}

/// Resolve `(name, path)` pairs from an fd directory listing.
///
/// Stops at the first listing error and returns the entries gathered
/// before it.
fn collect_descriptors<I>(pid: Pid, entries: I) -> Vec<FdEntry>
where
    I: IntoIterator<Item = io::Result<(OsString, PathBuf)>>,
{
    let mut fds = Vec::new();
    for entry in entries {
        let (name, path) = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%pid, %e, "fd listing interrupted");
                break;
            }
        };
        let Some(fd) = name.to_str().and_then(|n| n.parse::<u32>().ok()) else {
            debug!(?name, "skipping non-numeric fd entry");
            continue;
        };
        let target = fs::read_link(&path)
            .map_err(|e| ProcessError::from_io(e, pid, &format!("fd {}", fd)));
        fds.push(FdEntry { fd, target });
    }
    fds
}
