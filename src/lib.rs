//! Operating-system process primitives, demonstrated
//!
//! Five independent demonstrations built on `fork`, `execvp`, `wait`,
//! `waitpid`, `nice` and the proc filesystem: spawning children, running
//! commands in them, zombie and orphan states, metadata inspection and
//! scheduling priority.

pub mod config;
pub mod errors;
pub mod executor;
pub mod inspector;
pub mod lifecycle;
pub mod logging;
pub mod prioritizer;
pub mod process;
pub mod signal;
pub mod spawner;
pub mod utils;

#[cfg(test)]
mod fake;

// Re-export commonly used types
pub use config::{DemoConfig, LifecycleConfig, PriorityConfig};
pub use errors::{ProcessError, ProcessResult};
pub use inspector::{parse_pid, prompt_pid, ProcInspector, StatusSnapshot};
pub use process::{ChildExit, CommandSpec, Forked, ProcessApi, SystemProcess};
pub use signal::InterruptWatcher;
