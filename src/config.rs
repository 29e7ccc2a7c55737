//! Tunables for the demonstrations
//!
//! There are no flags and no config file; the defaults reproduce the
//! classic classroom run and tests shrink them through the setters.

use crate::process::CommandSpec;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the zombie/orphan demonstration
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// How long the child stays alive
    pub child_sleep: Duration,
    /// How long the parent lingers before exiting without reaping
    pub parent_sleep: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            child_sleep: Duration::from_secs(10),
            parent_sleep: Duration::from_secs(5),
        }
    }
}

impl LifecycleConfig {
    pub fn child_sleep(mut self, duration: Duration) -> Self {
        self.child_sleep = duration;
        self
    }

    pub fn parent_sleep(mut self, duration: Duration) -> Self {
        self.parent_sleep = duration;
        self
    }
}

/// Configuration for the nice-value demonstration
#[derive(Debug, Clone)]
pub struct PriorityConfig {
    /// One child per offset, in creation order
    pub offsets: Vec<i32>,
    /// Upper bound of the CPU-bound counting loop
    pub count_to: u64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            offsets: vec![0, 5, 10],
            count_to: 10_u64.pow(7),
        }
    }
}

impl PriorityConfig {
    pub fn offsets(mut self, offsets: impl Into<Vec<i32>>) -> Self {
        self.offsets = offsets.into();
        self
    }

    pub fn count_to(mut self, bound: u64) -> Self {
        self.count_to = bound;
        self
    }
}

/// Everything the full tour needs
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Number of children the spawner creates
    pub spawn_count: usize,
    /// Commands the executor runs, one child each
    pub commands: Vec<CommandSpec>,
    pub lifecycle: LifecycleConfig,
    pub priority: PriorityConfig,
    /// Mount point of the proc filesystem
    pub proc_root: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            spawn_count: 3,
            commands: default_commands(),
            lifecycle: LifecycleConfig::default(),
            priority: PriorityConfig::default(),
            proc_root: PathBuf::from("/proc"),
        }
    }
}

fn default_commands() -> Vec<CommandSpec> {
    // Literal argv lists, construction cannot fail
    [&["ls", "-l"][..], &["date"][..], &["ps", "aux"][..]]
        .iter()
        .filter_map(|argv| CommandSpec::new(argv.iter().copied()).ok())
        .collect()
}
