use anyhow::{Context, Result};
use procdemo::{logging, spawner, DemoConfig, InterruptWatcher, SystemProcess};
use std::collections::HashSet;
use std::io;

/// Fork N children and reap them with the any-child wait
///
/// Each child prints its PID and parent PID and exits right away;
/// the parent performs exactly N blocking waits.
fn main() -> Result<()> {
    logging::init();
    let _watcher = InterruptWatcher::install()?;

    let count = DemoConfig::default().spawn_count;
    let mut api = SystemProcess::new();

    let report = spawner::run(&mut api, count, &mut io::stdout()).context("spawner aborted")?;

    let unique: HashSet<_> = report.reaped.iter().map(|exit| exit.pid).collect();
    println!(
        "Parent: created {}, waited {} times, {} distinct children reaped",
        report.created.len(),
        report.wait_count(),
        unique.len()
    );
    Ok(())
}
