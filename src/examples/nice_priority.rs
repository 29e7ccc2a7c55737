use anyhow::{Context, Result};
use procdemo::utils::measure_time;
use procdemo::{logging, prioritizer, InterruptWatcher, PriorityConfig, SystemProcess};
use std::io;

/// Process prioritization with nice values
///
/// Children with a higher nice value tend to finish later when they
/// compete for the same CPU. Pin the run to one core to make it obvious:
///
/// ```text
/// taskset -c 0 cargo run --bin nice_priority
/// ```
fn main() -> Result<()> {
    logging::init();
    let _watcher = InterruptWatcher::install()?;

    let mut api = SystemProcess::new();
    let config = PriorityConfig::default();

    let (report, elapsed) = measure_time(|| prioritizer::run(&mut api, &config, &mut io::stdout()));
    let report = report.context("prioritizer aborted")?;

    for outcome in &report.outcomes {
        println!(
            "nice {:>3}: PID {} reaped after {:.2?} ({})",
            outcome.offset,
            outcome.exit.pid,
            outcome.reaped_after,
            outcome.exit.describe()
        );
    }
    println!("Total: {:.2?}", elapsed);
    Ok(())
}
