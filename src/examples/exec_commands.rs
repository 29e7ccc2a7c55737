use anyhow::{Context, Result};
use procdemo::{executor, logging, CommandSpec, DemoConfig, InterruptWatcher, SystemProcess};
use std::io;

/// Fork-exec example
///
/// Runs the default commands plus one that cannot be found, to show
/// that a failed exec only takes down its own child.
fn main() -> Result<()> {
    logging::init();
    let _watcher = InterruptWatcher::install()?;

    let mut commands = DemoConfig::default().commands;
    commands.push(CommandSpec::new(["definitely-not-a-command"])?);

    let mut api = SystemProcess::new();
    let report = executor::run(&mut api, &commands, &mut io::stdout()).context("executor aborted")?;

    for outcome in &report.outcomes {
        println!(
            "Parent: '{}' (PID {}) {}",
            outcome.command,
            outcome.exit.pid,
            outcome.exit.describe()
        );
    }
    Ok(())
}
