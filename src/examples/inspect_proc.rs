use anyhow::{Context, Result};
use procdemo::{logging, prompt_pid, InterruptWatcher, ProcInspector};
use std::io;

/// Inspect /proc/<pid>: status, executable and open descriptors
///
/// Enter your shell's PID (`echo $$`) or press Enter to skip.
fn main() -> Result<()> {
    logging::init();
    let _watcher = InterruptWatcher::install()?;

    let mut out = io::stdout();
    let pid = prompt_pid(&mut io::stdin().lock(), &mut out).context("failed to read PID")?;

    match pid {
        Some(pid) => ProcInspector::default().inspect(pid, &mut out)?,
        None => println!("Skipping inspection"),
    }
    Ok(())
}
