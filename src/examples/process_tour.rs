/// All five demonstrations in a row, the classic classroom run.
///
/// 1. N children announce themselves, reaped with wait()
/// 2. children exec `ls -l`, `date`, `ps aux`
/// 3. zombie/orphan demo (watch with `ps -el | grep defunct`)
/// 4. /proc inspection of a PID read from stdin
/// 5. CPU-bound children under nice 0, 5, 10, reaped with waitpid()
use anyhow::{Context, Result};
use procdemo::errors::ProcessResult;
use procdemo::{
    executor, lifecycle, logging, prioritizer, prompt_pid, spawner, DemoConfig, InterruptWatcher,
    ProcInspector, SystemProcess,
};
use std::io::{self, Write};
use tracing::error;

fn main() -> Result<()> {
    logging::init();
    let _watcher = InterruptWatcher::install().context("Ctrl+Cハンドラの設定に失敗")?;

    let config = DemoConfig::default();
    let mut api = SystemProcess::new();
    // StdoutLockは保持しない（割り込み時の通知が書けなくなる）
    let mut out = io::stdout();

    report("Task 1", spawner::run(&mut api, config.spawn_count, &mut out));

    if let Some(exec) = report("Task 2", executor::run(&mut api, &config.commands, &mut out)) {
        for failed in exec.failures() {
            writeln!(out, "Command '{}' {}", failed.command, failed.exit.describe())?;
        }
    }

    writeln!(
        out,
        "Running Task 3: zombie/orphan demo (run 'ps -el | grep defunct' in another terminal to observe)"
    )?;
    report("Task 3", lifecycle::run_staged(&mut api, &config.lifecycle, &mut out));

    let answer = prompt_pid(&mut io::stdin().lock(), &mut out).context("failed to read PID")?;
    match answer {
        Some(pid) => ProcInspector::new(&config.proc_root)
            .inspect(pid, &mut out)
            .context("failed to print inspection")?,
        None => writeln!(out, "Skipping Task 4")?,
    }

    if let Some(priority) = report("Task 5", prioritizer::run(&mut api, &config.priority, &mut out)) {
        for outcome in &priority.outcomes {
            writeln!(
                out,
                "PID {} (nice {}) reaped after {:.2?}: {}",
                outcome.exit.pid,
                outcome.offset,
                outcome.reaped_after,
                outcome.exit.describe()
            )?;
        }
    }

    Ok(())
}

/// A failed demonstration is reported; the next one still runs.
fn report<T>(task: &str, result: ProcessResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(task, %e, "demonstration aborted");
            eprintln!("{} aborted: {}", task, e);
            None
        }
    }
}
