use anyhow::{Context, Result};
use procdemo::{lifecycle, logging, InterruptWatcher, LifecycleConfig, SystemProcess};
use std::io;

/// Zombie and orphan demonstration
///
/// This process is the demo parent: it never reaps its child and exits
/// after 5 seconds while the child keeps running for 10. Meanwhile, in
/// another terminal:
///
/// ```text
/// ps -el | grep defunct      # zombies
/// ps -o pid,ppid,stat,cmd    # the child's PPID changes after we exit
/// ```
fn main() -> Result<()> {
    logging::init();
    let _watcher = InterruptWatcher::install()?;

    println!("Running zombie/orphan demo (run 'ps -el | grep defunct' in another terminal to observe)");

    let mut api = SystemProcess::new();
    match lifecycle::run(&mut api, &LifecycleConfig::default(), &mut io::stdout())
        .context("lifecycle demo could not fork")?
    {}
}
