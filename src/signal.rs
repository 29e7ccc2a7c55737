//! Interrupt handling for the demo binaries

use crate::errors::{ProcessError, ProcessResult};
use signal_hook::consts::signal::*;
use signal_hook::iterator::{Handle, Signals};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::warn;

/// Exit status after an interrupt (128 + SIGINT)
pub const INTERRUPT_EXIT_CODE: i32 = 130;

pub const INTERRUPT_NOTICE: &str = "Script interrupted. Exiting.";

/// Signal types the watcher can listen for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// Interrupt signal (Ctrl+C)
    Interrupt,
    /// Termination signal
    Terminate,
    /// User-defined signal 1
    User1,
}

impl SignalType {
    /// Convert to signal constant
    fn to_signal(self) -> i32 {
        match self {
            Self::Interrupt => SIGINT,
            Self::Terminate => SIGTERM,
            Self::User1 => SIGUSR1,
        }
    }

    /// Create from signal number
    fn from_signal(sig: i32) -> Option<Self> {
        match sig {
            SIGINT => Some(Self::Interrupt),
            SIGTERM => Some(Self::Terminate),
            SIGUSR1 => Some(Self::User1),
            _ => None,
        }
    }
}

/// What to do once a watched signal arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnInterrupt {
    /// Print the notice and exit with [`INTERRUPT_EXIT_CODE`]
    Exit,
    /// Only raise the flag; the owner polls [`InterruptWatcher::is_interrupted`]
    Record,
}

/// Background thread turning signals into a graceful stop
pub struct InterruptWatcher {
    interrupted: Arc<AtomicBool>,
    handle: Handle,
    thread: Option<thread::JoinHandle<()>>,
}

impl InterruptWatcher {
    /// Start watching `signals`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use procdemo::signal::{InterruptWatcher, OnInterrupt, SignalType};
    ///
    /// let watcher = InterruptWatcher::new(
    ///     &[SignalType::Interrupt, SignalType::Terminate],
    ///     OnInterrupt::Exit,
    /// ).expect("Failed to install interrupt watcher");
    /// assert!(!watcher.is_interrupted());
    /// ```
    pub fn new(signals: &[SignalType], on_interrupt: OnInterrupt) -> ProcessResult<Self> {
        let interrupted = Arc::new(AtomicBool::new(false));
        let flag = interrupted.clone();

        let signal_nums: Vec<i32> = signals.iter().map(|s| s.to_signal()).collect();
        let mut sig_iter =
            Signals::new(&signal_nums).map_err(|e| ProcessError::SignalError(e.to_string()))?;
        let handle = sig_iter.handle();

        let thread = thread::spawn(move || {
            // handle.close()でforever()が終了する
            for sig in sig_iter.forever() {
                let Some(signal_type) = SignalType::from_signal(sig) else {
                    continue;
                };
                warn!(?signal_type, "received signal");
                flag.store(true, Ordering::SeqCst);

                if on_interrupt == OnInterrupt::Exit {
                    let mut stdout = std::io::stdout();
                    let _ = writeln!(stdout, "\n{}", INTERRUPT_NOTICE);
                    let _ = stdout.flush();
                    std::process::exit(INTERRUPT_EXIT_CODE);
                }
            }
        });

        Ok(Self {
            interrupted,
            handle,
            thread: Some(thread),
        })
    }

    /// Watch Ctrl+C and SIGTERM, exiting on delivery
    pub fn install() -> ProcessResult<Self> {
        Self::new(&[SignalType::Interrupt, SignalType::Terminate], OnInterrupt::Exit)
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl Drop for InterruptWatcher {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
