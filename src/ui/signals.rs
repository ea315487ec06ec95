use crate::error::{CertSplitError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cooperative Ctrl+C handling. The first interrupt lets the current stage finish and
/// stops before the next one; the second exits immediately.
#[derive(Clone)]
pub struct GracefulShutdown {
    interrupts: Arc<AtomicUsize>,
}

impl GracefulShutdown {
    /// Install the process-wide Ctrl+C handler. `ctrlc` accepts one handler per process.
    pub fn new() -> Result<Self> {
        let shutdown = Self::detached();
        let interrupts = Arc::clone(&shutdown.interrupts);

        ctrlc::set_handler(move || {
            if interrupts.fetch_add(1, Ordering::SeqCst) == 0 {
                eprintln!("\n🛑 Stopping after the current stage (Ctrl+C again to abort now)");
            } else {
                eprintln!("\nAborted.");
                std::process::exit(130);
            }
        })
        .map_err(|e| CertSplitError::Config {
            message: format!("Cannot install Ctrl+C handler: {}", e),
        })?;

        Ok(shutdown)
    }

    /// A flag nobody signals except [`GracefulShutdown::request_shutdown`].
    pub fn detached() -> Self {
        Self {
            interrupts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.interrupts.load(Ordering::SeqCst) == 0
    }

    pub fn request_shutdown(&self) {
        self.interrupts.fetch_add(1, Ordering::SeqCst);
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(CertSplitError::Cancelled)
        }
    }

    /// Start `stage` only if no stop was requested.
    pub fn with_shutdown_check<F, R>(&self, stage: F) -> Result<R>
    where
        F: FnOnce() -> Result<R>,
    {
        self.check_shutdown().and_then(|()| stage())
    }
}
