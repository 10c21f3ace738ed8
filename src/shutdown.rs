//! Cancellation signal for the serve loop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Idempotent.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Trip `shutdown` on the first Ctrl+C.
///
/// Runs a current-thread tokio runtime on a dedicated thread so the blocking
/// client loop stays on the main thread.
pub fn watch_ctrl_c(shutdown: Shutdown) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("signal".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Received Ctrl+C, shutting down...");
                        shutdown.trigger();
                    }
                    Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
                }
            });
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_is_shared() {
        let shutdown = Shutdown::new();
        let observer = shutdown.clone();
        assert!(!observer.is_triggered());

        shutdown.trigger();
        assert!(observer.is_triggered());

        shutdown.trigger();
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn test_trigger_across_threads() {
        let shutdown = Shutdown::new();
        let remote = shutdown.clone();
        thread::spawn(move || remote.trigger()).join().unwrap();
        assert!(shutdown.is_triggered());
    }
}
