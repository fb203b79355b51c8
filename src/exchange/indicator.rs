//! Busy indicator shown while an exchange prepares its prompt files.
//!
//! The indicator covers prompt composition and writing only. It is always
//! stopped before operator instructions are printed or an error surfaces.

use std::io::Write;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Start/stop signals around a long-running step.
#[allow(async_fn_in_trait)]
pub trait StatusIndicator {
    type Handle;

    fn start(&self, message: &str) -> Self::Handle;

    /// Stop the indicator. Resolves once it has released the terminal.
    async fn stop(&self, handle: Self::Handle);
}

/// Animated spinner drawn on stderr by a background tokio task.
#[derive(Debug, Default, Clone, Copy)]
pub struct Spinner;

pub struct SpinnerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl StatusIndicator for Spinner {
    type Handle = SpinnerHandle;

    fn start(&self, message: &str) -> SpinnerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let message = message.to_string();

        let task = tokio::spawn(async move {
            let mut stderr = std::io::stderr();
            for frame in FRAMES.iter().cycle() {
                let _ = write!(stderr, "\r{frame} {message}");
                let _ = stderr.flush();
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(FRAME_INTERVAL) => {}
                }
            }
            // Clear the spinner line.
            let _ = write!(stderr, "\r\x1b[2K");
            let _ = stderr.flush();
        });

        SpinnerHandle { cancel, task }
    }

    async fn stop(&self, handle: SpinnerHandle) {
        handle.cancel.cancel();
        if let Err(e) = handle.task.await {
            tracing::debug!("Spinner task ended abnormally: {e}");
        }
    }
}

/// Non-animated indicator that only logs. Used when stderr is not a terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogIndicator;

impl StatusIndicator for LogIndicator {
    type Handle = String;

    fn start(&self, message: &str) -> String {
        tracing::info!("{message}");
        message.to_string()
    }

    async fn stop(&self, handle: String) {
        tracing::debug!(step = %handle, "Step finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spinner_stops_promptly() {
        let spinner = Spinner;
        let handle = spinner.start("Working...");
        tokio::time::sleep(Duration::from_millis(20)).await;

        let stopped = tokio::time::timeout(Duration::from_secs(2), spinner.stop(handle)).await;
        assert!(stopped.is_ok(), "spinner should stop after cancellation");
    }

    #[tokio::test]
    async fn log_indicator_round_trips_message() {
        let handle = LogIndicator.start("Preparing research...");
        assert_eq!(handle, "Preparing research...");
        LogIndicator.stop(handle).await;
    }
}
