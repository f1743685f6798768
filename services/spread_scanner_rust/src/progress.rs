//! Live progress line on stderr while the fetch phase runs.

use crate::presentation::progress_line;
use gapcex_rust_core::FetchProgress;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const CLEAR_WIDTH: usize = 80;

pub struct ProgressReporter {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl ProgressReporter {
    /// Redraw the progress line every `interval` until [`finish`](Self::finish)
    pub fn spawn(progress: Arc<FetchProgress>, interval: Duration, started: Instant) -> Self {
        let (stop, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let line = progress_line(&progress.snapshot(), started.elapsed().as_secs_f64());
                        let mut stderr = std::io::stderr().lock();
                        let _ = write!(stderr, "\r{}", line);
                        let _ = stderr.flush();
                    }
                    _ = &mut stop_rx => break,
                }
            }
        });

        Self {
            stop: Some(stop),
            handle,
        }
    }

    /// Stop redrawing and clear the line
    pub async fn finish(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        let _ = self.handle.await;

        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}\r", " ".repeat(CLEAR_WIDTH));
        let _ = stderr.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finish_stops_the_reporter() {
        let progress = Arc::new(FetchProgress::new());
        let reporter = ProgressReporter::spawn(progress, Duration::from_millis(5), Instant::now());

        tokio::time::sleep(Duration::from_millis(20)).await;
        tokio::time::timeout(Duration::from_secs(1), reporter.finish())
            .await
            .unwrap();
    }
}
