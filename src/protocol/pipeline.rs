//! Error-stream pipeline: span accumulation, status extraction, dispatch.
//!
//! One `ControlPipeline` instance owns all the per-stream state (scanner
//! mode, control buffer, diagnostic context) for a single supervised stderr
//! stream. It is driven chunk-by-chunk by the stderr drain task and never
//! shared across tasks.

use std::sync::Arc;

use crate::display;
use crate::protocol::scanner::{ScanEvent, TagScanner};
use crate::protocol::status::parse_status;
use crate::protocol::StatusUpdate;
use crate::report::Reporter;

/// Counters describing one drained error stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrainStats {
    /// Control spans closed, whether or not they carried a message.
    pub control_spans: usize,
    /// Status reports delivered to the endpoint.
    pub reports: usize,
    /// Control spans that failed to decode.
    pub parse_failures: usize,
    /// Reports the endpoint did not accept.
    pub dispatch_failures: usize,
    /// Diagnostic bytes accumulated over the stream lifetime.
    pub diagnostic_bytes: usize,
}

/// Scanner-to-dispatcher wiring for one error stream.
pub struct ControlPipeline {
    scanner: TagScanner,
    diagnostics: Vec<u8>,
    reporter: Arc<dyn Reporter>,
    echo_diagnostics: bool,
    stats: DrainStats,
}

impl ControlPipeline {
    #[must_use]
    pub fn new(reporter: Arc<dyn Reporter>, echo_diagnostics: bool) -> Self {
        Self {
            scanner: TagScanner::new(),
            diagnostics: Vec::new(),
            reporter,
            echo_diagnostics,
            stats: DrainStats::default(),
        }
    }

    /// Feed one chunk of raw stderr bytes through the pipeline.
    pub async fn handle_chunk(&mut self, chunk: &[u8]) {
        for event in self.scanner.feed(chunk) {
            self.handle_event(event).await;
        }
    }

    /// Flush end-of-stream state and return the final counters.
    pub async fn finish(mut self) -> DrainStats {
        if self.scanner.is_in_control_span() {
            tracing::warn!("Child stream ended inside an unterminated control span");
        }
        for event in self.scanner.finish() {
            self.handle_event(event).await;
        }
        self.stats
    }

    /// Diagnostic text accumulated so far, as lossy UTF-8.
    #[must_use]
    pub fn diagnostics_snapshot(&self) -> String {
        String::from_utf8_lossy(&self.diagnostics).into_owned()
    }

    async fn handle_event(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::Diagnostic(bytes) => {
                self.stats.diagnostic_bytes += bytes.len();
                if self.echo_diagnostics {
                    display::print_diagnostic(&String::from_utf8_lossy(&bytes));
                }
                self.diagnostics.extend_from_slice(&bytes);
            }
            ScanEvent::Control(bytes) => {
                self.stats.control_spans += 1;
                let raw = String::from_utf8_lossy(&bytes);
                match parse_status(&raw) {
                    Ok(Some(update)) => self.dispatch(update).await,
                    Ok(None) => {
                        tracing::debug!("Ignoring empty control span");
                    }
                    Err(e) => {
                        self.stats.parse_failures += 1;
                        display::print_error(&format!("bad control payload: {e}"));
                        tracing::warn!(
                            error = %e,
                            payload = %raw,
                            "Failed to decode control span"
                        );
                    }
                }
            }
        }
    }

    async fn dispatch(&mut self, mut update: StatusUpdate) {
        display::print_status(&update);
        tracing::info!(status = %update.status, "Found status message");

        if update.is_failed() {
            update.attach_message(self.diagnostics_snapshot());
        }

        match self.reporter.report(&update).await {
            Ok(()) => self.stats.reports += 1,
            Err(e) => {
                self.stats.dispatch_failures += 1;
                tracing::warn!(
                    error = %e,
                    status = %update.status,
                    "Failed to deliver status report"
                );
            }
        }
    }
}
