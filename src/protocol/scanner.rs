//! Byte-wise tag scanner for the child's error stream.
//!
//! Control messages are wrapped in `#*` ... `*#` markers inline in the
//! stream; everything outside the markers is diagnostic text. The scanner
//! is an incremental state machine: feed it chunks of any size (including
//! chunks that split a marker in half) and it emits the separated spans.

use std::mem;

const OPEN: [u8; 2] = *b"#*";
const CLOSE: [u8; 2] = *b"*#";

/// Which buffer the scanner is currently filling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ScanMode {
    #[default]
    Diagnostic,
    Control,
}

/// A span produced by the scanner.
///
/// Marker bytes are never part of either span kind. `Control` carries the
/// complete text between one open marker and its close marker; `Diagnostic`
/// carries a maximal run of untagged bytes within one `feed` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Diagnostic(Vec<u8>),
    Control(Vec<u8>),
}

/// Incremental scanner separating control spans from diagnostic text.
///
/// One instance owns the state for one stream; state persists across `feed`
/// calls. An open marker is only recognized outside a control span and a
/// close marker only inside one; marker-shaped bytes of the wrong kind fall
/// through into whichever buffer is active.
#[derive(Debug, Default)]
pub struct TagScanner {
    mode: ScanMode,
    /// A held first marker byte (`#` outside a span, `*` inside one). Kept
    /// across chunk boundaries so a split marker is still recognized.
    pending: bool,
    control: Vec<u8>,
}

impl TagScanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk and return the spans it completed, in stream order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        let mut run = Vec::new();
        for &byte in chunk {
            self.step(byte, &mut run, &mut events);
        }
        if !run.is_empty() {
            events.push(ScanEvent::Diagnostic(run));
        }
        events
    }

    fn step(&mut self, byte: u8, run: &mut Vec<u8>, events: &mut Vec<ScanEvent>) {
        match self.mode {
            ScanMode::Diagnostic => {
                if self.pending {
                    self.pending = false;
                    if byte == OPEN[1] {
                        if !run.is_empty() {
                            events.push(ScanEvent::Diagnostic(mem::take(run)));
                        }
                        self.mode = ScanMode::Control;
                        return;
                    }
                    run.push(OPEN[0]);
                }
                if byte == OPEN[0] {
                    self.pending = true;
                } else {
                    run.push(byte);
                }
            }
            ScanMode::Control => {
                if self.pending {
                    self.pending = false;
                    if byte == CLOSE[1] {
                        events.push(ScanEvent::Control(mem::take(&mut self.control)));
                        self.mode = ScanMode::Diagnostic;
                        return;
                    }
                    self.control.push(CLOSE[0]);
                }
                if byte == CLOSE[0] {
                    self.pending = true;
                } else {
                    self.control.push(byte);
                }
            }
        }
    }

    /// Flush end-of-stream state.
    ///
    /// A held marker byte joins the buffer it was read in; a control span
    /// that never saw its close marker is discarded.
    pub fn finish(&mut self) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        if self.pending {
            self.pending = false;
            match self.mode {
                ScanMode::Diagnostic => events.push(ScanEvent::Diagnostic(vec![OPEN[0]])),
                ScanMode::Control => self.control.push(CLOSE[0]),
            }
        }
        if self.mode == ScanMode::Control && !self.control.is_empty() {
            tracing::debug!(
                len = self.control.len(),
                "Discarding unterminated control span at end of stream"
            );
            self.control.clear();
        }
        events
    }

    /// Whether the scanner is currently inside a control span.
    #[must_use]
    pub fn is_in_control_span(&self) -> bool {
        self.mode == ScanMode::Control
    }
}
