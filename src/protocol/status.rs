//! Status update decoding for the control channel.

use serde::{Deserialize, Serialize};

/// Status value that triggers diagnostic-context enrichment.
pub const FAILED_STATUS: &str = "failed";

/// A status update self-reported by the child process.
///
/// Only `status` is required; any other fields the child includes are
/// carried through to the report unchanged. `message` is reserved: it is
/// overwritten with accumulated diagnostic text when the status is
/// [`FAILED_STATUS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StatusUpdate {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == FAILED_STATUS
    }

    /// Set or overwrite the diagnostic message attached to this update.
    pub fn attach_message(&mut self, text: impl Into<String>) {
        self.message = Some(text.into());
    }
}

/// Error type for control payload decoding.
#[derive(thiserror::Error, Debug)]
pub enum ProtocolError {
    /// The payload is not a JSON object with a string `status` field.
    #[error("control payload is not a valid status object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode one closed control span.
///
/// The span is trimmed first; a span that is empty after trimming carries no
/// message and yields `Ok(None)` without a decode attempt.
///
/// # Errors
///
/// Returns `ProtocolError::Malformed` if the trimmed payload is not valid
/// JSON, is not an object, or lacks the `status` field.
pub fn parse_status(raw: &str) -> Result<Option<StatusUpdate>, ProtocolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let update = serde_json::from_str(trimmed)?;
    Ok(Some(update))
}
