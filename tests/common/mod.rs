//! Shared test helpers.

use std::sync::Mutex;

use async_trait::async_trait;

use status_supervisor::protocol::StatusUpdate;
use status_supervisor::report::{DispatchError, Reporter};

/// Reporter that records every update instead of delivering it.
#[derive(Default)]
pub struct RecordingReporter {
    sent: Mutex<Vec<StatusUpdate>>,
}

impl RecordingReporter {
    pub fn sent(&self) -> Vec<StatusUpdate> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn report(&self, update: &StatusUpdate) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push(update.clone());
        Ok(())
    }
}
