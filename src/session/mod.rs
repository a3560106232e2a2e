use crate::errors::PipelineError;
use crate::pipeline::Generation;
use crate::wire::{PostBatch, ToneProfile};

/// The presentation side's result slot: the latest successful tone and batch.
///
/// A new success overwrites both. A failure leaves them as they were, so a
/// failed resubmission never erases what is already on screen.
#[derive(Debug, Default)]
pub struct Session {
    latest: Option<Generation>,
    submissions: usize,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one submission and hands back the error, if any,
    /// for display.
    pub fn record(&mut self, outcome: Result<Generation, PipelineError>) -> Option<PipelineError> {
        self.submissions += 1;
        match outcome {
            Ok(generation) => {
                self.latest = Some(generation);
                None
            }
            Err(e) => Some(e),
        }
    }

    pub fn tone(&self) -> Option<&ToneProfile> {
        self.latest.as_ref().map(|g| &g.tone)
    }

    pub fn batch(&self) -> Option<&PostBatch> {
        self.latest.as_ref().map(|g| &g.batch)
    }

    pub fn latest(&self) -> Option<&Generation> {
        self.latest.as_ref()
    }

    pub fn submissions(&self) -> usize {
        self.submissions
    }
}
