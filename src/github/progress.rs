//! Progress notifications emitted while an aggregation run executes.
//!
//! Progress is a transient, append-only signal: the pipeline pushes events
//! into a [`ProgressSink`] and never waits on the consumer. Callers that do
//! not stream progress use [`NoopProgressSink`].

/// A progress notification from one stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Repository discovery grew the deduplicated set to `count` entries.
    RepositoriesDiscovered {
        /// Running size of the discovered set.
        count: usize,
    },
    /// The orchestrator finished folding one batch of repository fetches.
    BatchCompleted {
        /// Repositories processed so far, including failed ones.
        processed: usize,
        /// Total repositories in the run.
        total: usize,
    },
    /// The issue/PR aggregator finished one search page.
    IssuesFetched {
        /// Items collected so far.
        count: usize,
    },
}

/// A sink that receives progress events.
///
/// Implementations must not block: the pipeline emits from its fold step and
/// a slow consumer must buffer in its own transport, never stall the run.
pub trait ProgressSink: Send + Sync {
    /// Records a progress event.
    fn record(&self, event: ProgressEvent);
}

/// Progress sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn record(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Recording sink shared by pipeline tests.

    use std::sync::Mutex;

    use super::{ProgressEvent, ProgressSink};

    /// Captures every recorded event for later assertions.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl RecordingSink {
        /// Drains and returns the captured events.
        pub(crate) fn take(&self) -> Vec<ProgressEvent> {
            self.events
                .lock()
                .expect("events mutex should be available")
                .drain(..)
                .collect()
        }
    }

    impl ProgressSink for RecordingSink {
        fn record(&self, event: ProgressEvent) {
            self.events
                .lock()
                .expect("events mutex should be available")
                .push(event);
        }
    }
}
