use std::sync::Arc;

/// Events emitted while feeds are generated, for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The show catalog is being fetched from the archive
    FetchingCatalog { url: String },

    /// Batch preparation is starting (whole-catalog episode download and
    /// per-source setup); this can take a while
    BatchPrefetch,

    /// A show's feed is about to be generated
    ShowStarting {
        title: String,
        /// Position of this show in the batch, starting at 1
        index: usize,
        /// Number of shows in the batch
        total: usize,
    },

    /// The show-level metadata chain is running
    FindingShowMetadata { title: String },

    /// An episode is being populated in the combined all-episodes feed
    EpisodePopulating { index: usize, total: usize },

    /// An episode was voluntarily excluded by a metadata source
    EpisodeSkipped {
        episode_title: String,
        sound_url: String,
        /// Stable id of the source that signalled the skip
        source_id: &'static str,
        reason: String,
    },
}

/// Trait for reporting progress events during feed generation.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {
        // Intentionally empty
    }
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_reporter_handles_all_events() {
        let reporter = NoopReporter;

        reporter.report(ProgressEvent::FetchingCatalog {
            url: "https://archive.example/api/shows".to_string(),
        });

        reporter.report(ProgressEvent::BatchPrefetch);

        reporter.report(ProgressEvent::ShowStarting {
            title: "Morning Show".to_string(),
            index: 1,
            total: 42,
        });

        reporter.report(ProgressEvent::FindingShowMetadata {
            title: "Morning Show".to_string(),
        });

        reporter.report(ProgressEvent::EpisodePopulating {
            index: 10,
            total: 900,
        });

        reporter.report(ProgressEvent::EpisodeSkipped {
            episode_title: "Lost episode".to_string(),
            sound_url: "https://archive.example/sound/901.mp3".to_string(),
            source_id: "episode_overrides",
            reason: "hidden by local override".to_string(),
        });
    }
}
