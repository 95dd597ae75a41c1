//! Progress reporting
//!
//! Separates progress reporting from the pipeline's business logic so callers
//! can surface milestones however they like. Milestones are advisory UI hints:
//! they carry no correctness weight, but within one request the observed
//! percentage never decreases.

use instant::Instant;
use std::sync::Arc;

/// Milestones during one background removal request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// The request was accepted and processing has begun
    Started,
    /// The removal call returned; results are ready to render
    ResultsReady,
    /// The request is fully complete
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the milestone
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Started => "Processing started",
            ProcessingStage::ResultsReady => "Results ready to render",
            ProcessingStage::Completed => "Processing complete",
        }
    }

    /// Get the progress percentage for this milestone
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::Started => 10,
            ProcessingStage::ResultsReady => 80,
            ProcessingStage::Completed => 100,
        }
    }
}

/// Progress update containing milestone and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current milestone
    pub stage: ProcessingStage,
    /// Progress percentage (0-100), monotonic within one request
    pub progress: u8,
    /// Human-readable status label
    pub description: String,
    /// Elapsed time since the request started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update for a milestone
    #[must_use]
    pub fn new(stage: ProcessingStage, progress: u8, start_time: Instant) -> Self {
        Self {
            stage,
            progress,
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}

/// Trait for receiving progress updates during background removal
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report an error during processing
    ///
    /// # Arguments
    /// * `stage` - Last milestone reached before the error
    /// * `error` - Error description
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// No-op progress reporter that discards all updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {
        // Intentionally empty - discards progress updates
    }

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {
        // Intentionally empty - discards error reports
    }
}

/// Progress reporter that logs milestones through the `log` facade
pub struct LogProgressReporter {
    verbose: bool,
}

impl LogProgressReporter {
    /// Create a new logging reporter
    ///
    /// # Arguments
    /// * `verbose` - Whether to include elapsed time in each line
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for LogProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::info!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        log::error!("error after '{}': {}", stage.description(), error);
    }
}

/// Per-request tracker that enforces monotonic progress
///
/// Created at the start of one request and discarded when it completes or
/// fails. A milestone reported out of order is clamped to the highest
/// percentage already observed, so reporters never see progress move
/// backwards.
pub struct ProgressTracker {
    reporter: Arc<dyn ProgressReporter>,
    start_time: Instant,
    last_progress: u8,
    current_stage: Option<ProcessingStage>,
}

impl ProgressTracker {
    /// Create a new tracker reporting through `reporter`
    #[must_use]
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
            last_progress: 0,
            current_stage: None,
        }
    }

    /// Create a tracker that discards all updates (for testing/disabled progress)
    #[must_use]
    pub fn no_op() -> Self {
        Self::new(Arc::new(NoOpProgressReporter))
    }

    /// Report a milestone
    pub fn report_stage(&mut self, stage: ProcessingStage) {
        let progress = stage.progress_percentage().max(self.last_progress);
        self.last_progress = progress;
        self.current_stage = Some(stage);
        self.reporter
            .report_progress(ProgressUpdate::new(stage, progress, self.start_time));
    }

    /// Report an error at the last reached milestone
    pub fn report_error(&self, error: &str) {
        let stage = self.current_stage.unwrap_or(ProcessingStage::Started);
        self.reporter.report_error(stage, error);
    }

    /// Elapsed time since tracking started, in milliseconds
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// The last reported milestone
    #[must_use]
    pub fn current_stage(&self) -> Option<ProcessingStage> {
        self.current_stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Test reporter that captures reports for verification
    #[derive(Default)]
    struct CapturingReporter {
        updates: Arc<Mutex<Vec<ProgressUpdate>>>,
        errors: Arc<Mutex<Vec<(ProcessingStage, String)>>>,
    }

    impl ProgressReporter for CapturingReporter {
        fn report_progress(&self, update: ProgressUpdate) {
            self.updates.lock().unwrap().push(update);
        }

        fn report_error(&self, stage: ProcessingStage, error: &str) {
            self.errors.lock().unwrap().push((stage, error.to_string()));
        }
    }

    #[test]
    fn test_milestone_percentages() {
        assert_eq!(ProcessingStage::Started.progress_percentage(), 10);
        assert_eq!(ProcessingStage::ResultsReady.progress_percentage(), 80);
        assert_eq!(ProcessingStage::Completed.progress_percentage(), 100);
    }

    #[test]
    fn test_milestone_descriptions() {
        assert_eq!(ProcessingStage::Started.description(), "Processing started");
        assert_eq!(
            ProcessingStage::ResultsReady.description(),
            "Results ready to render"
        );
        assert_eq!(
            ProcessingStage::Completed.description(),
            "Processing complete"
        );
    }

    #[test]
    fn test_tracker_reports_in_order() {
        let reporter = Arc::new(CapturingReporter::default());
        let updates = Arc::clone(&reporter.updates);
        let mut tracker = ProgressTracker::new(reporter);

        tracker.report_stage(ProcessingStage::Started);
        tracker.report_stage(ProcessingStage::ResultsReady);
        tracker.report_stage(ProcessingStage::Completed);

        let seen: Vec<u8> = updates.lock().unwrap().iter().map(|u| u.progress).collect();
        assert_eq!(seen, vec![10, 80, 100]);
    }

    #[test]
    fn test_tracker_clamps_out_of_order_milestones() {
        let reporter = Arc::new(CapturingReporter::default());
        let updates = Arc::clone(&reporter.updates);
        let mut tracker = ProgressTracker::new(reporter);

        tracker.report_stage(ProcessingStage::ResultsReady);
        tracker.report_stage(ProcessingStage::Started);

        let seen: Vec<u8> = updates.lock().unwrap().iter().map(|u| u.progress).collect();
        // Progress must never decrease within one request.
        assert_eq!(seen, vec![80, 80]);
    }

    #[test]
    fn test_tracker_error_carries_last_stage() {
        let reporter = Arc::new(CapturingReporter::default());
        let errors = Arc::clone(&reporter.errors);
        let mut tracker = ProgressTracker::new(reporter);

        tracker.report_stage(ProcessingStage::Started);
        tracker.report_error("backend exploded");

        let captured = errors.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].0, ProcessingStage::Started);
        assert_eq!(captured[0].1, "backend exploded");
    }

    #[test]
    fn test_no_op_tracker() {
        let mut tracker = ProgressTracker::no_op();
        tracker.report_stage(ProcessingStage::Completed);
        assert_eq!(tracker.current_stage(), Some(ProcessingStage::Completed));
    }
}
