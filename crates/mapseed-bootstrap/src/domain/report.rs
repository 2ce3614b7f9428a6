//! Per-step outcome of a bootstrap run.

use std::fmt;

use mapseed_core::error::ClientError;

/// A step of the startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapStep {
    /// Session acquisition.
    Session,
    /// Dataset loading.
    Datasets,
    /// Flavor metadata and forms.
    Flavor,
    /// Current user.
    User,
    /// Configuration fan-out.
    Config,
    /// Localization initialization.
    Localization,
    /// Global listener installation.
    Listeners,
    /// Place loading.
    Places,
}

impl BootstrapStep {
    /// Stable step name used in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Datasets => "datasets",
            Self::Flavor => "flavor",
            Self::User => "user",
            Self::Config => "config",
            Self::Localization => "localization",
            Self::Listeners => "listeners",
            Self::Places => "places",
        }
    }
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step produced its data.
    Completed,
    /// The backend had nothing to offer (no session, no flavor).
    Skipped,
    /// The step failed and a safe default was used instead.
    Degraded(String),
}

/// A dataset that could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFailure {
    /// Configured slug of the dataset.
    pub dataset_slug: String,
    /// The final error after retries.
    pub error: ClientError,
}

/// Outcomes recorded during a bootstrap run, in step order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    steps: Vec<(BootstrapStep, StepOutcome)>,
    dataset_failures: Vec<DatasetFailure>,
}

impl BootstrapReport {
    /// Records the outcome of `step`.
    pub fn record(&mut self, step: BootstrapStep, outcome: StepOutcome) {
        self.steps.push((step, outcome));
    }

    /// Records a dataset that failed to load.
    pub fn record_dataset_failure(&mut self, failure: DatasetFailure) {
        self.dataset_failures.push(failure);
    }

    /// Outcome of `step`, if it ran.
    #[must_use]
    pub fn outcome(&self, step: BootstrapStep) -> Option<&StepOutcome> {
        self.steps
            .iter()
            .find(|(recorded, _)| *recorded == step)
            .map(|(_, outcome)| outcome)
    }

    /// Steps in the order they ran.
    #[must_use]
    pub fn steps(&self) -> &[(BootstrapStep, StepOutcome)] {
        &self.steps
    }

    /// Datasets that failed to load.
    #[must_use]
    pub fn dataset_failures(&self) -> &[DatasetFailure] {
        &self.dataset_failures
    }

    /// Returns `true` if any step fell back to a default.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.steps
            .iter()
            .any(|(_, outcome)| matches!(outcome, StepOutcome::Degraded(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_tracks_outcomes_per_step() {
        // Arrange
        let mut report = BootstrapReport::default();

        // Act
        report.record(BootstrapStep::Session, StepOutcome::Skipped);
        report.record(BootstrapStep::Datasets, StepOutcome::Completed);

        // Assert
        assert_eq!(
            report.outcome(BootstrapStep::Session),
            Some(&StepOutcome::Skipped)
        );
        assert_eq!(report.outcome(BootstrapStep::User), None);
        assert!(!report.is_degraded());
    }

    #[test]
    fn test_degraded_step_marks_report_degraded() {
        let mut report = BootstrapReport::default();
        report.record(BootstrapStep::Flavor, StepOutcome::Degraded("timeout".into()));

        assert!(report.is_degraded());
        assert_eq!(BootstrapStep::Flavor.to_string(), "flavor");
    }
}
