//! Metrics emitted through the `metrics` facade.
//!
//! Nothing is recorded unless the application installs a recorder.

/// Metric names
pub mod names {
    /// Engines created, labelled by descriptor form
    pub const ENGINE_CREATED: &str = "db2_engine_created_total";

    /// Verification attempts, labelled by outcome
    pub const VERIFICATION: &str = "db2_verification_total";

    /// Verification latency in milliseconds
    pub const VERIFICATION_DURATION: &str = "db2_verification_duration_ms";
}

/// Label keys and values
pub mod labels {
    /// Descriptor form label key
    pub const FORM: &str = "form";

    /// Outcome label key
    pub const OUTCOME: &str = "outcome";

    /// Successful outcome
    pub const SUCCESS: &str = "success";

    /// Failed outcome
    pub const FAILURE: &str = "failure";
}

/// Counters
pub mod counters {
    use super::{labels, names};

    /// An engine was created for the given descriptor form
    pub fn engine_created(form: &'static str) {
        metrics::counter!(names::ENGINE_CREATED, labels::FORM => form).increment(1);
    }

    /// A verification finished with the given outcome
    pub fn verification(outcome: &'static str) {
        metrics::counter!(names::VERIFICATION, labels::OUTCOME => outcome).increment(1);
    }
}

/// Histograms
pub mod histograms {
    use super::{labels, names};

    /// Time taken by one verification
    pub fn verification_duration(outcome: &'static str, millis: u64) {
        metrics::histogram!(names::VERIFICATION_DURATION, labels::OUTCOME => outcome)
            .record(millis as f64);
    }
}
