//! Submission-time errors.

/// Result type for submission-time validation.
pub type Result<T> = std::result::Result<T, SchedError>;

/// Errors rejected at the API boundary.
///
/// Everything else in the scheduler degrades or drops instead of failing:
/// stale affinities are expected races and unsupported host surfaces fall
/// back to inline execution. Only outright programming errors land here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedError {
    /// A repeating submission with a zero period would spin the host queue.
    #[error("repeating task requires a non-zero period")]
    ZeroPeriod,
}
