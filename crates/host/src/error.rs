//! Host-side failure conditions.

/// Result type for host scheduler calls.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Failures a host surface can report to the adapter layer.
///
/// None of these escape to callers: `Unsupported` triggers the degradation
/// policy, `NotReady` and `Retired` are expected races answered with an
/// inert handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The surface is administratively disabled on this host.
    #[error("host scheduler surface unsupported: {0}")]
    Unsupported(&'static str),

    /// The target world is not loaded (yet, or anymore). Callers that need
    /// the world may retry with backoff; the scheduler treats it as a stale
    /// affinity.
    #[error("target world is not loaded")]
    NotReady,

    /// The target entity has already been removed.
    #[error("target entity has been removed")]
    Retired,
}
