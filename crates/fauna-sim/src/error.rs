use fauna_core::CoreError;

/// Convenience alias for simulation results.
pub type SimResult<T> = Result<T, SimError>;

/// Errors produced by the simulation crate.
///
/// Exhaustion of the pool or the reservation table is not an error; those
/// paths return `None` and the simulation keeps running with fewer actors.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error from the core data model.
    #[error(transparent)]
    Core(#[from] CoreError),
}
