use std::path::PathBuf;

use crate::species::SpeciesId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the core model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No species is registered under this id.
    #[error("species not found: {0}")]
    SpeciesNotFound(SpeciesId),

    /// A species with the same id is already registered.
    #[error("species id {0} is already registered")]
    DuplicateSpecies(SpeciesId),

    /// The species id exceeds the registry bound.
    #[error("species id {id} is out of range (max {max})")]
    SpeciesIdOutOfRange {
        /// The rejected id.
        id: SpeciesId,
        /// Highest id the registry accepts.
        max: u16,
    },

    /// The definitions file could not be read at all.
    #[error("cannot read definitions from {}: {source}", path.display())]
    DefinitionsUnreadable {
        /// Path that was attempted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
