use terrain::TerrainError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropahError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    /// Malformed configuration supplied by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required upstream artifact (station data, contour, profile)
    /// is missing.
    #[error("precondition failed: {0} is required")]
    Precondition(&'static str),

    #[error("propagation model: {0}")]
    Model(String),

    #[error("{0}")]
    Terrain(#[from] TerrainError),
}

impl PropahError {
    /// Returns true for caller configuration errors.
    pub fn is_invalid_argument(&self) -> bool {
        match self {
            Self::InvalidArgument(_) => true,
            Self::Terrain(e) => e.is_invalid_argument(),
            _ => false,
        }
    }
}
