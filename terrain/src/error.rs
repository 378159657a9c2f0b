use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TerrainError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("azimuth step must be a positive divisor of 360, got {0}")]
    RadialStep(i32),

    #[error("profile needs at least 2 samples, got {0}")]
    ProfileLen(usize),

    #[error("profile has {distances} distances but {elevations} elevations")]
    ProfileShape { distances: usize, elevations: usize },

    #[error("profile distances must be strictly increasing (sample {0})")]
    ProfileOrder(usize),

    #[error("cannot build a ring from an empty point set")]
    EmptyRing,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl TerrainError {
    /// Returns true for errors caused by malformed caller input, as
    /// opposed to an incomplete builder.
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, Self::Builder(_))
    }
}
