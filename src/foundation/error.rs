/// Convenience result type used across tourline.
pub type TourResult<T> = Result<T, TourError>;

/// Top-level error taxonomy used by loading and configuration APIs.
///
/// Animation runs never fail with a `TourError`; their terminal value is an
/// [`AnimationOutcome`](crate::AnimationOutcome).
#[derive(thiserror::Error, Debug)]
pub enum TourError {
    /// No usable stop data source could be resolved, or a setting is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The stop or route query was rejected by the data source.
    #[error("query error: {0}")]
    Query(String),

    /// Records came back but cannot be turned into a tour.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TourError {
    /// Build a [`TourError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`TourError::Query`] value.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Build a [`TourError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
