/// Convenience result type used across Animyte.
pub type AnimyteResult<T> = Result<T, AnimyteError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Warnings are deliberately not errors: unsupported document features are
/// collected on the composition (see `Composition::warnings`) and playback
/// continues. Everything in this enum stops the operation that raised it.
#[derive(thiserror::Error, Debug)]
pub enum AnimyteError {
    /// Malformed or unsupported animation document. Returned from document
    /// parsing and graph construction, never raised inside the render loop.
    #[error("parse error: {0}")]
    Parse(String),

    /// Author or programmer error in otherwise well-formed data: empty
    /// keyframe lists, mismatched shape topologies, unknown marker names.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Failure while producing a single frame's draw commands.
    #[error("render fault: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnimyteError {
    /// Build an [`AnimyteError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build an [`AnimyteError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build an [`AnimyteError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
