use thiserror::Error;

/// Start-up failures. Playback refusals and degenerate viewports are not
/// errors: the first drives a state transition, the second is clamped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("required resource unavailable: {what}")]
    ResourceUnavailable { what: String },
    #[error("layer `{layer}` draws to surface {index}, but only {available} surfaces exist")]
    MissingSurface {
        layer: String,
        index: usize,
        available: usize,
    },
}

impl CardError {
    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::ResourceUnavailable { what: what.into() }
    }
}
