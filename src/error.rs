use crate::processor::{Dimensions, EngineError};

/// Why an invocation did not produce an image.
#[derive(Debug, thiserror::Error)]
pub enum ResizeError {
    #[error("image payload is not valid base64: {0}")]
    InvalidPayload(#[from] base64::DecodeError),

    #[error("requested dimensions {requested} are outside 1..={max}")]
    Dimensions { requested: Dimensions, max: u32 },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    InvalidPayload,
    Dimensions,
    Engine,
}

impl ResizeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPayload(_) => ErrorKind::InvalidPayload,
            Self::Dimensions { .. } => ErrorKind::Dimensions,
            Self::Engine(_) => ErrorKind::Engine,
        }
    }
}
