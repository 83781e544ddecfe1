use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::error::ResizeError;

/// The parameters of a single resize invocation.
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct ResizeParams {
    /// The source image, base64 encoded.
    pub img: String,

    /// The width of the resized image in pixels.
    pub w: i64,

    /// The height of the resized image in pixels.
    pub h: i64,
}

#[derive(Object, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeaders {
    #[oai(rename = "content-type")]
    #[serde(rename = "content-type")]
    pub content_type: String,
}

/// A successfully resized image.
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct ResizeResponse {
    pub headers: ResponseHeaders,

    /// The resized image, base64 encoded.
    pub body: String,
}

/// The result value of a failed invocation.
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct ActionError {
    /// A human readable description of what went wrong.
    pub error: String,

    /// The class of failure, one of `invalid_payload`, `dimensions` or `engine`.
    pub kind: String,
}

impl From<&ResizeError> for ActionError {
    fn from(err: &ResizeError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
        }
    }
}
