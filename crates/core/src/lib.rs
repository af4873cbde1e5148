//! JSON response envelope shared by REST handlers.
//!
//! The envelope carries a business error code, a user-facing message and a
//! reference URL. How errors map to codes is the caller's concern, exposed
//! here only as the [`Coder`] seam; the transport that serializes the
//! envelope stays outside this crate.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use tracing::error;

/// Maps a failure to its wire representation.
pub trait Coder {
    /// Business error code.
    fn code(&self) -> i32;
    /// User-facing message.
    fn message(&self) -> String;
    /// Reference URL with remediation steps, empty when none exists.
    fn reference(&self) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub code: i32,
    pub message: String,
    pub reference: String,
}

impl Response {
    /// Build the error envelope for a failed request, logging the failure.
    pub fn from_coder(coder: &dyn Coder) -> Response {
        error!(code = coder.code(), message = %coder.message(), "request failed");

        Response {
            code: coder.code(),
            message: coder.message(),
            reference: coder.reference(),
        }
    }
}
