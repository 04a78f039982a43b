//! Error type shared across the crate.
//!
//! The variants mirror the failure classes of the daemon: configuration
//! problems are fatal at startup, resource problems (models, background
//! image) are fatal at startup, shape mismatches indicate a caller bug, and
//! device errors are raised by the V4L2 layer and passed through the
//! per-frame path untouched.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Unknown key, malformed value, or an otherwise invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A model, background image, or other startup resource failed to load.
    #[error("resource error: {0}")]
    Resource(String),

    /// A buffer does not have the element count the pipeline was built for.
    #[error("shape mismatch: expected {expected} elements, got {got}")]
    Shape { expected: usize, got: usize },

    /// Raised by the capture/output device layer or a frame codec.
    #[error("device error: {0}")]
    Device(String),

    /// A requested capability is not implemented.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;
