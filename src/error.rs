//! Error types for the sprite-chroma-key crate.

/// Errors that can occur while keying out a green-screen background.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A threshold was outside its accepted range.
    #[error("invalid {name} threshold: {reason}")]
    InvalidThreshold {
        /// Name of the offending threshold (`g_min`, `delta` or `ratio`).
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output format is unknown or cannot carry an alpha channel.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred while decoding or encoding an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
