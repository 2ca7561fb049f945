//! Error types for terminal graphics operations.

/// Errors that can occur while detecting or emitting terminal graphics.
///
/// Codec and stream failures are passed through untouched so callers can
/// match on the original `std::io::Error`, `image::ImageError` or
/// `icy_sixel::SixelError`.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// No graphics protocol is usable on this terminal.
    #[error("term graphics not available")]
    TermGraphicsNotAvailable,

    /// Capability detection was attempted against a non-interactive stream.
    #[error("non tty")]
    NonTty,

    /// The terminal did not answer a query within the response window.
    #[error("term response timed out")]
    TermResponseTimedOut,

    /// A protocol selector code is outside the known set.
    #[error("unknown term type: {code}")]
    UnknownTermType {
        /// The rejected selector code.
        code: u8,
    },

    /// Writing to the output stream (or talking to the tty) failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The PNG or JPEG codec failed.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// The Sixel codec failed.
    #[error(transparent)]
    Sixel(#[from] icy_sixel::SixelError),
}

impl GraphicsError {
    /// Whether this error only means "the capability is absent".
    ///
    /// Detection failures of this kind are folded into `false` by the
    /// availability checks rather than reported.
    pub fn is_capability_absent(&self) -> bool {
        matches!(
            self,
            GraphicsError::NonTty
                | GraphicsError::TermResponseTimedOut
                | GraphicsError::TermGraphicsNotAvailable
        )
    }
}
