//! Render-surface readiness seams.
//!
//! The orchestrator never talks to a real surface directly. Fonts arrive as
//! a future handed to [`crate::driver::spawn`]; images are sampled through
//! [`ImageSurface`] because there is no "image set changed" event to
//! subscribe to, only a repeating census.

use curtain_types::ImageCensus;
use thiserror::Error;

/// Failure reported by the font readiness signal.
///
/// Never fatal: the gate logs it and proceeds as if fonts were ready.
#[derive(Debug, Clone, Error)]
#[error("font readiness signal failed: {reason}")]
pub struct FontFault {
    reason: String,
}

impl FontFault {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A queryable set of image elements, each exposing a completion flag.
pub trait ImageSurface: Send {
    /// Count the images currently present and how many have finished
    /// decoding. Called once immediately after activation and then on every
    /// poll tick until all present images are complete.
    fn image_census(&self) -> ImageCensus;
}
