//! Single-shot location acquisition

use crate::core::GeoPosition;
use crate::platform::error::{AcquisitionFailure, PlatformResult};

/// Outcome delivered to a [`FixHandler`]
pub type FixOutcome = Result<GeoPosition, AcquisitionFailure>;

/// Handler invoked exactly once with the result of a fix request
pub type FixHandler = Box<dyn FnOnce(FixOutcome) + Send>;

/// Access to the device location service
pub trait LocationGateway: Send {
    /// Request exactly one fix from `provider`.
    ///
    /// Returns an error without invoking `handler` when the request cannot be issued at all.
    /// Otherwise `handler` is invoked once, now or later, on any thread.
    fn request_single_fix(&mut self, provider: &str, handler: FixHandler) -> PlatformResult<()>;
}
