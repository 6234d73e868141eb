//! Display output allocation: the capability interface between the session
//! engine and whatever renders surfaces on this device.
//!
//! The application layer sees three things:
//!
//! - [`DisplayBackend`] — allocates virtual outputs, enumerates outputs, and
//!   captures the primary display. This is the single narrow seam a platform
//!   compositor integration implements; nothing else in the service touches
//!   platform display APIs.
//! - [`SurfaceAllocation`] — an allocated virtual output paired with its
//!   frame sink. Owned exclusively by one session; dropping the handle
//!   releases the output, so release happens exactly once.
//! - [`FrameSink`] — the consumer end of a double-buffered frame queue.
//!
//! The always-compiled software implementation is in [`headless`].

pub mod headless;

use std::sync::Arc;

use displayd_core::OutputInfo;
use thiserror::Error;

/// Number of in-flight frames a sink must hold so rendering and capture do
/// not serialize.
pub const MIN_IN_FLIGHT_FRAMES: usize = 2;

/// Error type for surface allocation.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The platform refused to create the output. Reported to the caller,
    /// not retried; transient exhaustion is retried at a higher level.
    #[error("failed to create output {label}: {reason}")]
    Refused { label: String, reason: String },
}

/// One rendered frame as produced by a sink.
///
/// `row_stride` may exceed `width * pixel_stride` when the producer pads
/// rows; capture is responsible for stripping the padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes per pixel (RGBA8888 ⇒ 4).
    pub pixel_stride: usize,
    /// Bytes per buffer row, including any padding.
    pub row_stride: usize,
    pub data: Vec<u8>,
}

/// Consumer end of a surface's frame queue.
pub trait FrameSink: Send + Sync {
    /// Returns the most recently rendered frame, or `None` when nothing has
    /// been rendered yet. Frames lag rendering; an empty sink is expected
    /// and retryable, not a failure of the surface.
    fn acquire_latest_frame(&self) -> Option<SinkFrame>;
}

/// Handle to an allocated virtual output.
///
/// Implementations deregister the output when dropped.
pub trait OutputHandle: Send + Sync {
    fn info(&self) -> &OutputInfo;
}

/// An allocated virtual output paired with its frame sink.
pub struct SurfaceAllocation {
    pub handle: Box<dyn OutputHandle>,
    pub sink: Arc<dyn FrameSink>,
}

impl SurfaceAllocation {
    pub fn info(&self) -> &OutputInfo {
        self.handle.info()
    }
}

/// Display backend capability interface.
///
/// One implementation exists per deployment; the session manager holds it as
/// an `Arc<dyn DisplayBackend>`.
pub trait DisplayBackend: Send + Sync {
    /// Creates a virtual output with a double-buffered frame sink.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Refused`] when the platform cannot create
    /// the output.
    fn allocate(
        &self,
        label: &str,
        width: u32,
        height: u32,
        density: u32,
    ) -> Result<SurfaceAllocation, AllocationError>;

    /// Descriptor of the physical display (output id 0).
    fn primary_output(&self) -> OutputInfo;

    /// Most recent frame of the physical display, or `None` when no frame is
    /// currently available.
    fn acquire_primary_frame(&self) -> Option<SinkFrame>;

    /// All outputs currently live: the physical display plus every
    /// allocated virtual output.
    fn list_outputs(&self) -> Vec<OutputInfo>;
}
