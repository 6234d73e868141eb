//! Software display backend.
//!
//! # Why a software backend?
//!
//! Virtual outputs are off-screen by definition: nothing about them requires
//! a compositor process, only a place for a producer to publish frames and
//! for capture to read them back. This backend keeps each output's frames in
//! an in-memory double-buffered ring, which makes it the production path for
//! headless deployments and the test double for everything else — the same
//! role in both, so it is always compiled.
//!
//! A platform compositor integration would implement [`DisplayBackend`]
//! against the real display pipeline and hand out sinks fed by rendered
//! buffers; the rest of the service is indifferent to which backend is wired
//! in.
//!
//! Each sink is seeded with one blank frame at allocation time, mirroring a
//! compositor presenting its first vsync: a freshly created surface is
//! immediately capturable instead of racing the first render.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use displayd_core::{OutputId, OutputInfo, PRIMARY_OUTPUT_ID};
use tracing::debug;

use super::{
    AllocationError, DisplayBackend, FrameSink, OutputHandle, SinkFrame, SurfaceAllocation,
    MIN_IN_FLIGHT_FRAMES,
};

/// In-memory double-buffered frame queue.
///
/// Producers call [`MemoryFrameSink::push_frame`]; the session's capture path
/// reads through the [`FrameSink`] trait. The ring holds at most
/// [`MIN_IN_FLIGHT_FRAMES`] frames; pushing evicts the oldest.
pub struct MemoryFrameSink {
    frames: Mutex<Vec<SinkFrame>>,
}

impl MemoryFrameSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
        }
    }

    /// Creates a sink pre-seeded with one blank RGBA frame of the given
    /// geometry, so the surface is capturable before the first real render.
    pub fn seeded(width: u32, height: u32) -> Self {
        let sink = Self::new();
        sink.push_frame(blank_frame(width, height));
        sink
    }

    /// Publishes a frame, evicting the oldest when the ring is full.
    pub fn push_frame(&self, frame: SinkFrame) {
        let mut frames = self.frames.lock().expect("frame ring poisoned");
        if frames.len() == MIN_IN_FLIGHT_FRAMES {
            frames.remove(0);
        }
        frames.push(frame);
    }

    /// Number of frames currently buffered. Exposed for tests.
    pub fn buffered(&self) -> usize {
        self.frames.lock().expect("frame ring poisoned").len()
    }
}

impl Default for MemoryFrameSink {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for MemoryFrameSink {
    fn acquire_latest_frame(&self) -> Option<SinkFrame> {
        self.frames
            .lock()
            .expect("frame ring poisoned")
            .last()
            .cloned()
    }
}

/// A blank (all-zero) tightly-packed RGBA frame.
fn blank_frame(width: u32, height: u32) -> SinkFrame {
    let pixel_stride = 4;
    let row_stride = width as usize * pixel_stride;
    SinkFrame {
        width,
        height,
        pixel_stride,
        row_stride,
        data: vec![0; row_stride * height as usize],
    }
}

/// Shared state behind the backend and its output handles.
struct BackendState {
    primary: OutputInfo,
    primary_sink: Arc<MemoryFrameSink>,
    /// Live virtual outputs, keyed by id. Entries are removed when the
    /// owning [`SurfaceAllocation`] handle drops.
    outputs: Mutex<HashMap<OutputId, OutputInfo>>,
    next_id: AtomicI32,
}

/// Software [`DisplayBackend`]: virtual outputs backed by [`MemoryFrameSink`]s
/// plus a software primary display.
pub struct HeadlessDisplayBackend {
    state: Arc<BackendState>,
}

impl HeadlessDisplayBackend {
    /// Creates a backend whose primary display has the given geometry.
    pub fn new(width: u32, height: u32, density: u32) -> Self {
        let primary = OutputInfo {
            id: PRIMARY_OUTPUT_ID,
            name: "builtin".to_string(),
            width,
            height,
            density,
            is_virtual: false,
        };
        Self {
            state: Arc::new(BackendState {
                primary,
                primary_sink: Arc::new(MemoryFrameSink::seeded(width, height)),
                outputs: Mutex::new(HashMap::new()),
                next_id: AtomicI32::new(PRIMARY_OUTPUT_ID + 1),
            }),
        }
    }

    /// Producer-side access to the primary display's sink, for embedders
    /// that feed rendered frames in.
    pub fn primary_sink(&self) -> Arc<MemoryFrameSink> {
        Arc::clone(&self.state.primary_sink)
    }
}

impl DisplayBackend for HeadlessDisplayBackend {
    fn allocate(
        &self,
        label: &str,
        width: u32,
        height: u32,
        density: u32,
    ) -> Result<SurfaceAllocation, AllocationError> {
        if width == 0 || height == 0 {
            return Err(AllocationError::Refused {
                label: label.to_string(),
                reason: "zero-sized surface".to_string(),
            });
        }

        let id = self.state.next_id.fetch_add(1, Ordering::Relaxed);
        let info = OutputInfo {
            id,
            name: label.to_string(),
            width,
            height,
            density,
            is_virtual: true,
        };
        self.state
            .outputs
            .lock()
            .expect("output registry poisoned")
            .insert(id, info.clone());
        debug!(output = id, label, width, height, density, "allocated virtual output");

        Ok(SurfaceAllocation {
            handle: Box::new(HeadlessOutputHandle {
                state: Arc::clone(&self.state),
                info,
            }),
            sink: Arc::new(MemoryFrameSink::seeded(width, height)),
        })
    }

    fn primary_output(&self) -> OutputInfo {
        self.state.primary.clone()
    }

    fn acquire_primary_frame(&self) -> Option<SinkFrame> {
        self.state.primary_sink.acquire_latest_frame()
    }

    fn list_outputs(&self) -> Vec<OutputInfo> {
        let registry = self.state.outputs.lock().expect("output registry poisoned");
        let mut outputs: Vec<OutputInfo> = Vec::with_capacity(registry.len() + 1);
        outputs.push(self.state.primary.clone());
        outputs.extend(registry.values().cloned());
        outputs.sort_by_key(|o| o.id);
        outputs
    }
}

/// Handle for one allocated virtual output; deregisters on drop.
struct HeadlessOutputHandle {
    state: Arc<BackendState>,
    info: OutputInfo,
}

impl OutputHandle for HeadlessOutputHandle {
    fn info(&self) -> &OutputInfo {
        &self.info
    }
}

impl Drop for HeadlessOutputHandle {
    fn drop(&mut self) {
        self.state
            .outputs
            .lock()
            .expect("output registry poisoned")
            .remove(&self.info.id);
        debug!(output = self.info.id, "released virtual output");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
