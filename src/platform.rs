// WardCam: Hardware Capability Interfaces
//
// The control logic only talks to the board through these traits.  The
// ESP-IDF implementations live in `drivers`; unit tests use the in-memory
// doubles in `testing`.

use anyhow::Result;

use crate::camera::CameraConfig;
use crate::events::MotionSignal;

/// Monotonic millisecond clock with a cooperative sleep.
pub trait Clock {
    fn now_ms(&self) -> u64;

    /// Yield the calling task for `ms` milliseconds.
    fn sleep_ms(&self, ms: u64);
}

/// Digital motion sensor, polled.
pub trait MotionInput {
    fn read(&mut self) -> MotionSignal;
}

/// Station-mode network link.
pub trait NetworkLink {
    /// `true` once associated and holding an IP address.
    fn is_connected(&mut self) -> bool;

    /// Kick off (or re-kick) association.  Must not block until connected.
    fn begin_connect(&mut self) -> Result<()>;
}

/// Image sensor driver.
pub trait CameraDriver {
    fn init(&mut self, config: &CameraConfig) -> Result<()>;
    fn deinit(&mut self) -> Result<()>;
}

/// Network server exposing the capture endpoint.
pub trait CaptureServer {
    fn start(&mut self) -> Result<()>;

    /// Stop listening.  Requests already running may finish.
    fn stop(&mut self) -> Result<()>;

    fn is_listening(&self) -> bool;
}

/// A pooled frame buffer borrowed from the driver.
///
/// Dropping the value hands the buffer back to the pool.
pub trait FrameBuffer {
    fn data(&self) -> &[u8];
}

/// Source of captured frames, shared with the server's handler context.
pub trait FrameSource {
    type Frame<'a>: FrameBuffer
    where
        Self: 'a;

    /// Borrow the latest frame, or `None` if the driver has none to give.
    fn acquire(&self) -> Option<Self::Frame<'_>>;
}

/// Path-addressed remote key/value store.
pub trait StateStore {
    /// Whether a write can be attempted right now.
    fn is_ready(&mut self) -> bool;

    fn set_json(&mut self, path: &str, body: &[u8]) -> Result<()>;
}

/// Process control.
pub trait SystemControl {
    /// Restart the node.  Does not return on hardware.
    fn restart(&mut self);
}

/// Aggregates the concrete capability types of one board.
pub trait Platform {
    type Clock: Clock;
    type Motion: MotionInput;
    type Link: NetworkLink;
    type Camera: CameraDriver;
    type Server: CaptureServer;
    type Store: StateStore;
    type System: SystemControl;
}
