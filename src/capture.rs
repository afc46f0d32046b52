// WardCam: Capture Endpoint
//
// Transport-independent half of `GET /capture`.  The HTTP driver adapts its
// request type to `CaptureResponder` and calls `serve_capture` from the
// server's handler task.

use crate::camera::CameraGate;
use crate::platform::{FrameBuffer, FrameSource};

/// Response headers for a successful capture.
pub const CAPTURE_HEADERS: [(&str, &str); 3] = [
    ("Content-Type", "image/jpeg"),
    ("Content-Disposition", "inline; filename=capture.jpg"),
    ("Access-Control-Allow-Origin", "*"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// 200, frame sent.
    Served { bytes: usize },
    /// 500, camera off or no frame buffer available.
    Unavailable,
}

impl CaptureStatus {
    pub fn http_status(self) -> u16 {
        match self {
            Self::Served { .. } => 200,
            Self::Unavailable => 500,
        }
    }
}

/// Consumes a request by writing exactly one response.
pub trait CaptureResponder {
    fn send_frame(self, headers: &[(&str, &str)], body: &[u8]) -> anyhow::Result<()>;
    fn send_server_error(self) -> anyhow::Result<()>;
}

/// Serve one capture request.
///
/// The frame is only borrowed: it goes back to the driver pool when this
/// returns, whether or not sending succeeded.
pub fn serve_capture<F, R>(gate: &CameraGate, frames: &F, responder: R) -> anyhow::Result<CaptureStatus>
where
    F: FrameSource,
    R: CaptureResponder,
{
    let Some(_lease) = gate.lease() else {
        log::warn!("Capture requested while camera is off");
        responder.send_server_error()?;
        return Ok(CaptureStatus::Unavailable);
    };

    let Some(frame) = frames.acquire() else {
        log::warn!("Camera capture failed");
        responder.send_server_error()?;
        return Ok(CaptureStatus::Unavailable);
    };

    let body = frame.data();
    responder.send_frame(&CAPTURE_HEADERS, body)?;
    Ok(CaptureStatus::Served { bytes: body.len() })
}
