// WardCam: Camera Lifecycle Manager
//
// Owns the image sensor driver and the capture server as one unit: they are
// powered up together on motion and torn down together when the latch
// releases.  The gate shared with the HTTP handlers makes teardown wait for
// any request that is still holding a frame.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use anyhow::Context;

use crate::config::*;
use crate::platform::{CameraDriver, CaptureServer};

// ---------------------------------------------------------------------------
// Fixed sensor configuration
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSize {
    /// 320x240
    Qvga,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    /// Always hand out the newest frame, dropping stale ones.
    Latest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBufferLocation {
    Psram,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraPins {
    pub pwdn: i32,
    pub reset: i32,
    pub xclk: i32,
    pub sccb_sda: i32,
    pub sccb_scl: i32,
    /// D0..D7
    pub data: [i32; 8],
    pub vsync: i32,
    pub href: i32,
    pub pclk: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConfig {
    pub pins: CameraPins,
    pub xclk_freq_hz: i32,
    pub pixel_format: PixelFormat,
    pub frame_size: FrameSize,
    pub jpeg_quality: i32,
    pub fb_count: usize,
    pub fb_location: FrameBufferLocation,
    pub grab_mode: GrabMode,
}

impl CameraConfig {
    /// Configuration of the ESP32-S3-WROOM-CAM board.
    pub const fn board_default() -> Self {
        Self {
            pins: CameraPins {
                pwdn: CAM_PIN_PWDN,
                reset: CAM_PIN_RESET,
                xclk: CAM_PIN_XCLK,
                sccb_sda: CAM_PIN_SIOD,
                sccb_scl: CAM_PIN_SIOC,
                data: [
                    CAM_PIN_D0, CAM_PIN_D1, CAM_PIN_D2, CAM_PIN_D3,
                    CAM_PIN_D4, CAM_PIN_D5, CAM_PIN_D6, CAM_PIN_D7,
                ],
                vsync: CAM_PIN_VSYNC,
                href: CAM_PIN_HREF,
                pclk: CAM_PIN_PCLK,
            },
            xclk_freq_hz: CAM_XCLK_FREQ_HZ,
            pixel_format: PixelFormat::Jpeg,
            frame_size: FrameSize::Qvga,
            jpeg_quality: CAM_JPEG_QUALITY,
            fb_count: CAM_FB_COUNT,
            fb_location: FrameBufferLocation::Psram,
            grab_mode: GrabMode::Latest,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::board_default()
    }
}

// ---------------------------------------------------------------------------
// Gate between the control loop and the HTTP handler context
// ---------------------------------------------------------------------------

/// Shared "driver is usable" flag.
///
/// Handlers hold a read lease for the whole acquire/send/return of a frame.
/// Teardown takes the write side, so it blocks until in-flight requests have
/// returned their buffers, and every later request sees the gate closed.
#[derive(Debug, Clone, Default)]
pub struct CameraGate {
    ready: Arc<RwLock<bool>>,
}

/// Proof that the driver stays initialized while held.
pub struct CameraLease<'a> {
    _guard: RwLockReadGuard<'a, bool>,
}

impl CameraGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a read lease if the driver is up.
    pub fn lease(&self) -> Option<CameraLease<'_>> {
        let guard = self.ready.read().unwrap_or_else(PoisonError::into_inner);
        if *guard {
            Some(CameraLease { _guard: guard })
        } else {
            None
        }
    }

    pub fn is_open(&self) -> bool {
        *self.ready.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) {
        *self.ready.write().unwrap_or_else(PoisonError::into_inner) = true;
    }

    /// Close the gate and run `teardown` while no lease can exist.
    fn close_with<R>(&self, teardown: impl FnOnce() -> R) -> R {
        let mut ready = self.ready.write().unwrap_or_else(PoisonError::into_inner);
        *ready = false;
        teardown()
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------
pub struct CameraLifecycle<D, S> {
    driver: D,
    server: S,
    gate: CameraGate,
    config: CameraConfig,
    powered_on: bool,
}

impl<D: CameraDriver, S: CaptureServer> CameraLifecycle<D, S> {
    /// `gate` must be the same gate the server's handlers lease from.
    pub fn new(driver: D, server: S, gate: CameraGate, config: CameraConfig) -> Self {
        Self {
            driver,
            server,
            gate,
            config,
            powered_on: false,
        }
    }

    pub fn is_powered_on(&self) -> bool {
        self.powered_on
    }

    pub fn gate(&self) -> &CameraGate {
        &self.gate
    }

    /// Initialize the sensor, then start the capture server.
    ///
    /// No-op if already running.  On failure nothing is left running.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.powered_on {
            return Ok(());
        }

        self.driver
            .init(&self.config)
            .context("camera init failed")?;
        self.gate.open();

        if let Err(e) = self.server.start() {
            let driver = &mut self.driver;
            if let Err(deinit_err) = self.gate.close_with(|| driver.deinit()) {
                log::warn!("Camera deinit after failed server start: {:#}", deinit_err);
            }
            return Err(e.context("capture server failed to start"));
        }

        self.powered_on = true;
        log::info!("Camera started");
        Ok(())
    }

    /// Stop the capture server, then release the sensor.
    ///
    /// No-op if not running.  The resource counts as off afterwards even if
    /// the driver reported an error.
    pub fn stop(&mut self) -> anyhow::Result<()> {
        if !self.powered_on {
            return Ok(());
        }

        // Endpoint first: nothing new may reach the driver while it goes away.
        if let Err(e) = self.server.stop() {
            log::warn!("HTTP server stop failed: {:#}", e);
        }

        let driver = &mut self.driver;
        let result = self.gate.close_with(|| driver.deinit());
        self.powered_on = false;
        log::info!("Camera stopped");

        result.context("camera deinit failed")
    }

    #[cfg(test)]
    pub(crate) fn parts(&self) -> (&D, &S) {
        (&self.driver, &self.server)
    }

    #[cfg(test)]
    pub(crate) fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
