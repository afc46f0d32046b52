// WardCam: OV2640 Camera Driver
//
// Thin wrapper over the esp32-camera component (bindings generated into
// `esp_idf_sys::camera` by the build).  The driver is a process-wide
// singleton inside ESP-IDF, so these types carry no state of their own.

use std::ptr::NonNull;

use esp_idf_sys::{camera, esp};

use crate::camera::{CameraConfig, FrameBufferLocation, FrameSize, GrabMode, PixelFormat};
use crate::platform::{CameraDriver, FrameBuffer, FrameSource};

#[derive(Debug, Default)]
pub struct EspCamera;

impl CameraDriver for EspCamera {
    fn init(&mut self, config: &CameraConfig) -> anyhow::Result<()> {
        let raw = raw_config(config);
        esp!(unsafe { camera::esp_camera_init(&raw) })?;
        log::info!(
            "OV2640 initialised ({:?}, {:?}, {} frame buffers)",
            config.frame_size,
            config.pixel_format,
            config.fb_count
        );
        Ok(())
    }

    fn deinit(&mut self) -> anyhow::Result<()> {
        esp!(unsafe { camera::esp_camera_deinit() })?;
        Ok(())
    }
}

fn raw_config(config: &CameraConfig) -> camera::camera_config_t {
    let pins = &config.pins;

    camera::camera_config_t {
        pin_pwdn: pins.pwdn,
        pin_reset: pins.reset,
        pin_xclk: pins.xclk,
        __bindgen_anon_1: camera::camera_config_t__bindgen_ty_1 {
            pin_sccb_sda: pins.sccb_sda,
        },
        __bindgen_anon_2: camera::camera_config_t__bindgen_ty_2 {
            pin_sccb_scl: pins.sccb_scl,
        },
        pin_d0: pins.data[0],
        pin_d1: pins.data[1],
        pin_d2: pins.data[2],
        pin_d3: pins.data[3],
        pin_d4: pins.data[4],
        pin_d5: pins.data[5],
        pin_d6: pins.data[6],
        pin_d7: pins.data[7],
        pin_vsync: pins.vsync,
        pin_href: pins.href,
        pin_pclk: pins.pclk,

        xclk_freq_hz: config.xclk_freq_hz,
        ledc_timer: esp_idf_sys::ledc_timer_t_LEDC_TIMER_0,
        ledc_channel: esp_idf_sys::ledc_channel_t_LEDC_CHANNEL_0,

        pixel_format: match config.pixel_format {
            PixelFormat::Jpeg => camera::pixformat_t_PIXFORMAT_JPEG,
        },
        frame_size: match config.frame_size {
            FrameSize::Qvga => camera::framesize_t_FRAMESIZE_QVGA,
        },
        jpeg_quality: config.jpeg_quality,
        fb_count: config.fb_count,
        fb_location: match config.fb_location {
            FrameBufferLocation::Psram => camera::camera_fb_location_t_CAMERA_FB_IN_PSRAM,
        },
        grab_mode: match config.grab_mode {
            GrabMode::Latest => camera::camera_grab_mode_t_CAMERA_GRAB_LATEST,
        },
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Frame buffers
// ---------------------------------------------------------------------------

/// Frame pool of the running driver.  Only touched from the HTTP handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct EspFrameSource;

/// One frame buffer checked out of the driver; handed back on drop.
pub struct EspFrame {
    fb: NonNull<camera::camera_fb_t>,
}

impl FrameSource for EspFrameSource {
    type Frame<'a> = EspFrame;

    fn acquire(&self) -> Option<EspFrame> {
        // Blocks until a frame is ready or the driver's own timeout fires.
        NonNull::new(unsafe { camera::esp_camera_fb_get() }).map(|fb| EspFrame { fb })
    }
}

impl FrameBuffer for EspFrame {
    fn data(&self) -> &[u8] {
        // SAFETY: the driver keeps `buf` valid until the buffer is returned,
        // which only happens in `drop`.
        unsafe {
            let fb = self.fb.as_ref();
            std::slice::from_raw_parts(fb.buf, fb.len)
        }
    }
}

impl Drop for EspFrame {
    fn drop(&mut self) {
        unsafe { camera::esp_camera_fb_return(self.fb.as_ptr()) }
    }
}
