// WardCam: Clock & Process Control

use std::thread;
use std::time::Duration;

use crate::platform::{Clock, SystemControl};

// ---------------------------------------------------------------------------
// Utility: milliseconds since boot
// ---------------------------------------------------------------------------
pub fn now_ms() -> u64 {
    unsafe { (esp_idf_sys::esp_timer_get_time() / 1000) as u64 }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EspClock;

impl Clock for EspClock {
    fn now_ms(&self) -> u64 {
        now_ms()
    }

    /// Maps to a FreeRTOS delay, so other tasks (HTTP server, Wi-Fi) run.
    fn sleep_ms(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EspSystem;

impl SystemControl for EspSystem {
    fn restart(&mut self) {
        log::warn!("Restarting node");
        unsafe {
            esp_idf_sys::esp_restart();
        }
    }
}
