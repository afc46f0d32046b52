// WardCam: ESP-IDF board drivers
//
// Implementations of the `platform` traits for the ESP32-S3-WROOM-CAM.

pub mod camera;
pub mod firebase;
pub mod http;
pub mod pir;
pub mod system;
pub mod wifi;

use crate::platform::Platform;

pub struct EspPlatform;

impl Platform for EspPlatform {
    type Clock = system::EspClock;
    type Motion = pir::PirSensor<'static>;
    type Link = wifi::WifiLink;
    type Camera = camera::EspCamera;
    type Server = http::EspCaptureServer;
    type Store = firebase::RealtimeDb;
    type System = system::EspSystem;
}
