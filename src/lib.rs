// WardCam: Motion-Gated Camera Node
//
// Control logic for an ESP32-S3-CAM ward-room node: a PIR sensor latches a
// motion state, the camera and its `/capture` endpoint follow that state, and
// every change is pushed to the Firebase Realtime Database.
//
// Everything outside `drivers` is plain Rust and runs on the host, so the
// state machines are tested without hardware.

pub mod camera;
pub mod capture;
pub mod config;
pub mod events;
pub mod input;
pub mod network;
pub mod platform;
pub mod reporter;
pub mod tasks;

#[cfg(target_os = "espidf")]
pub mod drivers;

#[cfg(test)]
mod testing;
