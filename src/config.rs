// WardCam: Hardware & System Configuration
// Target: ESP32-S3-WROOM-CAM (Xtensa, 8 MB octal PSRAM)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_PIR: i32 = 1; // PIR motion sensor output (push-pull, active HIGH)

// Camera module (OV2640 on the DVP bus)
pub const CAM_PIN_PWDN: i32 = 38;
pub const CAM_PIN_RESET: i32 = -1; // not wired
pub const CAM_PIN_XCLK: i32 = 15;
pub const CAM_PIN_SIOD: i32 = 4; // SCCB data
pub const CAM_PIN_SIOC: i32 = 5; // SCCB clock
pub const CAM_PIN_D7: i32 = 16;
pub const CAM_PIN_D6: i32 = 17;
pub const CAM_PIN_D5: i32 = 18;
pub const CAM_PIN_D4: i32 = 12;
pub const CAM_PIN_D3: i32 = 10;
pub const CAM_PIN_D2: i32 = 8;
pub const CAM_PIN_D1: i32 = 9;
pub const CAM_PIN_D0: i32 = 11;
pub const CAM_PIN_VSYNC: i32 = 6;
pub const CAM_PIN_HREF: i32 = 7;
pub const CAM_PIN_PCLK: i32 = 13;

// ---------------------------------------------------------------------------
// Camera Tuning
// ---------------------------------------------------------------------------
pub const CAM_XCLK_FREQ_HZ: i32 = 10_000_000;
pub const CAM_JPEG_QUALITY: i32 = 12; // 0-63, lower is better
pub const CAM_FB_COUNT: usize = 2;    // double-buffered

// ---------------------------------------------------------------------------
// Capture Endpoint (HTTP)
// ---------------------------------------------------------------------------
pub const CAPTURE_URI: &str = "/capture";
pub const HTTP_PORT: u16 = 80;
pub const HTTP_MAX_URI_HANDLERS: usize = 4;
pub const HTTP_STACK_SIZE: usize = 8192;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const MOTION_HOLD_MS: u64 = 5000;          // trailing hold after last PIR trigger
pub const CONTROL_LOOP_INTERVAL_MS: u64 = 100;  // cooperative yield per iteration
pub const WIFI_CONNECT_TIMEOUT_MS: u64 = 3000;  // then restart
pub const WIFI_POLL_INTERVAL_MS: u64 = 250;
pub const DATABASE_TIMEOUT_MS: u64 = 10_000;

// Failed connection attempts tolerated before the node restarts itself.
pub const WIFI_MAX_ATTEMPTS: u32 = 1;

// ---------------------------------------------------------------------------
// Network & Remote Store
// ---------------------------------------------------------------------------
// Secrets are injected at build time, never committed.
pub const WIFI_SSID: &str = env_or(option_env!("WARDCAM_WIFI_SSID"), "");
pub const WIFI_PASSWORD: &str = env_or(option_env!("WARDCAM_WIFI_PASSWORD"), "");
pub const DATABASE_URL: &str = env_or(
    option_env!("WARDCAM_DATABASE_URL"),
    "preserving-fall-detector-default-rtdb.firebaseio.com",
);
pub const DATABASE_SECRET: &str = env_or(option_env!("WARDCAM_DATABASE_SECRET"), "");

/// Logical location of this node in the database tree.
pub const MOTION_PATH: &str = "/hospital_system/wards/ward_A/room_301/motion";

const fn env_or(value: Option<&'static str>, default: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => default,
    }
}
