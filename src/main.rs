// WardCam: Firmware Entry Point
//
// Boot sequence:
//   1. Initialise logging, take peripherals, system event loop and NVS.
//   2. Configure the PIR input and the Wi-Fi station.
//   3. Bring the link up (the node restarts if it cannot within 3 s).
//   4. Run the control loop forever; the camera and its /capture endpoint
//      only exist while motion is latched.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::gpio::{InputPin, PinDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use wardcam::camera::CameraGate;
    use wardcam::config::*;
    use wardcam::drivers::camera::EspCamera;
    use wardcam::drivers::firebase::RealtimeDb;
    use wardcam::drivers::http::EspCaptureServer;
    use wardcam::drivers::pir::PirSensor;
    use wardcam::drivers::system::{EspClock, EspSystem};
    use wardcam::drivers::wifi::WifiLink;
    use wardcam::drivers::EspPlatform;
    use wardcam::reporter::DeliveryPolicy;
    use wardcam::tasks::control::{Board, ControlLoop};

    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("WardCam firmware starting…");

    // ---- Peripherals ------------------------------------------------------
    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // PIR output (GPIO1), driven push-pull by the module.
    let pir = PinDriver::input(peripherals.pins.gpio1.downgrade_input())?;
    log::info!("PIR on GPIO{}", PIN_PIR);

    let link = WifiLink::new(peripherals.modem, sys_loop, nvs)?;

    // ---- Control loop -----------------------------------------------------
    // The HTTP handler and the lifecycle manager share one gate.
    let gate = CameraGate::new();
    let board = Board::<EspPlatform> {
        clock: EspClock,
        motion: PirSensor::new(pir),
        link,
        camera: EspCamera,
        server: EspCaptureServer::new(gate.clone()),
        gate,
        store: RealtimeDb::new(DATABASE_URL, DATABASE_SECRET),
        system: EspSystem,
    };

    let mut node = ControlLoop::new(board, DeliveryPolicy::AtMostOnce);
    node.boot();
    node.run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("wardcam is ESP-IDF firmware; build it for the xtensa-esp32s3-espidf target");
    std::process::exit(1);
}
