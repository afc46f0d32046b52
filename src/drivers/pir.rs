// WardCam: PIR Motion Sensor Driver
//
// Digital-output PIR module (HC-SR501 class), polled.  The module does its own
// retriggering; debouncing is left to the motion latch.

use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};

use crate::events::MotionSignal;
use crate::platform::MotionInput;

pub struct PirSensor<'d> {
    pin: PinDriver<'d, AnyInputPin, Input>,
}

impl<'d> PirSensor<'d> {
    pub fn new(pin: PinDriver<'d, AnyInputPin, Input>) -> Self {
        Self { pin }
    }
}

impl MotionInput for PirSensor<'_> {
    fn read(&mut self) -> MotionSignal {
        MotionSignal::from_level(self.pin.is_high())
    }
}
