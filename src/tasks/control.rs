// WardCam: Control Loop
//
// The single cooperative task that drives the node.  Each iteration:
//   1. re-assert Wi-Fi (restart the node if it cannot be brought up),
//   2. read the PIR and advance the motion latch,
//   3. power the camera up or down to follow the latch,
//   4. report the latch state to the database if it changed,
// then yields for CONTROL_LOOP_INTERVAL_MS.

use crate::camera::{CameraGate, CameraLifecycle};
use crate::config::*;
use crate::events::{LatchEdge, MotionSignal, MotionState};
use crate::input::MotionLatch;
use crate::network::ConnectivityGuard;
use crate::platform::*;
use crate::reporter::{DeliveryPolicy, ReportOutcome, StateReporter};

/// Concrete peripherals handed to the control loop at boot.
pub struct Board<P: Platform> {
    pub clock: P::Clock,
    pub motion: P::Motion,
    pub link: P::Link,
    pub camera: P::Camera,
    pub server: P::Server,
    /// Must be the gate the server's capture handler leases from.
    pub gate: CameraGate,
    pub store: P::Store,
    pub system: P::System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkCheck {
    #[default]
    Up,
    /// Connect attempt timed out, another one follows next iteration.
    Retrying { failures: u32 },
    /// Out of attempts, restart requested.
    Restarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAction {
    Started,
    StartFailed,
    Stopped,
}

/// Effects of one control-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Iteration {
    pub link: LinkCheck,
    pub edge: Option<LatchEdge>,
    pub camera: Option<CameraAction>,
    pub report: Option<ReportOutcome>,
}

pub struct ControlLoop<P: Platform> {
    clock: P::Clock,
    motion: P::Motion,
    link: P::Link,
    system: P::System,
    guard: ConnectivityGuard,
    latch: MotionLatch,
    camera: CameraLifecycle<P::Camera, P::Server>,
    reporter: StateReporter<P::Store>,
    link_failures: u32,
    max_link_attempts: u32,
}

impl<P: Platform> ControlLoop<P> {
    pub fn new(board: Board<P>, policy: DeliveryPolicy) -> Self {
        let camera = CameraLifecycle::new(
            board.camera,
            board.server,
            board.gate,
            crate::camera::CameraConfig::board_default(),
        );

        Self {
            clock: board.clock,
            motion: board.motion,
            link: board.link,
            system: board.system,
            guard: ConnectivityGuard::new(),
            latch: MotionLatch::new(),
            camera,
            reporter: StateReporter::new(board.store, MOTION_PATH, policy),
            link_failures: 0,
            max_link_attempts: WIFI_MAX_ATTEMPTS,
        }
    }

    /// Tolerate `attempts` timed-out connects before restarting.
    pub fn with_link_attempts(mut self, attempts: u32) -> Self {
        self.max_link_attempts = attempts.max(1);
        self
    }

    /// Power-up step: bring the link up before anything else runs.
    pub fn boot(&mut self) -> LinkCheck {
        let link = self.supervise_link();
        if link == LinkCheck::Up {
            log::info!("System ready, waiting for PIR motion to start camera");
        }
        link
    }

    /// Run forever.
    pub fn run(mut self) -> ! {
        loop {
            self.tick();
        }
    }

    /// One iteration followed by the cooperative yield.
    pub fn tick(&mut self) -> Iteration {
        let iteration = self.step();
        self.clock.sleep_ms(CONTROL_LOOP_INTERVAL_MS);
        iteration
    }

    /// One iteration, no yield.
    pub fn step(&mut self) -> Iteration {
        let mut iteration = Iteration {
            link: self.supervise_link(),
            ..Default::default()
        };
        if iteration.link != LinkCheck::Up {
            return iteration;
        }

        let now = self.clock.now_ms();
        let signal = self.motion.read();
        iteration.edge = self.latch.update(signal, now);
        let state = self.latch.state();

        // A fresh trigger is what (re)tries a failed start.
        if state == MotionState::Active
            && signal == MotionSignal::Present
            && !self.camera.is_powered_on()
        {
            iteration.camera = Some(match self.camera.start() {
                Ok(()) => {
                    log::info!("Camera enabled due to motion");
                    CameraAction::Started
                }
                Err(e) => {
                    log::error!("{:#}", e);
                    CameraAction::StartFailed
                }
            });
        } else if state == MotionState::Inactive && self.camera.is_powered_on() {
            if let Err(e) = self.camera.stop() {
                log::warn!("{:#}", e);
            }
            log::info!("Camera disabled due to inactivity");
            iteration.camera = Some(CameraAction::Stopped);
        }

        if self.reporter.needs_report(state) {
            iteration.report = Some(self.reporter.report(state));
        }

        iteration
    }

    fn supervise_link(&mut self) -> LinkCheck {
        match self.guard.ensure(&mut self.link, &self.clock) {
            Ok(_) => {
                self.link_failures = 0;
                LinkCheck::Up
            }
            Err(timeout) => {
                self.link_failures += 1;
                if self.link_failures < self.max_link_attempts {
                    log::warn!(
                        "{} (attempt {}/{})",
                        timeout,
                        self.link_failures,
                        self.max_link_attempts
                    );
                    return LinkCheck::Retrying {
                        failures: self.link_failures,
                    };
                }
                log::error!("{}, restarting...", timeout);
                self.link_failures = 0;
                self.system.restart();
                LinkCheck::Restarted
            }
        }
    }

    pub fn latch(&self) -> &MotionLatch {
        &self.latch
    }

    pub fn camera(&self) -> &CameraLifecycle<P::Camera, P::Server> {
        &self.camera
    }

    pub fn reporter(&self) -> &StateReporter<P::Store> {
        &self.reporter
    }

    #[cfg(test)]
    fn camera_mut(&mut self) -> &mut CameraLifecycle<P::Camera, P::Server> {
        &mut self.camera
    }
}
