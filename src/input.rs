// WardCam: PIR Motion Latch
//
// Converts the noisy PIR output into a stable "motion active" flag.  A single
// HIGH reading latches the state on; it only drops again once the sensor has
// been quiet for the whole hold window.  Polled once per control-loop
// iteration, no timers of its own.

use crate::config::MOTION_HOLD_MS;
use crate::events::{LatchEdge, MotionSignal, MotionState};

#[derive(Debug, Clone)]
pub struct MotionLatch {
    state: MotionState,
    last_trigger_ms: u64,
    hold_ms: u64,
}

impl MotionLatch {
    pub fn new() -> Self {
        Self::with_hold(MOTION_HOLD_MS)
    }

    pub fn with_hold(hold_ms: u64) -> Self {
        Self {
            state: MotionState::Inactive,
            last_trigger_ms: 0,
            hold_ms,
        }
    }

    /// Advance the latch with one raw reading taken at `now_ms`.
    ///
    /// Returns the edge this reading caused, if any.
    pub fn update(&mut self, signal: MotionSignal, now_ms: u64) -> Option<LatchEdge> {
        match (self.state, signal) {
            (_, MotionSignal::Present) => {
                self.last_trigger_ms = now_ms;
                if self.state == MotionState::Inactive {
                    self.state = MotionState::Active;
                    return Some(LatchEdge::Activated);
                }
                None
            }
            (MotionState::Active, MotionSignal::Absent) => {
                let quiet_ms = now_ms.saturating_sub(self.last_trigger_ms);
                if quiet_ms >= self.hold_ms {
                    self.state = MotionState::Inactive;
                    Some(LatchEdge::Released)
                } else {
                    // Still inside the hold window.
                    None
                }
            }
            (MotionState::Inactive, MotionSignal::Absent) => None,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Timestamp of the most recent "present" reading.
    pub fn last_trigger_ms(&self) -> u64 {
        self.last_trigger_ms
    }
}

impl Default for MotionLatch {
    fn default() -> Self {
        Self::new()
    }
}
