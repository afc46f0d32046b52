// WardCam: Motion Events & Data Types

use serde::Serialize;

// ---------------------------------------------------------------------------
// Raw PIR reading
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionSignal {
    Present,
    Absent,
}

impl MotionSignal {
    /// Map a digital pin level to a reading (the PIR drives HIGH on motion).
    pub fn from_level(high: bool) -> Self {
        if high {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

// ---------------------------------------------------------------------------
// Debounced motion state
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    #[default]
    Inactive,
    Active,
}

impl MotionState {
    /// Value pushed to the remote store (`0` or `1`).
    pub fn report_value(self) -> u8 {
        match self {
            Self::Inactive => 0,
            Self::Active => 1,
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Transition produced by a single latch update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchEdge {
    /// Inactive -> Active.
    Activated,
    /// Active -> Inactive, hold window expired.
    Released,
}

// ---------------------------------------------------------------------------
// Remote store payload
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MotionPayload {
    pub val: u8,
}

impl From<MotionState> for MotionPayload {
    fn from(state: MotionState) -> Self {
        Self {
            val: state.report_value(),
        }
    }
}
