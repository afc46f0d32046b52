// WardCam: State Reporter
//
// Pushes the debounced motion state to the remote database, but only when it
// differs from the last value handed to the store.

use crate::events::{MotionPayload, MotionState};
use crate::platform::StateStore;

/// What the reporter remembers after a push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Fire and forget: every attempt counts as sent, even when the store
    /// was not ready or the write failed.  A lost value is only corrected by
    /// the next state change.
    #[default]
    AtMostOnce,
    /// Only a successful write counts; anything else is retried on the next
    /// call with the same value.
    UntilAcknowledged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Sent,
    /// Store not ready, value dropped.
    Skipped,
    Failed,
}

pub struct StateReporter<S> {
    store: S,
    path: &'static str,
    policy: DeliveryPolicy,
    last_sent: Option<u8>,
}

/// REST address of a database node: `https://<host><path>.json`, with the
/// legacy secret appended as `auth` when one is configured.
pub fn rest_url(host: &str, path: &str, secret: &str) -> String {
    if secret.is_empty() {
        format!("https://{}{}.json", host, path)
    } else {
        format!("https://{}{}.json?auth={}", host, path, secret)
    }
}

impl<S: StateStore> StateReporter<S> {
    pub fn new(store: S, path: &'static str, policy: DeliveryPolicy) -> Self {
        Self {
            store,
            path,
            policy,
            last_sent: None,
        }
    }

    /// `true` when `state` differs from the last value handed to the store.
    pub fn needs_report(&self, state: MotionState) -> bool {
        self.last_sent != Some(state.report_value())
    }

    pub fn last_sent(&self) -> Option<u8> {
        self.last_sent
    }

    pub fn policy(&self) -> DeliveryPolicy {
        self.policy
    }

    /// Push `state` to the store and update the bookkeeping per policy.
    pub fn report(&mut self, state: MotionState) -> ReportOutcome {
        let payload = MotionPayload::from(state);
        let outcome = self.push(payload);

        if outcome == ReportOutcome::Sent || self.policy == DeliveryPolicy::AtMostOnce {
            self.last_sent = Some(payload.val);
        }
        outcome
    }

    fn push(&mut self, payload: MotionPayload) -> ReportOutcome {
        if !self.store.is_ready() {
            log::debug!("Database not ready, dropping motion {}", payload.val);
            return ReportOutcome::Skipped;
        }

        let body = match serde_json::to_vec(&payload) {
            Ok(body) => body,
            Err(e) => {
                log::error!("Motion payload encode failed: {}", e);
                return ReportOutcome::Failed;
            }
        };

        match self.store.set_json(self.path, &body) {
            Ok(()) => {
                log::info!("Motion {} -> database ok", payload.val);
                ReportOutcome::Sent
            }
            Err(e) => {
                log::warn!("Database update failed: {:#}", e);
                ReportOutcome::Failed
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
