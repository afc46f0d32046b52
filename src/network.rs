// WardCam: Connectivity Guard
//
// Makes sure the Wi-Fi link is up before the node does anything else.  The
// guard itself only waits with a bound; deciding to restart the node is left
// to the caller (see `tasks::control`).

use std::fmt;

use crate::config::*;
use crate::platform::{Clock, NetworkLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    AlreadyUp,
    Connected { waited_ms: u64 },
}

/// The link did not come up within the connect timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTimeout {
    pub waited_ms: u64,
}

impl fmt::Display for LinkTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WiFi connect timeout after {} ms", self.waited_ms)
    }
}

impl std::error::Error for LinkTimeout {}

#[derive(Debug, Clone, Copy)]
pub struct ConnectivityGuard {
    timeout_ms: u64,
    poll_ms: u64,
}

impl ConnectivityGuard {
    pub fn new() -> Self {
        Self::with_timing(WIFI_CONNECT_TIMEOUT_MS, WIFI_POLL_INTERVAL_MS)
    }

    pub fn with_timing(timeout_ms: u64, poll_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_ms: poll_ms.max(1),
        }
    }

    /// Return once the link is up, or fail after the connect timeout.
    pub fn ensure<L, C>(&self, link: &mut L, clock: &C) -> Result<LinkStatus, LinkTimeout>
    where
        L: NetworkLink,
        C: Clock,
    {
        if link.is_connected() {
            return Ok(LinkStatus::AlreadyUp);
        }

        log::info!("Connecting WiFi");
        if let Err(e) = link.begin_connect() {
            // Keep polling anyway: association may already be in progress.
            log::warn!("WiFi connect request failed: {:#}", e);
        }

        let start = clock.now_ms();
        loop {
            let waited_ms = clock.now_ms().saturating_sub(start);
            if link.is_connected() {
                log::info!("WiFi connected after {} ms", waited_ms);
                return Ok(LinkStatus::Connected { waited_ms });
            }
            if waited_ms > self.timeout_ms {
                log::error!("WiFi connect timeout ({} ms)", self.timeout_ms);
                return Err(LinkTimeout { waited_ms });
            }
            log::debug!("WiFi still connecting ({} ms)", waited_ms);
            clock.sleep_ms(self.poll_ms);
        }
    }
}

impl Default for ConnectivityGuard {
    fn default() -> Self {
        Self::new()
    }
}
