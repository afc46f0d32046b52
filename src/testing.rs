// WardCam: In-Memory Board Doubles
//
// Host-side stand-ins for every platform trait, recording into one journal.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};

use crate::camera::CameraConfig;
use crate::events::MotionSignal;
use crate::platform::*;

// ---------------------------------------------------------------------------
// Shared journal of side effects, in call order
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEntry {
    CameraInit,
    CameraDeinit,
    ServerStart,
    ServerStop,
    StoreWrite { path: String, body: String },
    LinkConnect,
    Restart,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<JournalEntry>>>);

impl Journal {
    pub fn push(&self, entry: JournalEntry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: JournalEntry) -> usize {
        self.0.borrow().iter().filter(|e| **e == entry).count()
    }

    pub fn writes(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                JournalEntry::StoreWrite { body, .. } => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Manual clock; sleeping advances time.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
}

impl MockClock {
    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

// ---------------------------------------------------------------------------
// PIR
// ---------------------------------------------------------------------------

/// PIR whose level is set from the test.
#[derive(Debug, Clone)]
pub struct MockMotion {
    level: Rc<Cell<bool>>,
}

impl MockMotion {
    pub fn new() -> Self {
        Self {
            level: Rc::new(Cell::new(false)),
        }
    }

    pub fn set(&self, present: bool) {
        self.level.set(present);
    }
}

impl MotionInput for MockMotion {
    fn read(&mut self) -> MotionSignal {
        MotionSignal::from_level(self.level.get())
    }
}

// ---------------------------------------------------------------------------
// Network link
// ---------------------------------------------------------------------------

/// Link that comes up after a configurable number of polls.
pub struct MockLink {
    journal: Journal,
    connected: Rc<Cell<bool>>,
    /// `None` = never connects.
    polls_until_up: Option<u32>,
    pending: Option<u32>,
    reject_connect: bool,
}

impl MockLink {
    pub fn up(journal: Journal) -> Self {
        Self {
            journal,
            connected: Rc::new(Cell::new(true)),
            polls_until_up: Some(0),
            pending: None,
            reject_connect: false,
        }
    }

    pub fn after_polls(journal: Journal, polls: u32) -> Self {
        Self {
            journal,
            connected: Rc::new(Cell::new(false)),
            polls_until_up: Some(polls),
            pending: None,
            reject_connect: false,
        }
    }

    pub fn never(journal: Journal) -> Self {
        Self {
            journal,
            connected: Rc::new(Cell::new(false)),
            polls_until_up: None,
            pending: None,
            reject_connect: false,
        }
    }

    /// Connect requests return an error, but association still completes
    /// after `polls` status checks.
    pub fn rejecting(journal: Journal, polls: u32) -> Self {
        Self {
            reject_connect: true,
            ..Self::after_polls(journal, polls)
        }
    }

    /// Handle to drop the link from the outside.
    pub fn connected_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.connected)
    }
}

impl NetworkLink for MockLink {
    fn is_connected(&mut self) -> bool {
        if self.connected.get() {
            return true;
        }
        if let Some(left) = self.pending.as_mut() {
            if *left == 0 {
                self.connected.set(true);
                self.pending = None;
            } else {
                *left -= 1;
            }
        }
        self.connected.get()
    }

    fn begin_connect(&mut self) -> Result<()> {
        self.journal.push(JournalEntry::LinkConnect);
        self.pending = self.polls_until_up;
        if self.reject_connect {
            return Err(anyhow!("connect rejected"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Camera driver & server
// ---------------------------------------------------------------------------
pub struct MockCamera {
    journal: Journal,
    initialized: bool,
    fail_init: bool,
    fail_deinit: bool,
    last_config: Option<CameraConfig>,
}

impl MockCamera {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            initialized: false,
            fail_init: false,
            fail_deinit: false,
            last_config: None,
        }
    }

    pub fn fail_next_init(&mut self) {
        self.fail_init = true;
    }

    pub fn fail_next_deinit(&mut self) {
        self.fail_deinit = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn last_config(&self) -> Option<CameraConfig> {
        self.last_config
    }
}

impl CameraDriver for MockCamera {
    fn init(&mut self, config: &CameraConfig) -> Result<()> {
        if std::mem::take(&mut self.fail_init) {
            return Err(anyhow!("sensor not detected"));
        }
        self.journal.push(JournalEntry::CameraInit);
        self.initialized = true;
        self.last_config = Some(*config);
        Ok(())
    }

    fn deinit(&mut self) -> Result<()> {
        self.journal.push(JournalEntry::CameraDeinit);
        self.initialized = false;
        if std::mem::take(&mut self.fail_deinit) {
            return Err(anyhow!("deinit returned ESP_FAIL"));
        }
        Ok(())
    }
}

pub struct MockServer {
    journal: Journal,
    listening: bool,
    fail_start: bool,
}

impl MockServer {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            listening: false,
            fail_start: false,
        }
    }

    pub fn fail_next_start(&mut self) {
        self.fail_start = true;
    }
}

impl CaptureServer for MockServer {
    fn start(&mut self) -> Result<()> {
        if std::mem::take(&mut self.fail_start) {
            return Err(anyhow!("httpd_start failed"));
        }
        self.journal.push(JournalEntry::ServerStart);
        self.listening = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.journal.push(JournalEntry::ServerStop);
        self.listening = false;
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.listening
    }
}

// ---------------------------------------------------------------------------
// Frame pool
// ---------------------------------------------------------------------------

/// Pool of `slots` identical frames; tracks how many are lent out.
pub struct MockFrames {
    jpeg: Vec<u8>,
    slots: usize,
    outstanding: AtomicUsize,
}

pub struct MockFrame<'a> {
    pool: &'a MockFrames,
}

impl MockFrames {
    pub fn new(jpeg: &[u8], slots: usize) -> Self {
        Self {
            jpeg: jpeg.to_vec(),
            slots,
            outstanding: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(&[], 0)
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

impl FrameSource for MockFrames {
    type Frame<'a> = MockFrame<'a>;

    fn acquire(&self) -> Option<MockFrame<'_>> {
        let taken = self.outstanding.fetch_add(1, Ordering::SeqCst);
        if taken >= self.slots {
            self.outstanding.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(MockFrame { pool: self })
    }
}

impl FrameBuffer for MockFrame<'_> {
    fn data(&self) -> &[u8] {
        &self.pool.jpeg
    }
}

impl Drop for MockFrame<'_> {
    fn drop(&mut self) {
        self.pool.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Remote store
// ---------------------------------------------------------------------------
pub struct MockStore {
    journal: Journal,
    ready: bool,
    failures: VecDeque<bool>,
}

impl MockStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            ready: true,
            failures: VecDeque::new(),
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Queue the outcome of upcoming writes (`true` = fail).
    pub fn script_failures(&mut self, outcomes: &[bool]) {
        self.failures.extend(outcomes.iter().copied());
    }
}

impl StateStore for MockStore {
    fn is_ready(&mut self) -> bool {
        self.ready
    }

    fn set_json(&mut self, path: &str, body: &[u8]) -> Result<()> {
        self.journal.push(JournalEntry::StoreWrite {
            path: path.to_owned(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
        if self.failures.pop_front().unwrap_or(false) {
            return Err(anyhow!("HTTP 503"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------
pub struct MockSystem {
    journal: Journal,
}

impl MockSystem {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }
}

impl SystemControl for MockSystem {
    fn restart(&mut self) {
        self.journal.push(JournalEntry::Restart);
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------
pub struct MockPlatform;

impl Platform for MockPlatform {
    type Clock = MockClock;
    type Motion = MockMotion;
    type Link = MockLink;
    type Camera = MockCamera;
    type Server = MockServer;
    type Store = MockStore;
    type System = MockSystem;
}
