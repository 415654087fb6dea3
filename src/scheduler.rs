//! Timer abstraction driving the session.
//!
//! The session never owns callbacks. It asks the scheduler for handles and the
//! host (browser event loop or a test) reports each firing back through
//! `GameSession::on_trigger`. Handles the session no longer holds are ignored,
//! which is what keeps a cancelled interval or a late animation frame from
//! touching a finished round.

use std::collections::BTreeSet;

/// Opaque id of a scheduled trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(pub u32);

pub trait Scheduler {
    /// Fire repeatedly every `period_ms` until cancelled.
    fn schedule_periodic(&mut self, period_ms: u32) -> TimerHandle;
    /// Fire once on the next animation frame.
    fn schedule_next_frame(&mut self) -> TimerHandle;
    fn cancel(&mut self, handle: TimerHandle);
    /// Current time in milliseconds on the same clock frames are stamped with.
    fn now_ms(&self) -> f64;
}

/// Deterministic scheduler for native drivers and tests.
///
/// Time only moves when `advance` is called; firings are collected rather than
/// delivered so the caller decides when to hand them to the session.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: f64,
    next_id: u32,
    periodic: Vec<Periodic>,
    frames: BTreeSet<TimerHandle>,
}

#[derive(Debug)]
struct Periodic {
    handle: TimerHandle,
    period_ms: f64,
    next_due: f64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: f64) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    fn next_handle(&mut self) -> TimerHandle {
        self.next_id += 1;
        TimerHandle(self.next_id)
    }

    /// Move the clock forward and return every periodic firing that became due,
    /// in time order. Pending frames are not included; see `take_frames`.
    pub fn advance(&mut self, ms: f64) -> Vec<TimerHandle> {
        let target = self.now + ms;
        let mut due: Vec<(f64, TimerHandle)> = Vec::new();
        for p in &mut self.periodic {
            while p.next_due <= target {
                due.push((p.next_due, p.handle));
                p.next_due += p.period_ms;
            }
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        self.now = target;
        due.into_iter().map(|(_, h)| h).collect()
    }

    /// Drain the frames requested since the last call.
    pub fn take_frames(&mut self) -> Vec<TimerHandle> {
        std::mem::take(&mut self.frames).into_iter().collect()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.frames.contains(&handle) || self.periodic.iter().any(|p| p.handle == handle)
    }

    /// Number of outstanding periodic timers and frame requests.
    pub fn pending(&self) -> usize {
        self.periodic.len() + self.frames.len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_periodic(&mut self, period_ms: u32) -> TimerHandle {
        let handle = self.next_handle();
        let period_ms = f64::from(period_ms.max(1));
        self.periodic.push(Periodic {
            handle,
            period_ms,
            next_due: self.now + period_ms,
        });
        handle
    }

    fn schedule_next_frame(&mut self) -> TimerHandle {
        let handle = self.next_handle();
        self.frames.insert(handle);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.periodic.retain(|p| p.handle != handle);
        self.frames.remove(&handle);
    }

    fn now_ms(&self) -> f64 {
        self.now
    }
}
