//! Frame scheduling and lifecycle
//!
//! The scheduler hands out at most one live [`FrameHandle`] at a time. A frame only advances
//! the simulation when it presents the handle that is currently outstanding, so a callback
//! that fires after a pause (or a duplicate one) is recognised as stale and ignored.

use std::time::{Duration, Instant};

/// Token for one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started yet
    Idle,
    /// A frame is scheduled after every frame
    Running,
    /// Host hidden; no frame outstanding
    Paused,
    /// Reduced motion: one frame rendered, nothing ever scheduled
    Static,
    /// Shut down for good
    Stopped,
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    state: SchedulerState,
    outstanding: Option<FrameHandle>,
    next_handle: u64,
    last_timestamp: Option<Instant>,
    frame_interval: Duration,
    max_dt: f32,
}

impl FrameScheduler {
    pub fn new(frame_interval: Duration, max_dt: f32) -> Self {
        Self {
            state: SchedulerState::Idle,
            outstanding: None,
            next_handle: 0,
            last_timestamp: None,
            frame_interval,
            max_dt,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn outstanding(&self) -> Option<FrameHandle> {
        self.outstanding
    }

    /// Elapsed time as a multiple of the frame interval, clamped to `[0, max_dt]`
    pub fn normalize(&self, elapsed: Duration) -> f32 {
        let interval = self.frame_interval.as_secs_f32();
        if interval <= 0.0 {
            return 0.0;
        }
        (elapsed.as_secs_f32() / interval).clamp(0.0, self.max_dt)
    }

    fn schedule(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.outstanding = Some(handle);
        handle
    }

    /// Leave `Idle`. Reduced motion goes straight to `Static`; otherwise the first frame is
    /// scheduled and `now` becomes the time reference. Starting twice is a no-op.
    pub fn start(&mut self, now: Instant, reduced_motion: bool) -> Option<FrameHandle> {
        if self.state != SchedulerState::Idle {
            log::debug!("Scheduler already started ({:?})", self.state);
            return None;
        }

        self.last_timestamp = Some(now);
        if reduced_motion {
            self.state = SchedulerState::Static;
            None
        } else {
            self.state = SchedulerState::Running;
            Some(self.schedule())
        }
    }

    /// Cancel the outstanding frame. Only acts while running; repeated calls are no-ops.
    /// Returns the handle that was cancelled, if any.
    pub fn pause(&mut self) -> Option<FrameHandle> {
        if self.state != SchedulerState::Running {
            return None;
        }

        self.state = SchedulerState::Paused;
        self.outstanding.take()
    }

    /// Resume after a pause. The time reference is reset to `now` so the first frame back
    /// sees a small `dt` instead of the whole hidden duration.
    pub fn resume(&mut self, now: Instant) -> Option<FrameHandle> {
        if self.state != SchedulerState::Paused {
            return None;
        }

        self.state = SchedulerState::Running;
        self.last_timestamp = Some(now);
        Some(self.schedule())
    }

    pub fn stop(&mut self) {
        self.state = SchedulerState::Stopped;
        self.outstanding = None;
    }

    /// Consume `handle` and return the normalized `dt` since the previous frame, or `None`
    /// if the handle is stale or the scheduler is not running.
    pub fn begin_frame(&mut self, handle: FrameHandle, now: Instant) -> Option<f32> {
        if self.state != SchedulerState::Running || self.outstanding != Some(handle) {
            return None;
        }

        self.outstanding = None;
        let elapsed = self
            .last_timestamp
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or_default();
        self.last_timestamp = Some(now);
        Some(self.normalize(elapsed))
    }

    /// Schedule the next frame if still running and nothing is outstanding
    pub fn schedule_next(&mut self) -> Option<FrameHandle> {
        if self.state != SchedulerState::Running {
            return None;
        }

        match self.outstanding {
            Some(handle) => Some(handle),
            None => Some(self.schedule()),
        }
    }
}
