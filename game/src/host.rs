//! Frame scheduling primitives the game loop runs on.
//!
//! A [`FrameHost`] plays the role of the display's "request next frame"
//! service: the loop requests a frame, the host later delivers it with a
//! timestamp, and a pending request can be cancelled before delivery.

/// Handle of a requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest(u64);

impl FrameRequest {
    /// Wraps a raw request number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw request number.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Frame delivered by a host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Request the frame answers.
    pub request: FrameRequest,
    /// Host timestamp in milliseconds. Non-decreasing across frames.
    pub timestamp_ms: f64,
}

/// Source of frame callbacks.
pub trait FrameHost {
    /// Schedules a frame and returns its handle.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraws `request` if it has not been delivered yet.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Delivers the pending frame, if one is due.
    fn next_frame(&mut self) -> Option<Frame>;
}

#[derive(Clone, Copy, Debug, Default)]
struct RequestSlot {
    next: u64,
    pending: Option<FrameRequest>,
}

impl RequestSlot {
    fn request(&mut self) -> FrameRequest {
        let request = FrameRequest(self.next);
        self.next += 1;
        self.pending = Some(request);
        request
    }

    fn cancel(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

/// Deterministic host ticking at a fixed interval, for headless runs and tests.
#[derive(Clone, Debug)]
pub struct FixedRateHost {
    slot: RequestSlot,
    now_ms: f64,
    interval_ms: f64,
    budget: Option<u64>,
}

impl FixedRateHost {
    /// Creates a host whose first frame is stamped `start_ms`.
    #[must_use]
    pub fn new(start_ms: f64, interval_ms: f64) -> Self {
        Self {
            slot: RequestSlot::default(),
            now_ms: start_ms,
            interval_ms: interval_ms.max(0.0),
            budget: None,
        }
    }

    /// Stops delivering frames after `frames` deliveries.
    #[must_use]
    pub fn with_frame_budget(mut self, frames: u64) -> Self {
        self.budget = Some(frames);
        self
    }

    /// Advances the host clock without delivering a frame.
    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms.max(0.0);
    }

    /// Timestamp the next frame will carry.
    #[must_use]
    pub const fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Frames still allowed, if a budget was set.
    #[must_use]
    pub const fn remaining_budget(&self) -> Option<u64> {
        self.budget
    }
}

impl FrameHost for FixedRateHost {
    fn request_frame(&mut self) -> FrameRequest {
        self.slot.request()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.slot.cancel(request);
    }

    fn next_frame(&mut self) -> Option<Frame> {
        if self.budget == Some(0) {
            return None;
        }
        let request = self.slot.pending.take()?;
        if let Some(budget) = self.budget.as_mut() {
            *budget -= 1;
        }
        let frame = Frame {
            request,
            timestamp_ms: self.now_ms,
        };
        self.now_ms += self.interval_ms;
        Some(frame)
    }
}

/// Host fed by an external display loop that stages one timestamp per refresh.
#[derive(Clone, Debug, Default)]
pub struct DisplayHost {
    slot: RequestSlot,
    staged: Option<f64>,
}

impl DisplayHost {
    /// Creates a host with nothing staged.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the timestamp of the display refresh that is about to run.
    pub fn stage(&mut self, timestamp_ms: f64) {
        self.staged = Some(timestamp_ms);
    }
}

impl FrameHost for DisplayHost {
    fn request_frame(&mut self) -> FrameRequest {
        self.slot.request()
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.slot.cancel(request);
    }

    fn next_frame(&mut self) -> Option<Frame> {
        let timestamp_ms = self.staged?;
        let request = self.slot.pending.take()?;
        self.staged = None;
        Some(Frame {
            request,
            timestamp_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_rate_host_only_delivers_requested_frames() {
        let mut host = FixedRateHost::new(0.0, 16.0);
        assert_eq!(host.next_frame(), None);

        let request = host.request_frame();
        assert_eq!(
            host.next_frame(),
            Some(Frame {
                request,
                timestamp_ms: 0.0
            })
        );
        assert_eq!(host.next_frame(), None);

        let second = host.request_frame();
        assert_ne!(second, request);
        assert_eq!(host.next_frame().map(|frame| frame.timestamp_ms), Some(16.0));
    }

    #[test]
    fn cancelled_requests_are_never_delivered() {
        let mut host = FixedRateHost::new(0.0, 16.0);
        let request = host.request_frame();
        host.cancel_frame(request);
        assert_eq!(host.next_frame(), None);
    }

    #[test]
    fn frame_budget_limits_deliveries() {
        let mut host = FixedRateHost::new(0.0, 10.0).with_frame_budget(1);
        let _ = host.request_frame();
        assert!(host.next_frame().is_some());
        let _ = host.request_frame();
        assert_eq!(host.next_frame(), None);
        assert_eq!(host.remaining_budget(), Some(0));
    }

    #[test]
    fn display_host_waits_for_a_staged_refresh() {
        let mut host = DisplayHost::new();
        let request = host.request_frame();
        assert_eq!(host.next_frame(), None);

        host.stage(33.0);
        assert_eq!(
            host.next_frame(),
            Some(Frame {
                request,
                timestamp_ms: 33.0
            })
        );
    }
}
