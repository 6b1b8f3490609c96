//! Batched redraw scheduling.
//!
//! Any number of dirty signals inside one UI frame collapse into a single
//! frame request. The scheduler holds at most one in-flight token; marking
//! more layers dirty while a request is pending only widens the dirty set.

use super::layers::LayerSet;

/// Handle returned by the host for a requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub i32);

/// Source of frame callbacks (`requestAnimationFrame` in the browser)
pub trait FrameHost {
    /// Ask for a callback on the next frame. `None` when the host cannot
    /// schedule one (no window, torn down).
    fn request_frame(&mut self) -> Option<FrameToken>;

    /// Cancel a previously requested callback.
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Coalesces dirty layers into one flush per frame
#[derive(Debug, Default)]
pub struct FrameScheduler {
    dirty: LayerSet,
    pending: Option<FrameToken>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layers waiting for the next flush.
    pub fn dirty(&self) -> LayerSet {
        self.dirty
    }

    /// Token of the in-flight request, if any.
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    /// Mark layers dirty, requesting a frame only when none is in flight.
    /// Returns true when a new frame was requested.
    pub fn mark_dirty(&mut self, layers: LayerSet, host: &mut dyn FrameHost) -> bool {
        if layers.is_empty() {
            return false;
        }
        self.dirty |= layers;
        if self.pending.is_some() {
            return false;
        }
        self.pending = host.request_frame();
        if self.pending.is_none() {
            tracing::debug!("frame host declined request; dirty layers stay queued");
        }
        self.pending.is_some()
    }

    /// Make sure a frame callback is in flight even with nothing dirty, so
    /// deferred work (leftover wheel deltas) gets a turn.
    pub fn request_tick(&mut self, host: &mut dyn FrameHost) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = host.request_frame();
        self.pending.is_some()
    }

    /// Consume the dirty set for a fired frame callback.
    ///
    /// A token that does not match the in-flight request (cancelled or
    /// superseded) yields an empty set and leaves state untouched.
    pub fn take_frame(&mut self, token: FrameToken) -> LayerSet {
        if self.pending != Some(token) {
            tracing::trace!(token = token.0, "ignoring stale frame callback");
            return LayerSet::EMPTY;
        }
        self.pending = None;
        std::mem::take(&mut self.dirty)
    }

    /// Cancel the in-flight request and drop the dirty set.
    pub fn cancel(&mut self, host: &mut dyn FrameHost) {
        if let Some(token) = self.pending.take() {
            host.cancel_frame(token);
        }
        self.dirty = LayerSet::EMPTY;
    }
}

/// Frame host for native use: hands out sequential tokens and records
/// requests so callers can fire them explicitly.
#[derive(Debug, Default, Clone)]
pub struct ManualFrameHost {
    next: i32,
    /// Total frames requested
    pub requested: usize,
    /// Total frames cancelled
    pub cancelled: usize,
    outstanding: Option<FrameToken>,
}

impl ManualFrameHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request that has not fired or been cancelled yet.
    pub fn outstanding(&self) -> Option<FrameToken> {
        self.outstanding
    }

    /// Take the outstanding token, as the runtime would when it fires.
    pub fn fire(&mut self) -> Option<FrameToken> {
        self.outstanding.take()
    }
}

impl FrameHost for ManualFrameHost {
    fn request_frame(&mut self) -> Option<FrameToken> {
        self.next = self.next.wrapping_add(1);
        let token = FrameToken(self.next);
        self.requested += 1;
        self.outstanding = Some(token);
        Some(token)
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.outstanding == Some(token) {
            self.outstanding = None;
        }
        self.cancelled += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::render::layers::LayerId;

    #[test]
    fn test_many_dirty_signals_one_request() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.mark_dirty(LayerSet::only(LayerId::BodyCenter), &mut host));
        assert!(!scheduler.mark_dirty(LayerSet::only(LayerId::BodyLeft), &mut host));
        assert!(!scheduler.mark_dirty(LayerSet::only(LayerId::HeaderCenter), &mut host));
        assert_eq!(host.requested, 1);

        let token = host.fire().unwrap();
        let dirty = scheduler.take_frame(token);
        assert_eq!(dirty.len(), 3);
        assert!(scheduler.dirty().is_empty());
        assert!(scheduler.pending().is_none());
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.mark_dirty(LayerSet::all(), &mut host);
        let dirty = scheduler.take_frame(FrameToken(999));
        assert!(dirty.is_empty());
        assert!(scheduler.pending().is_some());
    }

    #[test]
    fn test_cancel_releases_token() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new();
        scheduler.mark_dirty(LayerSet::all(), &mut host);
        scheduler.cancel(&mut host);
        assert_eq!(host.cancelled, 1);
        assert!(host.outstanding().is_none());
        assert!(scheduler.dirty().is_empty());
    }

    #[test]
    fn test_tick_shares_the_in_flight_request() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.request_tick(&mut host));
        assert!(!scheduler.mark_dirty(LayerSet::only(LayerId::BodyLeft), &mut host));
        assert!(!scheduler.request_tick(&mut host));
        assert_eq!(host.requested, 1);
        let token = host.fire().unwrap();
        assert_eq!(scheduler.take_frame(token).len(), 1);
    }

    #[test]
    fn test_empty_set_requests_nothing() {
        let mut host = ManualFrameHost::new();
        let mut scheduler = FrameScheduler::new();
        assert!(!scheduler.mark_dirty(LayerSet::EMPTY, &mut host));
        assert_eq!(host.requested, 0);
    }
}
