#![forbid(unsafe_code)]

//! Frame scheduler: fixed-budget frame pacing with a single coalesced
//! pending-render slot.
//!
//! A component calling `mark_dirty` (or the engine's `request_render`) any
//! number of times between two ticks only produces one composite pass —
//! `schedule` is idempotent, not additive.

use std::time::{Duration, Instant};

/// Rolling frame-timing counters, useful for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    /// Total number of ticks that ran the composition pipeline.
    pub frames_rendered: u64,
    /// Total number of ticks that were skipped (nothing dirty, nothing
    /// requested).
    pub skip_count: u64,
    /// Wall-clock time the most recently rendered frame took to compose.
    pub last_frame: Duration,
    /// Exponentially-weighted average of `last_frame` across rendered
    /// frames (smoothing factor 0.2, matching the renderer's own
    /// budget-tracking style).
    pub avg_frame: Duration,
}

impl FrameStats {
    fn record(&mut self, elapsed: Duration) {
        self.frames_rendered += 1;
        self.last_frame = elapsed;
        self.avg_frame = if self.frames_rendered == 1 {
            elapsed
        } else {
            let prev = self.avg_frame.as_secs_f64();
            let now = elapsed.as_secs_f64();
            Duration::from_secs_f64(prev * 0.8 + now * 0.2)
        };
    }
}

/// Paces composition to a target frame rate and coalesces redundant render
/// requests into a single pending flag.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    frame_interval: Duration,
    last_tick: Option<Instant>,
    pending: bool,
    stats: FrameStats,
}

impl FrameScheduler {
    /// Create a scheduler targeting `target_fps` frames per second.
    /// `target_fps` is clamped to at least 1.
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let fps = target_fps.max(1);
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps)),
            last_tick: None,
            pending: false,
            stats: FrameStats::default(),
        }
    }

    /// The configured frame interval.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Queue a render. Idempotent: calling this repeatedly before the next
    /// tick still produces exactly one composite pass.
    pub fn schedule(&mut self) {
        self.pending = true;
    }

    /// Discard a queued render without running it.
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Immediately consume and return whether a render was pending,
    /// bypassing the frame-interval wait. Used for e.g. a final flush on
    /// `stop()`.
    pub fn force(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Whether a render is currently queued.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// How long the caller should sleep before the next tick is due,
    /// relative to `now`. Returns zero if a tick is already due or overdue.
    #[must_use]
    pub fn time_until_next_tick(&self, now: Instant) -> Duration {
        match self.last_tick {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                self.frame_interval.saturating_sub(elapsed)
            }
            None => Duration::ZERO,
        }
    }

    /// Evaluate one tick: if the dirty set is non-empty or a render was
    /// requested, consume the pending flag and report that composition
    /// should run. Otherwise record a skipped tick. Callers should record
    /// frame timing via [`FrameScheduler::record_frame`] after running the
    /// composition pipeline.
    pub fn tick(&mut self, now: Instant, dirty: bool) -> bool {
        self.last_tick = Some(now);
        if dirty || self.pending {
            self.pending = false;
            true
        } else {
            self.stats.skip_count += 1;
            false
        }
    }

    /// Record how long a composited frame took, updating the rolling stats.
    pub fn record_frame(&mut self, elapsed: Duration) {
        self.stats.record(elapsed);
    }

    /// Current frame-timing statistics.
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_idempotent() {
        let mut s = FrameScheduler::new(60);
        s.schedule();
        s.schedule();
        s.schedule();
        assert!(s.force());
        assert!(!s.force(), "second force should find nothing pending");
    }

    #[test]
    fn cancel_clears_pending() {
        let mut s = FrameScheduler::new(60);
        s.schedule();
        s.cancel();
        assert!(!s.is_pending());
    }

    #[test]
    fn tick_runs_when_dirty_even_without_schedule() {
        let mut s = FrameScheduler::new(30);
        let now = Instant::now();
        assert!(s.tick(now, true));
        assert_eq!(s.stats().frames_rendered, 0, "tick itself doesn't record frame time");
    }

    #[test]
    fn tick_skips_when_neither_dirty_nor_pending() {
        let mut s = FrameScheduler::new(30);
        let now = Instant::now();
        assert!(!s.tick(now, false));
        assert_eq!(s.stats().skip_count, 1);
    }

    #[test]
    fn tick_consumes_pending_flag() {
        let mut s = FrameScheduler::new(30);
        s.schedule();
        let now = Instant::now();
        assert!(s.tick(now, false));
        assert!(!s.tick(now, false), "pending flag should be consumed");
    }

    #[test]
    fn record_frame_updates_stats() {
        let mut s = FrameScheduler::new(30);
        s.record_frame(Duration::from_millis(10));
        s.record_frame(Duration::from_millis(20));
        assert_eq!(s.stats().frames_rendered, 2);
        assert_eq!(s.stats().last_frame, Duration::from_millis(20));
    }

    #[test]
    fn frame_interval_matches_target_fps() {
        let s = FrameScheduler::new(50);
        assert_eq!(s.frame_interval(), Duration::from_secs_f64(0.02));
    }

    #[test]
    fn target_fps_zero_clamps_to_one() {
        let s = FrameScheduler::new(0);
        assert_eq!(s.frame_interval(), Duration::from_secs(1));
    }
}
