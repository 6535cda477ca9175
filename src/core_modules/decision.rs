// THEORY:
// The `decision` module converts per-frame detections into strike tokens.
// Detections arrive sorted by center x, so slot i always refers to the i-th
// target from the left; each slot carries a signed evidence counter. A
// target below the middle line votes +1 (right arm), above it -1 (left
// arm), and the slot fires once the magnitude reaches the debounce
// threshold. Fired slots shift down so slot 0 is always the next target in
// line.
//
// Evidence only accumulates while the actuator is free and the post-strike
// hold-off has elapsed, because a struck target lingers in view for a
// moment and must not be counted twice. Targets hugging the top or bottom
// of the frame are ignored outright; they are entering or leaving. The
// first few frames track fewer slots while the capture stream settles.

use std::time::{Duration, Instant};

use crate::core_modules::moments::Moments;
use crate::core_modules::ring_buffer::TargetQueue;

/// Maximum simultaneously tracked targets.
pub const MAX_SLOTS: usize = 4;

/// Tunables for the strike decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionConfig {
    /// Ignore targets with center y above this line.
    pub top_border: u32,
    /// Ignore targets with center y below `height - bottom_border`.
    pub bottom_border: u32,
    /// Signed shift of the left/right dividing line from `height / 2`.
    pub middle_offset: i32,
    /// Consecutive sightings required before firing.
    pub debounce: i32,
    /// Frames tracked with the reduced slot count after startup.
    pub warmup_rounds: u32,
    /// Slots tracked during warm-up.
    pub warmup_slots: usize,
    /// Wait after a strike completes before counting evidence again.
    pub hold_off: Duration,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            top_border: 5,
            bottom_border: 20,
            middle_offset: -10,
            debounce: 1,
            warmup_rounds: 10,
            warmup_slots: 2,
            hold_off: Duration::from_millis(250),
        }
    }
}

/// Per-slot evidence counters plus the post-strike settle bookkeeping.
#[derive(Debug)]
pub struct DecisionTracker {
    counters: [i32; MAX_SLOTS],
    rounds: u32,
    /// Set when a strike was queued; cleared once the actuator reports free
    /// again, which starts the hold-off.
    waiting_for_free: bool,
    settle_timer: Option<Instant>,
}

impl Default for DecisionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTracker {
    pub fn new() -> Self {
        Self {
            counters: [0; MAX_SLOTS],
            rounds: 0,
            waiting_for_free: false,
            settle_timer: None,
        }
    }

    /// Feeds one frame's detections (sorted by center x, full-frame
    /// coordinates) into the tracker. Fired strikes are queued as tokens;
    /// returns how many were queued.
    pub fn update(
        &mut self,
        detections: &[Moments],
        frame_height: u32,
        now: Instant,
        actuator_free: bool,
        cfg: &DecisionConfig,
        queue: &mut TargetQueue,
    ) -> usize {
        if actuator_free && self.waiting_for_free {
            self.waiting_for_free = false;
            self.settle_timer = Some(now);
        }

        let slots = if self.rounds < cfg.warmup_rounds {
            self.rounds += 1;
            cfg.warmup_slots.min(MAX_SLOTS)
        } else {
            MAX_SLOTS
        };

        let settled = actuator_free
            && !self.waiting_for_free
            && self
                .settle_timer
                .is_none_or(|t| now.duration_since(t) > cfg.hold_off);

        let middle = frame_height as f64 / 2.0 + cfg.middle_offset as f64;
        let bottom = (frame_height - cfg.bottom_border.min(frame_height)) as f64;

        for (i, m) in detections.iter().take(slots).enumerate() {
            if m.center_y <= cfg.top_border as f64 || m.center_y >= bottom {
                continue; // Entering or leaving the play field.
            }
            if !settled {
                continue;
            }
            if m.center_y > middle {
                self.counters[i] += 1;
            } else {
                self.counters[i] -= 1;
            }
            log::debug!("slot {i} counter {}", self.counters[i]);
        }

        let mut strikes = 0;
        for _ in 0..slots {
            if self.counters[0].abs() < cfg.debounce {
                break;
            }
            let token: i8 = if self.counters[0] > 0 { 1 } else { -1 };
            log::info!(
                "strike queued: {} arm",
                if token > 0 { "right" } else { "left" }
            );
            queue.write(token);
            self.waiting_for_free = true;
            strikes += 1;
            for i in 0..slots - 1 {
                self.counters[i] = self.counters[i + 1];
            }
            self.counters[slots - 1] = 0;
        }
        strikes
    }

    /// Drops all accumulated evidence, e.g. after a configuration change.
    pub fn reset(&mut self) {
        self.counters = [0; MAX_SLOTS];
        self.waiting_for_free = false;
        self.settle_timer = None;
    }
}
