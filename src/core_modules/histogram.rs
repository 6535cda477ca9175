// THEORY:
// The `histogram` module is the bookkeeping engine behind the rank filter.
// A window histogram answers "what value sits at the P-th percentile of this
// neighborhood" in O(256) instead of O(W² log W²) sorting, and — crucially —
// it can be *slid*: moving the window one pixel right only requires removing
// the departing left column and adding the arriving right column. That turns
// the interior of the scan from O(W²) per pixel into O(W) per pixel.
//
// The histogram is always independently re-derivable from scratch, which is
// exactly what happens at image borders where the window shrinks and the
// incremental walk would lose track.

use crate::core_modules::frame::Mask;

/// Number of bins per channel (8-bit values).
pub const BINS: usize = 256;

/// Number of channels tracked. Masks only use channel 0, but the layout
/// keeps one array per channel so color windows can share the machinery.
pub const CHANNELS: usize = 3;

/// Fixed-size per-channel bin counts for one window. Invariant: the bins of
/// a channel sum to the number of pixels added to that channel.
#[derive(Debug, Clone)]
pub struct Histogram {
    counts: [[u32; BINS]; CHANNELS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            counts: [[0; BINS]; CHANNELS],
        }
    }

    /// Zeroes every bin.
    pub fn reset(&mut self) {
        for channel in &mut self.counts {
            channel.fill(0);
        }
    }

    #[inline]
    pub fn add(&mut self, channel: usize, value: u8) {
        self.counts[channel][value as usize] += 1;
    }

    /// Removes one sample. An underflowing removal means the caller slid
    /// the window incoherently — a programming error, aborted in debug
    /// builds and guarded against corrupting the counts in release.
    #[inline]
    pub fn remove(&mut self, channel: usize, value: u8) {
        let bin = &mut self.counts[channel][value as usize];
        debug_assert!(*bin > 0, "histogram underflow at bin {value}");
        *bin = bin.saturating_sub(1);
    }

    /// Sum of all bins for a channel; equals the window area when coherent.
    pub fn total(&self, channel: usize) -> u32 {
        self.counts[channel].iter().sum()
    }

    /// Rebuilds channel 0 from a rectangular window of a mask.
    pub fn rebuild_window(&mut self, mask: &Mask, x0: usize, y0: usize, w: usize, h: usize) {
        self.reset();
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                self.add(0, mask.get(x, y));
            }
        }
    }

    /// Adds one column of a mask window to channel 0.
    pub fn add_column(&mut self, mask: &Mask, x: usize, y0: usize, h: usize) {
        for y in y0..y0 + h {
            self.add(0, mask.get(x, y));
        }
    }

    /// Removes one column of a mask window from channel 0.
    pub fn remove_column(&mut self, mask: &Mask, x: usize, y0: usize, h: usize) {
        for y in y0..y0 + h {
            self.remove(0, mask.get(x, y));
        }
    }

    /// Walks the bins in increasing order, accumulating counts until the
    /// running total reaches `rank`, and returns that bin. `rank` must be
    /// in `[1; total]` so the result is always an achieved value.
    pub fn rank_value(&self, channel: usize, rank: u32) -> u8 {
        debug_assert!(rank >= 1);
        let mut running = 0u32;
        for (bin, &count) in self.counts[channel].iter().enumerate() {
            running += count;
            if running >= rank {
                return bin as u8;
            }
        }
        // Rank beyond the window population; only reachable through caller
        // error, so return the maximum value rather than panicking.
        debug_assert!(false, "rank {rank} exceeds histogram total {running}");
        (BINS - 1) as u8
    }
}
