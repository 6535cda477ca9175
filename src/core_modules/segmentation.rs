// THEORY:
// The `segmentation` module splits the cleaned binary mask into individual
// regions so each candidate object can be classified on its own. It is
// deliberately NOT a textbook two-pass connected-component labeler. It is a
// greedy single-raster-pass heuristic with two properties the detector
// actually wants:
//   1. A foreground pixel with no foreground neighbor inside the search
//      radius is treated as noise and dropped — isolated specks never become
//      regions.
//   2. The search radius R may exceed 1, which merges regions separated by
//      small gaps without another morphology round.
// The cost is O(pixels × R²), fine at the low resolutions this detector
// runs at (≤320×240, usually cropped much further).
//
// Region count is hard-capped: the extra regions beyond MAX_SEGMENTS are
// dropped with a saturation notice rather than failing the frame.

use crate::core_modules::frame::Mask;

/// Hard cap on regions materialized per frame.
pub const MAX_SEGMENTS: usize = 10;

/// Output of one segmentation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCount {
    /// Regions materialized (<= MAX_SEGMENTS).
    pub count: usize,
    /// True when regions beyond the cap were dropped.
    pub saturated: bool,
}

/// Greedy single-pass region labeler. Holds its label scratch buffer so it
/// can be re-used across frames without reallocating.
#[derive(Debug, Default)]
pub struct Segmenter {
    labels: Vec<u16>,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels foreground regions of `src` and materializes up to
    /// [`MAX_SEGMENTS`] per-region full-frame masks into `out` (re-used
    /// buffers; `out` is truncated/grown to the returned count).
    pub fn segment(
        &mut self,
        src: &Mask,
        radius: usize,
        white_pixels: bool,
        out: &mut Vec<Mask>,
    ) -> SegmentCount {
        let width = src.width();
        let height = src.height();
        let foreground: u8 = if white_pixels { 255 } else { 0 };

        self.labels.clear();
        self.labels.resize(width * height, 0);

        let mut n_labels: usize = 0;
        for y in 0..height {
            for x in 0..width {
                if src.get(x, y) != foreground {
                    continue;
                }
                match self.adopt_neighbor_label(src, x, y, radius, foreground) {
                    NeighborScan::Labeled(id) => self.labels[y * width + x] = id,
                    NeighborScan::Unlabeled => {
                        // A fresh region: no neighbor carries a label yet,
                        // but foreground neighbors exist.
                        if n_labels < u16::MAX as usize {
                            n_labels += 1;
                        }
                        self.labels[y * width + x] = n_labels as u16;
                    }
                    // No foreground neighbor at all: noise, leave unlabeled.
                    NeighborScan::Isolated => {}
                }
            }
        }

        let saturated = n_labels > MAX_SEGMENTS;
        if saturated {
            log::warn!("segment saturation: {n_labels} regions, keeping {MAX_SEGMENTS}");
        }
        let count = n_labels.min(MAX_SEGMENTS);

        out.truncate(count);
        while out.len() < count {
            out.push(Mask::new(0, 0));
        }
        for (i, mask) in out.iter_mut().enumerate() {
            let id = (i + 1) as u16;
            mask.reset(width, height);
            for y in 0..height {
                for x in 0..width {
                    if self.labels[y * width + x] == id {
                        mask.set(x, y, 255);
                    }
                }
            }
        }

        SegmentCount { count, saturated }
    }

    /// Scans the square neighborhood of radius R (center excluded). Returns
    /// the first already-assigned label found; otherwise reports whether any
    /// foreground neighbor exists at all.
    fn adopt_neighbor_label(
        &self,
        src: &Mask,
        x: usize,
        y: usize,
        radius: usize,
        foreground: u8,
    ) -> NeighborScan {
        let width = src.width() as isize;
        let height = src.height() as isize;
        let r = radius as isize;
        let mut any_foreground = false;

        for dy in -r..=r {
            let ny = y as isize + dy;
            if ny < 0 || ny >= height {
                continue;
            }
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = x as isize + dx;
                if nx < 0 || nx >= width {
                    continue;
                }
                if src.get(nx as usize, ny as usize) == foreground {
                    let label = self.labels[(ny * width + nx) as usize];
                    if label > 0 {
                        return NeighborScan::Labeled(label);
                    }
                    any_foreground = true;
                }
            }
        }

        if any_foreground {
            NeighborScan::Unlabeled
        } else {
            NeighborScan::Isolated
        }
    }
}

enum NeighborScan {
    Labeled(u16),
    Unlabeled,
    Isolated,
}
