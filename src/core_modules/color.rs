// THEORY:
// The `color` module is the first pipeline stage: it turns a color frame into
// a binary mask by testing every pixel against an HSV range. HSV is used
// because the hue channel is largely invariant to the lighting changes a
// cheap webcam sees, so a single calibrated band survives the room lights.
//
// The one subtlety is red: hue is an angle, so a red band wraps around the
// top of the scale (e.g. [170;179] plus [0;10]). That case is signalled by
// `low > high` on the hue channel only, and the inclusion test inverts for
// that channel: the value passes when it is >= low OR <= high.

use crate::core_modules::frame::{Frame, Mask};

/// Index of the hue channel in an HSV frame.
const HUE: usize = 0;

/// A calibrated HSV band. For saturation and value `low <= high` always
/// holds; for hue, `low > high` signals a wrap-around band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    pub low: [u8; 3],
    pub high: [u8; 3],
}

impl ColorRange {
    /// Creates a range, enforcing the channel invariants. Hue may wrap;
    /// saturation and value may not.
    pub fn new(low: [u8; 3], high: [u8; 3]) -> Self {
        debug_assert!(low[1] <= high[1] && low[2] <= high[2]);
        debug_assert!(low[HUE] <= 179 && high[HUE] <= 179);
        Self { low, high }
    }

    /// Whether the hue band wraps around the top of the scale.
    pub fn hue_wraps(&self) -> bool {
        self.low[HUE] > self.high[HUE]
    }

    /// Tests a single HSV pixel against the range.
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        for channel in 0..3 {
            let value = hsv[channel];
            if channel != HUE || self.low[channel] <= self.high[channel] {
                if value < self.low[channel] || value > self.high[channel] {
                    return false;
                }
            } else if value < self.low[channel] && value > self.high[channel] {
                // Wrapped hue band: only fail when outside both halves.
                return false;
            }
        }
        true
    }
}

/// Converts one BGR pixel to HSV using the 8-bit convention of the capture
/// stack: H in [0;179] (degrees halved), S and V in [0;255].
#[inline]
pub fn bgr_pixel_to_hsv(bgr: [u8; 3]) -> [u8; 3] {
    let b = bgr[0] as f32;
    let g = bgr[1] as f32;
    let r = bgr[2] as f32;

    let v = b.max(g).max(r);
    let min = b.min(g).min(r);
    let diff = v - min;

    let s = if v == 0.0 { 0.0 } else { 255.0 * diff / v };

    let mut h = if diff == 0.0 {
        0.0
    } else if v == r {
        60.0 * (g - b) / diff
    } else if v == g {
        120.0 + 60.0 * (b - r) / diff
    } else {
        240.0 + 60.0 * (r - g) / diff
    };
    if h < 0.0 {
        h += 360.0;
    }

    [(h / 2.0).round() as u8, s.round() as u8, v.round() as u8]
}

/// Converts a whole BGR frame into `hsv` (a re-used scratch frame).
pub fn bgr_to_hsv(src: &Frame, hsv: &mut Frame) {
    hsv.reset(src.width(), src.height());
    for y in 0..src.height() {
        for x in 0..src.width() {
            hsv.set_pixel(x, y, bgr_pixel_to_hsv(src.pixel(x, y)));
        }
    }
}

/// Thresholds an HSV frame against a [`ColorRange`], writing 255 for
/// in-range pixels and 0 otherwise. Pure per-pixel function; no error
/// conditions.
pub fn threshold(hsv: &Frame, range: &ColorRange, out: &mut Mask) {
    out.reset(hsv.width(), hsv.height());
    for y in 0..hsv.height() {
        for x in 0..hsv.width() {
            if range.contains(hsv.pixel(x, y)) {
                out.set(x, y, 255);
            }
        }
    }
}
