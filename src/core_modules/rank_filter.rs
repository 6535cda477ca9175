// THEORY:
// The `rank_filter` module implements the percentile ("fractile") filter, the
// pipeline's impulse-noise stage. Every pixel is replaced by the value at a
// chosen percentile rank of its W×W neighborhood: 50 gives the classic
// median, lower percentiles bias towards background and eat salt noise
// harder, higher percentiles preserve thin foreground.
//
// The performance story is the whole point of the design. A naive filter
// rebuilds a W×W histogram per pixel; this one slides it. While scanning a
// row, the histogram for the previous pixel's window is turned into the
// current one by removing the departing left column and adding the arriving
// right column. Only two situations force a rebuild:
//   1. the window is border-clipped (its shape differs from the nominal W×W),
//   2. the skip-background fast path jumped over pixels, so the histogram is
//      no longer adjacent to the current window.
// The skip-background flag is an optimization for binary masks where only
// foreground matters: known-background pixels stay background in the output
// without any window work at all.

use crate::core_modules::frame::Mask;
use crate::core_modules::histogram::Histogram;

/// Applies the percentile filter. `window_size` is the nominal window side
/// (odd, >= 1); windows shrink at image borders instead of wrapping or
/// padding. `percentile` is in [0;100]. Output is written into the re-used
/// `out` buffer.
pub fn rank_filter(
    src: &Mask,
    out: &mut Mask,
    window_size: usize,
    percentile: u32,
    skip_background: bool,
) {
    debug_assert!(window_size >= 1 && window_size % 2 == 1);
    debug_assert!(percentile <= 100);

    let width = src.width();
    let height = src.height();
    out.reset(width, height);

    let half = window_size / 2;
    let mut hist = Histogram::new();

    for y in 0..height {
        // The histogram never survives a row change.
        let mut hist_coherent = false;

        let y0 = y.saturating_sub(half);
        let y1 = (y + half).min(height.saturating_sub(1));
        let wh = y1 - y0 + 1;

        for x in 0..width {
            if skip_background && src.get(x, y) == 0 {
                hist_coherent = false;
                continue; // Output stays background.
            }

            let x0 = x.saturating_sub(half);
            let x1 = (x + half).min(width.saturating_sub(1));
            let ww = x1 - x0 + 1;
            let nominal = ww == window_size && wh == window_size;

            if nominal && hist_coherent {
                // Slide: the previous window was [x0-1; x1-1].
                hist.remove_column(src, x0 - 1, y0, wh);
                hist.add_column(src, x1, y0, wh);
            } else {
                hist.rebuild_window(src, x0, y0, ww, wh);
                hist_coherent = nominal;
            }

            let area = (ww * wh) as u32;
            // Clamp the rank to >= 1 so the result is always a value that
            // actually occurs in the window, even at percentile 0.
            let rank = (area * percentile / 100).max(1);
            out.set(x, y, hist.rank_value(0, rank));
        }
    }
}
