// THEORY:
// The `contour` module walks the outer boundary of a region with the
// Moore-neighbor tracer. Starting from the first foreground pixel in raster
// order, each step searches the 8-neighborhood clockwise beginning just
// after the backtrack direction (the cell we arrived from), guaranteeing the
// walk hugs the boundary with the background on its left. The walk closes
// when it returns to the start pixel.
//
// Connectivity picks which of the 8 directions are legal moves: all of them,
// the four axis-aligned ones, or the hexagonal six (everything but straight
// north and south). A step budget equal to the mask's pixel count bounds the
// walk; a boundary that does not close within it is reported instead of
// looping forever.

use crate::core_modules::frame::Mask;
use crate::error::PipelineError;

/// Clockwise neighbor offsets, index 0 pointing east, y growing downwards.
const OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Legal step directions for the boundary walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceConnectivity {
    Four,
    Six,
    Eight,
}

impl TraceConnectivity {
    #[inline]
    fn admits(self, dir: usize) -> bool {
        match self {
            TraceConnectivity::Eight => true,
            TraceConnectivity::Four => dir % 2 == 0,
            TraceConnectivity::Six => dir != 2 && dir != 6,
        }
    }
}

/// Traces the outer boundary of the first region found in raster order.
/// Returns the boundary pixels in clockwise order; a single isolated pixel
/// yields a one-point contour.
pub fn trace_boundary(
    mask: &Mask,
    connectivity: TraceConnectivity,
    white_pixels: bool,
) -> Result<Vec<(usize, usize)>, PipelineError> {
    let foreground: u8 = if white_pixels { 255 } else { 0 };
    let width = mask.width();
    let height = mask.height();

    let mut start = None;
    'search: for y in 0..height {
        for x in 0..width {
            if mask.get(x, y) == foreground {
                start = Some((x, y));
                break 'search;
            }
        }
    }
    let start = start.ok_or(PipelineError::NoForeground)?;

    let budget = mask.len();
    let mut points = vec![start];
    let mut pos = start;
    // The raster scan arrives at the start pixel with background above and
    // to the left, so pretending we stepped in from the west keeps the
    // clockwise sweep consistent.
    let mut dir = 0usize;
    let mut steps = 0usize;

    loop {
        let base = (dir + 6) % 8;
        let mut next = None;
        for i in 0..8 {
            let cand = (base + i) % 8;
            if !connectivity.admits(cand) {
                continue;
            }
            let nx = pos.0 as isize + OFFSETS[cand].0;
            let ny = pos.1 as isize + OFFSETS[cand].1;
            if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                continue;
            }
            if mask.get(nx as usize, ny as usize) == foreground {
                next = Some((cand, (nx as usize, ny as usize)));
                break;
            }
        }

        // No reachable neighbor at all: the region is a single pixel.
        let Some((ndir, npos)) = next else { break };

        steps += 1;
        if steps > budget {
            return Err(PipelineError::ContourTooComplex { budget });
        }
        pos = npos;
        dir = ndir;
        if pos == start {
            break;
        }
        points.push(pos);
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from_rows(rows: &[&[u8]]) -> Mask {
        let mut mask = Mask::new(rows[0].len(), rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                mask.set(x, y, if v > 0 { 255 } else { 0 });
            }
        }
        mask
    }

    #[test]
    fn empty_mask_reports_no_foreground() {
        let mask = Mask::new(5, 5);
        assert_eq!(
            trace_boundary(&mask, TraceConnectivity::Eight, true),
            Err(PipelineError::NoForeground)
        );
    }

    #[test]
    fn isolated_pixel_is_a_one_point_contour() {
        let mask = mask_from_rows(&[
            &[0, 0, 0],
            &[0, 1, 0],
            &[0, 0, 0],
        ]);
        let contour = trace_boundary(&mask, TraceConnectivity::Eight, true).unwrap();
        assert_eq!(contour, vec![(1, 1)]);
    }

    #[test]
    fn square_perimeter_length() {
        // Solid 6x6 square: the boundary has 4*(6-1) = 20 pixels.
        let mut mask = Mask::new(10, 10);
        for y in 2..8 {
            for x in 2..8 {
                mask.set(x, y, 255);
            }
        }
        let contour = trace_boundary(&mask, TraceConnectivity::Eight, true).unwrap();
        assert_eq!(contour.len(), 20);
        assert!(contour.len() <= mask.len());
        for &(x, y) in &contour {
            let on_edge = x == 2 || x == 7 || y == 2 || y == 7;
            assert!(on_edge, "({x},{y}) is not on the square's boundary");
        }
    }

    #[test]
    fn walk_is_clockwise_from_top_left() {
        let mask = mask_from_rows(&[
            &[0, 0, 0, 0],
            &[0, 1, 1, 0],
            &[0, 1, 1, 0],
            &[0, 0, 0, 0],
        ]);
        let contour = trace_boundary(&mask, TraceConnectivity::Eight, true).unwrap();
        assert_eq!(contour, vec![(1, 1), (2, 1), (2, 2), (1, 2)]);
    }

    #[test]
    fn diagonal_pair_needs_eight_connectivity() {
        let mask = mask_from_rows(&[
            &[1, 0],
            &[0, 1],
        ]);
        let eight = trace_boundary(&mask, TraceConnectivity::Eight, true).unwrap();
        assert_eq!(eight, vec![(0, 0), (1, 1)]);
        // Under 4-adjacency the second pixel is unreachable.
        let four = trace_boundary(&mask, TraceConnectivity::Four, true).unwrap();
        assert_eq!(four, vec![(0, 0)]);
    }

    #[test]
    fn border_touching_region_stays_in_bounds() {
        let mask = mask_from_rows(&[
            &[1, 1, 1],
            &[1, 1, 1],
        ]);
        let contour = trace_boundary(&mask, TraceConnectivity::Eight, true).unwrap();
        assert_eq!(contour.len(), 6);
        for &(x, y) in &contour {
            assert!(x < 3 && y < 2);
        }
    }
}
