// THEORY:
// The `euler` module computes the Euler number of a binary region, the
// topological count (connected components) minus (holes). The detector uses
// it as a cheap solidity gate: a solid object scores exactly 1, while a
// region with a hole in it (a ring, an occluded blob) scores 0 or less and
// is rejected before the more expensive shape checks even matter.
//
// The computation is the classic bit-quad census. Every 2x2 window of the
// mask is classified by how many of its cells are foreground: Q1 counts
// windows with exactly one, Q3 with exactly three, QD the two diagonal
// patterns. Then
//   E(4-connected) = (Q1 - Q3 + 2*QD) / 4
//   E(8-connected) = (Q1 - Q3 - 2*QD) / 4
// The scan starts one cell outside the mask on every side so that regions
// touching the border are still surrounded by virtual background and keep
// their correct topology.

use crate::core_modules::frame::Mask;

/// Foreground adjacency rule for the Euler census.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EulerConnectivity {
    Four,
    Eight,
}

/// Euler number of the pixels matching the given polarity.
pub fn euler_number(mask: &Mask, connectivity: EulerConnectivity, white_pixels: bool) -> i32 {
    let foreground: u8 = if white_pixels { 255 } else { 0 };
    let width = mask.width() as isize;
    let height = mask.height() as isize;

    let at = |x: isize, y: isize| -> bool {
        if x < 0 || y < 0 || x >= width || y >= height {
            false
        } else {
            mask.get(x as usize, y as usize) == foreground
        }
    };

    let mut q1 = 0i32;
    let mut q3 = 0i32;
    let mut qd = 0i32;

    for y in -1..height {
        for x in -1..width {
            let a = at(x, y);
            let b = at(x + 1, y);
            let c = at(x, y + 1);
            let d = at(x + 1, y + 1);
            match (a as u8) + (b as u8) + (c as u8) + (d as u8) {
                1 => q1 += 1,
                3 => q3 += 1,
                2 => {
                    // Only the two diagonal pairs count.
                    if (a && d) || (b && c) {
                        qd += 1;
                    }
                }
                _ => {}
            }
        }
    }

    match connectivity {
        EulerConnectivity::Four => (q1 - q3 + 2 * qd) / 4,
        EulerConnectivity::Eight => (q1 - q3 - 2 * qd) / 4,
    }
}
