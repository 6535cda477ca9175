// THEORY:
// The `morphology` module implements binary dilation and erosion, composed
// into closing (fill small gaps inside the object) and opening (remove small
// speckle around it). Dilation lets the foreground polarity win inside the
// structuring neighborhood; erosion lets the background win. Both carry an
// early exit: once the extreme possible value is seen in the neighborhood
// the scan stops, which on mostly-empty or mostly-solid masks skips the bulk
// of the window work.
//
// The structuring element is a square or an approximately circular disc of
// odd nominal size S (radius n = (S-1)/2), clipped at image borders.

use crate::core_modules::frame::Mask;

/// Shape of the structuring neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementShape {
    Square,
    /// Disc approximation: offsets with dx² + dy² <= n² (n >= 1); degenerates
    /// to the center pixel at n = 0.
    Ellipse,
}

impl ElementShape {
    #[inline]
    fn includes(self, dx: isize, dy: isize, radius: isize) -> bool {
        match self {
            ElementShape::Square => true,
            ElementShape::Ellipse => dx * dx + dy * dy <= radius * radius,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MorphOp {
    Dilate,
    Erode,
}

fn morph(src: &Mask, out: &mut Mask, op: MorphOp, size: usize, shape: ElementShape, white_pixels: bool) {
    debug_assert!(size >= 1);
    let width = src.width();
    let height = src.height();
    out.reset(width, height);

    let radius = ((size - 1) / 2) as isize;

    // The value that "wins" the neighborhood scan. Dilation spreads the
    // foreground polarity; erosion spreads the opposite.
    let foreground: u8 = if white_pixels { 255 } else { 0 };
    let background: u8 = if white_pixels { 0 } else { 255 };
    let winner = match op {
        MorphOp::Dilate => foreground,
        MorphOp::Erode => background,
    };
    let loser = if winner == foreground { background } else { foreground };

    for y in 0..height {
        for x in 0..width {
            let mut value = loser;
            'scan: for dy in -radius..=radius {
                let ny = y as isize + dy;
                if ny < 0 || ny >= height as isize {
                    continue;
                }
                for dx in -radius..=radius {
                    if !shape.includes(dx, dy, radius) {
                        continue;
                    }
                    let nx = x as isize + dx;
                    if nx < 0 || nx >= width as isize {
                        continue;
                    }
                    if src.get(nx as usize, ny as usize) == winner {
                        value = winner;
                        break 'scan; // Extreme value reached; nothing can change it.
                    }
                }
            }
            out.set(x, y, value);
        }
    }
}

/// Neighborhood maximum (for white foreground): grows the object.
pub fn dilate(src: &Mask, out: &mut Mask, size: usize, shape: ElementShape, white_pixels: bool) {
    morph(src, out, MorphOp::Dilate, size, shape, white_pixels);
}

/// Neighborhood minimum (for white foreground): shrinks the object.
pub fn erode(src: &Mask, out: &mut Mask, size: usize, shape: ElementShape, white_pixels: bool) {
    morph(src, out, MorphOp::Erode, size, shape, white_pixels);
}

/// Morphological closing: dilate then erode with the same element. Fills
/// small background gaps and cracks inside the foreground.
pub fn close(
    src: &Mask,
    out: &mut Mask,
    scratch: &mut Mask,
    size: usize,
    shape: ElementShape,
    white_pixels: bool,
) {
    dilate(src, scratch, size, shape, white_pixels);
    erode(scratch, out, size, shape, white_pixels);
}

/// Morphological opening: erode then dilate with the same element. Removes
/// small foreground speckle.
pub fn open(
    src: &Mask,
    out: &mut Mask,
    scratch: &mut Mask,
    size: usize,
    shape: ElementShape,
    white_pixels: bool,
) {
    erode(src, scratch, size, shape, white_pixels);
    dilate(scratch, out, size, shape, white_pixels);
}
