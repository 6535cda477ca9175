// THEORY:
// The `overlay` module renders debug annotations onto a BGR frame: a red
// diagonal cross on each accepted target's center of mass, the target's
// boundary in red, and three horizontal blue guide lines showing the ignore
// borders and the left/right dividing line. The cross arm length scales
// with the target: it is one ninth of the hypotenuse of the square whose
// area matches the region, so bigger targets get bigger marks.
//
// Everything here clips instead of panicking; an annotation running off the
// frame edge is simply cut.

use crate::core_modules::frame::Frame;
use crate::core_modules::moments::Moments;

const RED: [u8; 3] = [0, 0, 255];
const BLUE: [u8; 3] = [255, 0, 0];

#[inline]
fn put_pixel(frame: &mut Frame, x: isize, y: isize, color: [u8; 3]) {
    if x >= 0 && y >= 0 && (x as usize) < frame.width() && (y as usize) < frame.height() {
        frame.set_pixel(x as usize, y as usize, color);
    }
}

fn horizontal_line(frame: &mut Frame, y: isize, color: [u8; 3]) {
    for x in 0..frame.width() as isize {
        put_pixel(frame, x, y, color);
    }
}

/// Draws the top border, the shifted middle line, and the bottom border.
pub fn draw_guides(frame: &mut Frame, top_border: u32, bottom_border: u32, middle_offset: i32) {
    let height = frame.height() as isize;
    horizontal_line(frame, top_border as isize, BLUE);
    horizontal_line(frame, height / 2 + middle_offset as isize, BLUE);
    horizontal_line(frame, height - bottom_border as isize, BLUE);
}

/// Marks one accepted target: a diagonal cross on its center of mass and
/// its traced boundary, both in red. `origin` maps contour coordinates
/// (relative to the cropped analysis window) back into the full frame.
pub fn draw_detection(
    frame: &mut Frame,
    moments: &Moments,
    contour: &[(usize, usize)],
    origin: (usize, usize),
) {
    let side = moments.area.sqrt();
    let hypotenuse = (2.0 * side * side).sqrt();
    let arm = (hypotenuse / 9.0).round() as isize;

    let cx = moments.center_x.round() as isize;
    let cy = moments.center_y.round() as isize;
    for d in -arm..=arm {
        put_pixel(frame, cx + d, cy + d, RED);
        put_pixel(frame, cx + d, cy - d, RED);
    }

    for &(x, y) in contour {
        put_pixel(frame, (x + origin.0) as isize, (y + origin.1) as isize, RED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::moments::moments as compute_moments;
    use crate::core_modules::frame::Mask;

    #[test]
    fn guides_land_on_expected_rows() {
        let mut frame = Frame::new(40, 100);
        draw_guides(&mut frame, 5, 20, -10);
        assert_eq!(frame.pixel(0, 5), BLUE);
        assert_eq!(frame.pixel(39, 40), BLUE); // 100 / 2 - 10
        assert_eq!(frame.pixel(10, 80), BLUE);
        assert_eq!(frame.pixel(10, 50), [0, 0, 0]);
    }

    #[test]
    fn cross_is_centered_and_red() {
        let mut frame = Frame::new(60, 60);
        let mut mask = Mask::new(60, 60);
        for y in 20..40 {
            for x in 20..40 {
                mask.set(x, y, 255);
            }
        }
        let m = compute_moments(&mask, true).unwrap();
        draw_detection(&mut frame, &m, &[], (0, 0));
        let cx = m.center_x.round() as usize;
        let cy = m.center_y.round() as usize;
        assert_eq!(frame.pixel(cx, cy), RED);
        assert_eq!(frame.pixel(cx + 2, cy + 2), RED);
        assert_eq!(frame.pixel(cx + 2, cy - 2), RED);
        // Off the diagonals nothing is painted.
        assert_eq!(frame.pixel(cx + 2, cy), [0, 0, 0]);
    }

    #[test]
    fn contour_is_offset_by_crop_origin() {
        let mut frame = Frame::new(30, 30);
        let mut mask = Mask::new(4, 4);
        mask.set(1, 1, 255);
        let m = compute_moments(&mask, true).unwrap();
        draw_detection(&mut frame, &m, &[(0, 0), (3, 3)], (10, 20));
        assert_eq!(frame.pixel(10, 20), RED);
        assert_eq!(frame.pixel(13, 23), RED);
    }

    #[test]
    fn annotations_clip_at_frame_edges() {
        let mut frame = Frame::new(10, 10);
        let mut mask = Mask::new(10, 10);
        for y in 0..6 {
            for x in 0..6 {
                mask.set(x, y, 255);
            }
        }
        let m = compute_moments(&mask, true).unwrap();
        // Contour points past the frame edge must be dropped silently.
        draw_detection(&mut frame, &m, &[(9, 9)], (5, 5));
        draw_guides(&mut frame, 5, 20, -10); // bottom guide is off-frame
    }
}
