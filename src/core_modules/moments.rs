// THEORY:
// The `moments` module computes the shape descriptors that decide whether a
// segmented region is the object we are hunting. Raw spatial moments up to
// second order give area and center of mass; central moments remove the
// translation; normalizing by area^2 removes the scale; and the two phi
// invariants finally remove rotation as well. The result is a pair of
// numbers that describe the *shape* of the region regardless of where it
// sits in the frame, how big it appears, or how it is turned — exactly what
// a calibrated acceptance band needs.

use crate::core_modules::frame::Mask;

/// Shape descriptors of one region. A read-only snapshot computed from a
/// single mask; nothing here outlives the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Raw moment M00 = pixel count of the region.
    pub area: f64,
    pub m10: f64,
    pub m01: f64,
    pub m11: f64,
    pub m20: f64,
    pub m02: f64,
    /// Center of mass, in mask coordinates.
    pub center_x: f64,
    pub center_y: f64,
    /// Reduced central moments.
    pub mu11: f64,
    pub mu20: f64,
    pub mu02: f64,
    /// Orientation of the principal axis, radians.
    pub angle: f64,
    /// Normalized central moments (gamma = 2 for all three).
    pub n11: f64,
    pub n20: f64,
    pub n02: f64,
    /// Rotation/scale invariants.
    pub phi1: f64,
    pub phi2: f64,
}

/// Computes moments of the pixels matching the given polarity. Returns
/// `None` for an empty region (there is no center of mass to speak of).
pub fn moments(mask: &Mask, white_pixels: bool) -> Option<Moments> {
    let foreground: u8 = if white_pixels { 255 } else { 0 };

    let mut m00 = 0.0f64;
    let mut m10 = 0.0f64;
    let mut m01 = 0.0f64;
    let mut m11 = 0.0f64;
    let mut m20 = 0.0f64;
    let mut m02 = 0.0f64;

    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.get(x, y) == foreground {
                let xf = x as f64;
                let yf = y as f64;
                m00 += 1.0;
                m10 += xf;
                m01 += yf;
                m11 += xf * yf;
                m20 += xf * xf;
                m02 += yf * yf;
            }
        }
    }

    if m00 == 0.0 {
        return None;
    }

    let center_x = m10 / m00;
    let center_y = m01 / m00;

    let mu11 = m11 - center_y * m10;
    let mu20 = m20 - center_x * m10;
    let mu02 = m02 - center_y * m01;

    let angle = 0.5 * (2.0 * mu11).atan2(mu20 - mu02);

    // gamma = (p + q) / 2 + 1 = 2 for all three second-order moments.
    let n11 = mu11 / (m00 * m00);
    let n20 = mu20 / (m00 * m00);
    let n02 = mu02 / (m00 * m00);

    let phi1 = n20 + n02;
    let phi2 = (n20 + n02) * (n20 + n02) + 4.0 * n11 * n11;

    Some(Moments {
        area: m00,
        m10,
        m01,
        m11,
        m20,
        m02,
        center_x,
        center_y,
        mu11,
        mu20,
        mu02,
        angle,
        n11,
        n20,
        n02,
        phi1,
        phi2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_square(canvas: usize, x0: usize, y0: usize, side: usize) -> Mask {
        let mut mask = Mask::new(canvas, canvas);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                mask.set(x, y, 255);
            }
        }
        mask
    }

    fn filled_circle(canvas: usize, cx: f64, cy: f64, r: f64) -> Mask {
        let mut mask = Mask::new(canvas, canvas);
        for y in 0..canvas {
            for x in 0..canvas {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r * r {
                    mask.set(x, y, 255);
                }
            }
        }
        mask
    }

    #[test]
    fn empty_region_has_no_moments() {
        assert!(moments(&Mask::new(8, 8), true).is_none());
    }

    #[test]
    fn square_center_and_area() {
        let mask = filled_square(20, 5, 7, 6);
        let m = moments(&mask, true).unwrap();
        assert_eq!(m.area, 36.0);
        assert!((m.center_x - 7.5).abs() < 1e-9);
        assert!((m.center_y - 9.5).abs() < 1e-9);
    }

    #[test]
    fn circle_center_matches_geometric_center() {
        let mask = filled_circle(41, 20.0, 20.0, 9.0);
        let m = moments(&mask, true).unwrap();
        assert!((m.center_x - 20.0).abs() < 1.0);
        assert!((m.center_y - 20.0).abs() < 1.0);
    }

    #[test]
    fn phi1_is_scale_invariant() {
        // On the pixel grid, phi1 of a solid n-sided square is exactly
        // (n^2 - 1) / (6 n^2), converging to 1/6 as the side grows.
        let analytic = |n: f64| (n * n - 1.0) / (6.0 * n * n);
        let small = moments(&filled_square(60, 10, 10, 10), true).unwrap();
        let large = moments(&filled_square(60, 5, 5, 30), true).unwrap();
        assert!(
            (small.phi1 - analytic(10.0)).abs() < 1e-9,
            "phi1 {:.6} vs analytic {:.6}",
            small.phi1,
            analytic(10.0)
        );
        assert!(
            (large.phi1 - analytic(30.0)).abs() < 1e-9,
            "phi1 {:.6} vs analytic {:.6}",
            large.phi1,
            analytic(30.0)
        );
        // The discretization gap between the two sizes stays well inside
        // an acceptance band's width.
        assert!((small.phi1 - large.phi1).abs() < 2e-3);
        assert!((large.phi1 - 1.0 / 6.0).abs() < 5e-3);
    }

    #[test]
    fn phi1_is_translation_invariant() {
        let a = moments(&filled_square(60, 2, 3, 12), true).unwrap();
        let b = moments(&filled_square(60, 40, 31, 12), true).unwrap();
        assert!((a.phi1 - b.phi1).abs() < 1e-12);
        assert!((a.phi2 - b.phi2).abs() < 1e-12);
    }

    #[test]
    fn elongated_region_orientation() {
        // A horizontal bar: principal axis along x, angle ~ 0.
        let mut mask = Mask::new(30, 30);
        for x in 5..25 {
            for y in 14..17 {
                mask.set(x, y, 255);
            }
        }
        let m = moments(&mask, true).unwrap();
        assert!(m.angle.abs() < 1e-6, "angle {}", m.angle);
        assert!(m.mu20 > m.mu02);
    }
}
