// THEORY:
// The `kernel` module holds small linear convolution kernels. The detector's
// main path is purely rank/morphology based, but the overlay can render a
// Laplacian-of-Gaussian edge image instead of the traced contour, and the
// classic 3x3 kernels stay available for experimentation.
//
// Kernels are value types. Averaging kernels are normalized on construction
// so their coefficients sum to 1 (zero-sum and already-normalized kernels
// are left alone). Two kernels can be fused into one by convolving their
// coefficient grids, giving a (r1 + r2 - 1)-sided kernel that applies both
// in a single image pass.

use std::ops::{Add, Mul};

use crate::core_modules::frame::Mask;

/// A rows x cols grid of convolution coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    coeffs: Vec<f32>,
    rows: usize,
    cols: usize,
}

const LOWPASS: [f32; 9] = [
    1.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, //
    1.0, 1.0, 1.0,
];

const HIGHPASS: [f32; 9] = [
    -1.0, -1.0, -1.0, //
    -1.0, 8.0, -1.0, //
    -1.0, -1.0, -1.0,
];

const LAPLACIAN: [f32; 9] = [
    0.0, 1.0, 0.0, //
    1.0, -4.0, 1.0, //
    0.0, 1.0, 0.0,
];

const LAPLACIAN_TRIANGULAR: [f32; 9] = [
    1.0, 0.0, 1.0, //
    0.0, -4.0, 0.0, //
    1.0, 0.0, 1.0,
];

#[rustfmt::skip]
const LAPLACIAN_OF_GAUSSIAN: [f32; 81] = [
    0.0,  0.0,  1.0,   2.0,    2.0,   2.0,  1.0,  0.0, 0.0,
    0.0,  1.0,  5.0,  10.0,   12.0,  10.0,  5.0,  1.0, 0.0,
    1.0,  5.0, 15.0,  19.0,   16.0,  19.0, 15.0,  5.0, 1.0,
    2.0, 10.0, 19.0, -19.0,  -64.0, -19.0, 19.0, 10.0, 2.0,
    2.0, 12.0, 16.0, -64.0, -148.0, -64.0, 16.0, 12.0, 2.0,
    2.0, 10.0, 19.0, -19.0,  -64.0, -19.0, 19.0, 10.0, 2.0,
    1.0,  5.0, 15.0,  19.0,   16.0,  19.0, 15.0,  5.0, 1.0,
    0.0,  1.0,  5.0,  10.0,   12.0,  10.0,  5.0,  1.0, 0.0,
    0.0,  0.0,  1.0,   2.0,    2.0,   2.0,  1.0,  0.0, 0.0,
];

impl FilterKernel {
    /// Builds a square kernel from row-major coefficients, normalizing unless
    /// the coefficients already sum to 0 or 1.
    pub fn new(coeffs: &[f32], side: usize) -> Self {
        debug_assert!(side % 2 == 1 && coeffs.len() == side * side);
        let mut kernel = Self {
            coeffs: coeffs.to_vec(),
            rows: side,
            cols: side,
        };
        let sum: f32 = kernel.coeffs.iter().sum();
        if sum != 0.0 && sum != 1.0 {
            kernel.normalize();
        }
        kernel
    }

    pub fn lowpass() -> Self {
        Self::new(&LOWPASS, 3)
    }

    pub fn highpass() -> Self {
        Self::new(&HIGHPASS, 3)
    }

    pub fn laplacian() -> Self {
        Self::new(&LAPLACIAN, 3)
    }

    pub fn laplacian_triangular() -> Self {
        Self::new(&LAPLACIAN_TRIANGULAR, 3)
    }

    pub fn laplacian_of_gaussian() -> Self {
        Self::new(&LAPLACIAN_OF_GAUSSIAN, 9)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Scales coefficients so they sum to 1. Zero-sum kernels (edge
    /// detectors) are left untouched.
    pub fn normalize(&mut self) {
        let sum: f32 = self.coeffs.iter().sum();
        if sum.abs() > 1e-4 {
            for c in &mut self.coeffs {
                *c /= sum;
            }
        }
    }

    /// Convolves the kernel over a single-channel image. Windows shrink at
    /// borders (out-of-range taps contribute nothing); results clamp to
    /// [0; 255].
    pub fn apply(&self, src: &Mask, out: &mut Mask) {
        let width = src.width();
        let height = src.height();
        out.reset(width, height);

        let half_r = (self.rows / 2) as isize;
        let half_c = (self.cols / 2) as isize;

        for y in 0..height {
            for x in 0..width {
                let mut acc = 0.0f32;
                for k in -half_r..=half_r {
                    let ny = y as isize + k;
                    if ny < 0 || ny >= height as isize {
                        continue;
                    }
                    for l in -half_c..=half_c {
                        let nx = x as isize + l;
                        if nx < 0 || nx >= width as isize {
                            continue;
                        }
                        let coeff =
                            self.coeffs[((k + half_r) * self.cols as isize + (l + half_c)) as usize];
                        acc += coeff * src.get(nx as usize, ny as usize) as f32;
                    }
                }
                out.set(x, y, acc.clamp(0.0, 255.0) as u8);
            }
        }
    }
}

/// Fuses two kernels by convolving their coefficient grids. Applying the
/// result equals applying both kernels in sequence (away from borders).
impl Add for FilterKernel {
    type Output = FilterKernel;

    fn add(self, rhs: FilterKernel) -> FilterKernel {
        let out_rows = self.rows + rhs.rows - 1;
        let out_cols = self.cols + rhs.cols - 1;
        let mut coeffs = vec![0.0f32; out_rows * out_cols];
        for (i, &a) in self.coeffs.iter().enumerate() {
            let ay = i / self.cols;
            let ax = i % self.cols;
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                let by = j / rhs.cols;
                let bx = j % rhs.cols;
                coeffs[(ay + by) * out_cols + (ax + bx)] += a * b;
            }
        }
        FilterKernel {
            coeffs,
            rows: out_rows,
            cols: out_cols,
        }
    }
}

impl Mul<f32> for FilterKernel {
    type Output = FilterKernel;

    fn mul(mut self, gain: f32) -> FilterKernel {
        for c in &mut self.coeffs {
            *c *= gain;
        }
        self
    }
}
