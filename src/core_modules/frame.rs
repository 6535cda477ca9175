// THEORY:
// The `frame` module defines the two buffer types every pipeline stage speaks:
// `Frame` (always 3 channels, BGR or HSV) and `Mask` (always 1 channel). The
// original exploratory code indexed flat pixel buffers with hand-rolled
// channel striding, which made it very easy to read one channel into the
// next pixel. Splitting the channel count into the *type* removes that whole
// bug class: a routine that only makes sense on a single-channel image simply
// takes a `Mask`, and the mistake no longer compiles.
//
// Accessors are `#[inline]` and compile down to the same flat-buffer
// arithmetic the raw pointer version used; bounds are `debug_assert!`ed so
// the release build pays nothing.

use image::{GrayImage, RgbImage};

/// Number of channels in a color [`Frame`].
pub const FRAME_CHANNELS: usize = 3;

/// An owned 3-channel 8-bit image (BGR from capture, or HSV after
/// conversion). Row-major, stride = `width * 3`. The default is a 0x0
/// frame, the starting state of every re-used scratch buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Creates a black frame of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * FRAME_CHANNELS],
        }
    }

    /// Resizes the backing buffer, zeroing all pixels. Used by scratch
    /// buffers that are re-used across frames.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height * FRAME_CHANNELS, 0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y * self.width + x) * FRAME_CHANNELS
    }

    /// Reads one channel of one pixel.
    #[inline]
    pub fn get(&self, x: usize, y: usize, channel: usize) -> u8 {
        debug_assert!(channel < FRAME_CHANNELS);
        self.data[self.index(x, y) + channel]
    }

    /// Reads all three channels of one pixel.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; FRAME_CHANNELS] {
        let i = self.index(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, value: [u8; FRAME_CHANNELS]) {
        let i = self.index(x, y);
        self.data[i..i + FRAME_CHANNELS].copy_from_slice(&value);
    }

    /// Builds a BGR frame from an `image` crate RGB buffer. This is the
    /// hand-over point for capture collaborators, which typically produce
    /// RGB; the pipeline keeps the BGR channel order of the original device
    /// stream.
    pub fn from_rgb_image(img: &RgbImage) -> Self {
        let mut frame = Frame::new(img.width() as usize, img.height() as usize);
        for (x, y, p) in img.enumerate_pixels() {
            frame.set_pixel(x as usize, y as usize, [p.0[2], p.0[1], p.0[0]]);
        }
        frame
    }

    /// Converts back to an RGB buffer for saving/display collaborators.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let [b, g, r] = self.pixel(x as usize, y as usize);
            image::Rgb([r, g, b])
        })
    }
}

/// An owned 1-channel 8-bit image. Pipeline stages use 0 for background and
/// 255 for foreground, but any 8-bit gray data is valid (the rank filter
/// accepts arbitrary grayscale). Defaults to 0x0, like [`Frame`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Mask {
    /// Creates an all-background mask of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Resizes the backing buffer and zeroes every pixel.
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height, 0);
    }

    /// Zeroes every pixel without changing dimensions.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total pixel count.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = value;
    }

    /// Number of non-zero pixels. Used by tests and the saturation notice.
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn from_gray_image(img: &GrayImage) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.as_raw().clone(),
        }
    }

    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_raw(self.width as u32, self.height as u32, self.data.clone())
            .expect("mask buffer length matches dimensions")
    }
}
