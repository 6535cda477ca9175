// THEORY:
// The `pipeline` module chains the five analysis stages into one pass over a
// captured BGR frame:
//   1. HSV threshold: keep pixels inside the calibrated color band.
//   2. Percentile filter: knock out salt-and-pepper noise in the mask.
//   3. Crop: shrink the working area to the foreground bounding box (plus
//      padding) so the expensive stages only touch relevant pixels.
//   4. Morphological closing then opening: weld cracks, drop speckle.
//   5. Segmentation + shape classification: split the mask into regions and
//      accept the ones whose area, phi1 invariant and Euler number match the
//      calibrated target profile.
// Accepted regions come back sorted by center x so the decision layer can
// address targets left to right. Every intermediate buffer lives inside the
// pipeline value and is re-used across frames; a frame in flight never
// allocates beyond what the previous largest frame needed.

use std::time::Instant;

use crate::core_modules::color::{self, ColorRange};
use crate::core_modules::contour::{self, TraceConnectivity};
use crate::core_modules::decision::DecisionConfig;
use crate::core_modules::euler::{self, EulerConnectivity};
use crate::core_modules::frame::{Frame, Mask};
use crate::core_modules::kernel::FilterKernel;
use crate::core_modules::moments::{self, Moments};
use crate::core_modules::morphology::{self, ElementShape};
use crate::core_modules::rank_filter::rank_filter;
use crate::core_modules::segmentation::{SegmentCount, Segmenter};
use crate::error::PipelineError;

/// How the overlay renders a detection's outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMethod {
    /// Walk the boundary with the Moore tracer (default, fastest for a
    /// single region per segment).
    ContourTrace,
    /// Laplacian edge image of the segment mask.
    Laplacian,
    /// Lowpass-smoothed Laplacian, fused into a single kernel.
    LowpassLaplacian,
}

/// Every tunable of the detector. Field defaults are the calibration the
/// detector shipped with (green targets under indoor light, 320x240 feed).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// HSV acceptance band. The hue bound may wrap (low > high) for red.
    pub color_range: ColorRange,
    /// Percentile filter window side (odd).
    pub window_size: usize,
    /// Percentile in [0; 100]; 50 is the median.
    pub percentile: u32,
    /// Skip known-background pixels in the percentile filter.
    pub skip_background: bool,
    /// Extra margin kept around the foreground bounding box.
    pub crop_padding: usize,
    /// Structuring element side for closing (weld cracks).
    pub closing_size: usize,
    /// Structuring element side for opening (drop speckle).
    pub opening_size: usize,
    pub element_shape: ElementShape,
    /// Neighbor search radius of the segmenter.
    pub neighbor_radius: usize,
    /// Accepted band of the phi1 invariant (exclusive bounds).
    pub phi1_min: f64,
    pub phi1_max: f64,
    /// Accepted pixel-area band (exclusive bounds).
    pub area_min: f64,
    pub area_max: f64,
    pub edge_method: EdgeMethod,
    /// Trace accepted regions' boundaries for the overlay. Off by default
    /// to keep the walk off the per-frame hot path; the runner switches it
    /// on when a frame sink is installed.
    pub trace_outlines: bool,
    pub decision: DecisionConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            color_range: ColorRange::new([40, 145, 55], [80, 255, 255]),
            window_size: 3,
            percentile: 50,
            skip_background: false,
            crop_padding: 30,
            closing_size: 20,
            opening_size: 3,
            element_shape: ElementShape::Ellipse,
            neighbor_radius: 5,
            phi1_min: 0.21,
            phi1_max: 0.32,
            area_min: 50.0,
            area_max: 100.0,
            edge_method: EdgeMethod::ContourTrace,
            trace_outlines: false,
            decision: DecisionConfig::default(),
        }
    }
}

/// One accepted target.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Shape descriptors; center coordinates are mapped back into the full
    /// frame, everything else is crop-local.
    pub moments: Moments,
    /// Boundary pixels in crop-local coordinates. Empty when outline
    /// tracing is disabled or the boundary walk blew its step budget.
    pub contour: Vec<(usize, usize)>,
    /// Index of the segment mask this detection came from.
    pub segment: usize,
}

/// Result of analyzing one frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Accepted targets, sorted by center x.
    pub detections: Vec<Detection>,
    /// Region count of the segmentation stage, with its saturation flag.
    pub segments: SegmentCount,
    /// Top-left corner of the cropped analysis window in the full frame.
    pub origin: (usize, usize),
}

/// The detector with all its re-used working buffers.
#[derive(Debug, Default)]
pub struct DetectorPipeline {
    hsv: Frame,
    thresholded: Mask,
    filtered: Mask,
    cropped: Mask,
    closed: Mask,
    cleaned: Mask,
    scratch: Mask,
    segments: Vec<Mask>,
    segmenter: Segmenter,
}

impl DetectorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the full stage chain on one BGR frame.
    pub fn process(
        &mut self,
        frame: &Frame,
        cfg: &DetectorConfig,
    ) -> Result<FrameReport, PipelineError> {
        let started = Instant::now();

        color::bgr_to_hsv(frame, &mut self.hsv);
        color::threshold(&self.hsv, &cfg.color_range, &mut self.thresholded);
        rank_filter(
            &self.thresholded,
            &mut self.filtered,
            cfg.window_size,
            cfg.percentile,
            cfg.skip_background,
        );

        let origin = self.crop(cfg.crop_padding)?;

        morphology::close(
            &self.cropped,
            &mut self.closed,
            &mut self.scratch,
            cfg.closing_size,
            cfg.element_shape,
            true,
        );
        morphology::open(
            &self.closed,
            &mut self.cleaned,
            &mut self.scratch,
            cfg.opening_size,
            cfg.element_shape,
            true,
        );

        let segments = self.segmenter.segment(
            &self.cleaned,
            cfg.neighbor_radius,
            true,
            &mut self.segments,
        );

        let mut detections = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            // Segment masks are non-empty by construction.
            let Some(mut m) = moments::moments(segment, true) else {
                continue;
            };
            let euler = euler::euler_number(segment, EulerConnectivity::Eight, true);
            let accepted = m.phi1 > cfg.phi1_min
                && m.phi1 < cfg.phi1_max
                && m.area > cfg.area_min
                && m.area < cfg.area_max
                && euler == 1;
            if !accepted {
                log::trace!(
                    "segment {i} rejected: phi1 {:.4} area {:.0} euler {euler}",
                    m.phi1,
                    m.area
                );
                continue;
            }

            // The outline is diagnostic only, so a boundary walk that blows
            // its budget costs this segment its outline, never the frame.
            let contour = if cfg.trace_outlines {
                match contour::trace_boundary(segment, TraceConnectivity::Eight, true) {
                    Ok(points) => points,
                    Err(PipelineError::ContourTooComplex { budget }) => {
                        log::warn!(
                            "segment {i}: boundary walk exceeded {budget} steps, dropping outline"
                        );
                        Vec::new()
                    }
                    Err(err) => return Err(err),
                }
            } else {
                Vec::new()
            };

            // Map the center of mass back into full-frame coordinates.
            m.center_x += origin.0 as f64;
            m.center_y += origin.1 as f64;
            detections.push(Detection {
                moments: m,
                contour,
                segment: i,
            });
        }

        detections.sort_by(|a, b| a.moments.center_x.total_cmp(&b.moments.center_x));

        log::trace!(
            "frame analyzed in {:.2} ms: {} segment(s), {} detection(s)",
            started.elapsed().as_secs_f64() * 1000.0,
            segments.count,
            detections.len()
        );

        Ok(FrameReport {
            detections,
            segments,
            origin,
        })
    }

    /// Crops the filtered mask to the padded foreground bounding box and
    /// reports the crop origin. A frame with no foreground is skipped here,
    /// before the expensive morphology runs.
    fn crop(&mut self, padding: usize) -> Result<(usize, usize), PipelineError> {
        let width = self.filtered.width();
        let height = self.filtered.height();

        let mut bbox: Option<(usize, usize, usize, usize)> = None;
        for y in 0..height {
            for x in 0..width {
                if self.filtered.get(x, y) != 0 {
                    bbox = Some(match bbox {
                        None => (x, x, y, y),
                        Some((min_x, max_x, min_y, max_y)) => {
                            (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y))
                        }
                    });
                }
            }
        }
        let (min_x, max_x, min_y, max_y) = bbox.ok_or(PipelineError::NoForeground)?;

        let x0 = min_x.saturating_sub(padding);
        let y0 = min_y.saturating_sub(padding);
        let x1 = (max_x + padding).min(width - 1);
        let y1 = (max_y + padding).min(height - 1);

        self.cropped.reset(x1 - x0 + 1, y1 - y0 + 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.cropped.set(x - x0, y - y0, self.filtered.get(x, y));
            }
        }
        Ok((x0, y0))
    }

    /// Draws guide lines and detection marks onto `frame` (the original
    /// capture the report was computed from).
    pub fn draw_overlay(&self, frame: &mut Frame, report: &FrameReport, cfg: &DetectorConfig) {
        use crate::core_modules::overlay;

        overlay::draw_guides(
            frame,
            cfg.decision.top_border,
            cfg.decision.bottom_border,
            cfg.decision.middle_offset,
        );

        let mut edge = Mask::new(0, 0);
        for detection in &report.detections {
            match cfg.edge_method {
                EdgeMethod::ContourTrace => {
                    overlay::draw_detection(frame, &detection.moments, &detection.contour, report.origin);
                }
                EdgeMethod::Laplacian | EdgeMethod::LowpassLaplacian => {
                    let kernel = if cfg.edge_method == EdgeMethod::Laplacian {
                        FilterKernel::laplacian()
                    } else {
                        FilterKernel::laplacian() + FilterKernel::lowpass()
                    };
                    kernel.apply(&self.segments[detection.segment], &mut edge);
                    let mut points = Vec::new();
                    for y in 0..edge.height() {
                        for x in 0..edge.width() {
                            if edge.get(x, y) != 0 {
                                points.push((x, y));
                            }
                        }
                    }
                    overlay::draw_detection(frame, &detection.moments, &points, report.origin);
                }
            }
        }
    }
}
