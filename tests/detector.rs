// End-to-end checks of the full analysis chain on synthetic frames.

use std::cell::RefCell;
use std::rc::Rc;

use strike_vision::core_modules::color::ColorRange;
use strike_vision::core_modules::actuator::{Level, Side};
use strike_vision::error::CaptureError;
use strike_vision::pipeline::{DetectorConfig, DetectorPipeline};
use strike_vision::runner::{FrameSource, Runner};
use strike_vision::{Frame, PipelineError, SolenoidDriver};

/// Accepts bright, unsaturated (white) pixels regardless of hue.
fn white_target_config() -> DetectorConfig {
    DetectorConfig {
        color_range: ColorRange::new([0, 0, 200], [179, 50, 255]),
        // A solid square has phi1 near 1/6.
        phi1_min: 0.1,
        phi1_max: 0.3,
        area_min: 2000.0,
        area_max: 3000.0,
        trace_outlines: true,
        ..DetectorConfig::default()
    }
}

fn frame_with_white_square(size: usize, x0: usize, y0: usize, side: usize) -> Frame {
    let mut frame = Frame::new(size, size);
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            frame.set_pixel(x, y, [255, 255, 255]);
        }
    }
    frame
}

#[test]
fn white_square_yields_exactly_one_detection() {
    let mut pipeline = DetectorPipeline::new();
    let frame = frame_with_white_square(100, 25, 25, 50);
    let report = pipeline.process(&frame, &white_target_config()).unwrap();

    assert_eq!(report.detections.len(), 1);
    let m = &report.detections[0].moments;
    assert!((m.center_x - 49.5).abs() < 1.5, "center_x {}", m.center_x);
    assert!((m.center_y - 49.5).abs() < 1.5, "center_y {}", m.center_y);
    assert!(m.area > 2400.0 && m.area <= 2500.0, "area {}", m.area);
    assert!(m.phi1 > 0.1 && m.phi1 < 0.3, "phi1 {}", m.phi1);
    assert!(!report.detections[0].contour.is_empty());
}

#[test]
fn hollow_square_is_rejected_by_euler_number() {
    let mut pipeline = DetectorPipeline::new();
    let mut frame = frame_with_white_square(100, 25, 25, 50);
    // Punch a hole bigger than the closing element so it survives the
    // morphology stage.
    for y in 40..60 {
        for x in 40..60 {
            frame.set_pixel(x, y, [0, 0, 0]);
        }
    }
    let report = pipeline.process(&frame, &white_target_config()).unwrap();
    assert!(report.detections.is_empty());
}

#[test]
fn black_frame_is_skipped_before_analysis() {
    let mut pipeline = DetectorPipeline::new();
    let frame = Frame::new(100, 100);
    assert_eq!(
        pipeline.process(&frame, &white_target_config()).unwrap_err(),
        PipelineError::NoForeground
    );
}

#[test]
fn repeated_frames_reuse_buffers_and_stay_consistent() {
    let mut pipeline = DetectorPipeline::new();
    let cfg = white_target_config();
    let big = frame_with_white_square(100, 25, 25, 50);
    // A differently sized frame, with the square far enough from the edge
    // that the closing element never gets border-clipped around it.
    let small = frame_with_white_square(90, 20, 20, 50);

    let first = pipeline.process(&big, &cfg).unwrap();
    let second = pipeline.process(&small, &cfg).unwrap();
    let third = pipeline.process(&big, &cfg).unwrap();

    assert_eq!(first.detections.len(), 1);
    assert_eq!(second.detections.len(), 1);
    assert_eq!(third.detections.len(), 1);
    let a = &first.detections[0].moments;
    let b = &third.detections[0].moments;
    assert_eq!(a.area, b.area);
    assert_eq!(a.center_x, b.center_x);
}

struct WhiteSquareSource {
    remaining: u32,
    y0: usize,
}

impl FrameSource for WhiteSquareSource {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        if self.remaining == 0 {
            return Err(CaptureError::EndOfStream);
        }
        self.remaining -= 1;
        Ok(frame_with_white_square(100, 25, self.y0, 50))
    }
}

#[derive(Clone, Default)]
struct RecordingDriver {
    ops: Rc<RefCell<Vec<(Side, Level)>>>,
}

impl SolenoidDriver for RecordingDriver {
    fn set(&mut self, side: Side, level: Level) {
        self.ops.borrow_mut().push((side, level));
    }
}

#[test]
fn detector_fires_a_strike_at_a_lingering_target() {
    // Square center y = 50: below the middle line (100 / 2 - 10 = 40) and
    // inside the borders, so the right arm fires.
    let source = WhiteSquareSource { remaining: 20, y0: 25 };
    let driver = RecordingDriver::default();
    let ops = Rc::clone(&driver.ops);
    let mut runner = Runner::new(source, driver, white_target_config());
    runner.run(|_| false).unwrap();

    let ops = ops.borrow();
    assert!(ops.contains(&(Side::Right, Level::Engaged)), "ops: {ops:?}");
    // Every exit path releases both arms.
    assert_eq!(ops.last(), Some(&(Side::Right, Level::Disengaged)));
}
