// THEORY:
// The `runner` module owns the real-time loop: read a frame, analyze it,
// feed the detections to the decision tracker, poll the actuator, then pace
// to the target frame rate. Everything runs on one thread; the actuator
// state machine is polled rather than slept on, so a strike in flight never
// blocks the next frame.
//
// Capture failures are fatal (the loop cannot recover without frames);
// per-frame analysis failures are logged and the frame dropped. Pacing
// subtracts the time the frame took from the 20 ms budget and always sleeps
// at least 1 ms so a slow frame cannot starve the rest of the system.

use std::thread;
use std::time::{Duration, Instant};

use crate::core_modules::actuator::{Actuator, SolenoidDriver};
use crate::core_modules::decision::DecisionTracker;
use crate::core_modules::frame::Frame;
use crate::core_modules::moments::Moments;
use crate::core_modules::ring_buffer::TargetQueue;
use crate::error::CaptureError;
use crate::pipeline::{DetectorConfig, DetectorPipeline, FrameReport};

/// Target frame budget (50 FPS).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// Source of BGR frames. Implementations wrap a camera, a video file, or a
/// synthetic generator for tests.
pub trait FrameSource {
    fn read(&mut self) -> Result<Frame, CaptureError>;
}

/// Callback fed annotated frames when a sink is installed.
pub type FrameSink = Box<dyn FnMut(u64, &Frame, &FrameReport)>;

/// The detector's main loop, generic over capture and solenoid hardware.
pub struct Runner<S: FrameSource, D: SolenoidDriver> {
    source: S,
    driver: D,
    cfg: DetectorConfig,
    pipeline: DetectorPipeline,
    tracker: DecisionTracker,
    queue: TargetQueue,
    actuator: Actuator,
    sink: Option<FrameSink>,
    scratch: Vec<Moments>,
}

impl<S: FrameSource, D: SolenoidDriver> Runner<S, D> {
    pub fn new(source: S, driver: D, cfg: DetectorConfig) -> Self {
        Self {
            source,
            driver,
            cfg,
            pipeline: DetectorPipeline::new(),
            tracker: DecisionTracker::new(),
            queue: TargetQueue::new(),
            actuator: Actuator::new(Instant::now()),
            sink: None,
            scratch: Vec::new(),
        }
    }

    /// Installs a sink that receives each analyzed frame with the overlay
    /// drawn in. Intended for debug dumps and viewers. Outline tracing is
    /// switched on, since the overlay is now consumed.
    pub fn set_frame_sink(&mut self, sink: FrameSink) {
        self.cfg.trace_outlines = true;
        self.sink = Some(sink);
    }

    /// Swaps the configuration. Accumulated target evidence is dropped,
    /// since it was gathered under the old calibration.
    pub fn set_config(&mut self, mut cfg: DetectorConfig) {
        // An installed sink keeps consuming outlines across config swaps.
        cfg.trace_outlines |= self.sink.is_some();
        if cfg != self.cfg {
            log::info!("configuration updated, resetting target evidence");
            self.tracker.reset();
            self.cfg = cfg;
        }
    }

    /// Runs until `shutdown` returns true (called once per frame with the
    /// frame count) or the capture stream ends. Both solenoid arms are
    /// released on every exit path that returns `Ok` or a capture error.
    pub fn run(&mut self, mut shutdown: impl FnMut(u64) -> bool) -> Result<(), CaptureError> {
        let mut frames: u64 = 0;
        let result = loop {
            if shutdown(frames) {
                break Ok(());
            }
            let started = Instant::now();

            let mut frame = match self.source.read() {
                Ok(frame) => frame,
                Err(CaptureError::EndOfStream) => {
                    log::info!("capture stream ended after {frames} frame(s)");
                    break Ok(());
                }
                Err(err) => break Err(err),
            };

            match self.pipeline.process(&frame, &self.cfg) {
                Ok(report) => {
                    self.scratch.clear();
                    self.scratch.extend(report.detections.iter().map(|d| d.moments));
                    self.tracker.update(
                        &self.scratch,
                        frame.height() as u32,
                        Instant::now(),
                        self.actuator.is_free(),
                        &self.cfg.decision,
                        &mut self.queue,
                    );
                    if let Some(sink) = self.sink.as_mut() {
                        self.pipeline.draw_overlay(&mut frame, &report, &self.cfg);
                        sink(frames, &frame, &report);
                    }
                }
                Err(err) => log::debug!("frame {frames} dropped: {err}"),
            }

            self.actuator.poll(Instant::now(), &mut self.queue, &mut self.driver);
            frames += 1;

            let delay = FRAME_INTERVAL
                .saturating_sub(started.elapsed())
                .max(Duration::from_millis(1));
            thread::sleep(delay);
        };

        self.queue.clear();
        self.actuator.shutdown(&mut self.driver);
        result
    }
}
