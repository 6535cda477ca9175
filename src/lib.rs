// THEORY:
// strike_vision is a real-time color-object detector driving a two-arm
// solenoid striker. A BGR frame stream is thresholded in HSV space, cleaned
// by a percentile filter and binary morphology, split into regions, and each
// region is accepted or rejected by its moment invariants and Euler number.
// Accepted targets accumulate evidence in the decision tracker, which queues
// strike tokens for the actuator state machine.
//
// `core_modules` holds the individual stages, `pipeline` chains them,
// `runner` owns the 50 FPS loop, and `error` splits fatal capture failures
// from recoverable per-frame ones.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod runner;

pub use crate::core_modules::actuator::{Actuator, Level, Side, SolenoidDriver};
pub use crate::core_modules::decision::{DecisionConfig, DecisionTracker};
pub use crate::core_modules::frame::{Frame, Mask};
pub use crate::core_modules::ring_buffer::TargetQueue;
pub use crate::error::{CaptureError, PipelineError};
pub use crate::pipeline::{DetectorConfig, DetectorPipeline, Detection, FrameReport};
pub use crate::runner::{FrameSource, Runner};
