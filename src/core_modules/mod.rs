pub mod actuator;
pub mod color;
pub mod contour;
pub mod decision;
pub mod euler;
pub mod frame;
pub mod histogram;
pub mod kernel;
pub mod moments;
pub mod morphology;
pub mod overlay;
pub mod rank_filter;
pub mod ring_buffer;
pub mod segmentation;
