// Demo binary: runs the detector against a synthetic feed (a green square
// drifting down the frame) and a solenoid driver that logs instead of
// touching GPIO. Useful for watching the whole chain fire without hardware.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use strike_vision::core_modules::actuator::{Level, Side};
use strike_vision::error::CaptureError;
use strike_vision::pipeline::DetectorConfig;
use strike_vision::runner::{FrameSource, Runner};
use strike_vision::{Frame, SolenoidDriver};

#[derive(Parser, Debug)]
#[command(name = "strike_vision", about = "Color-object detector demo feed")]
struct Args {
    /// Draw overlays and dump annotated frames under img/
    #[arg(long)]
    debug: bool,

    /// Synthetic frames to generate before the stream ends
    #[arg(long, default_value_t = 250)]
    frames: u64,
}

/// A green square drifting top to bottom across a 320x240 field, wrapping
/// around when it leaves.
struct SyntheticSource {
    remaining: u64,
    y: usize,
}

const FIELD_WIDTH: usize = 320;
const FIELD_HEIGHT: usize = 240;
const SQUARE_SIDE: usize = 9;

impl FrameSource for SyntheticSource {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        if self.remaining == 0 {
            return Err(CaptureError::EndOfStream);
        }
        self.remaining -= 1;
        self.y = (self.y + 2) % (FIELD_HEIGHT - SQUARE_SIDE);

        let mut frame = Frame::new(FIELD_WIDTH, FIELD_HEIGHT);
        for y in self.y..self.y + SQUARE_SIDE {
            for x in 150..150 + SQUARE_SIDE {
                frame.set_pixel(x, y, [0, 255, 0]);
            }
        }
        Ok(frame)
    }
}

/// Logs solenoid commands instead of driving GPIO pins.
struct LogDriver;

impl SolenoidDriver for LogDriver {
    fn set(&mut self, side: Side, level: Level) {
        info!("solenoid {side:?} -> {level:?}");
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // The synthetic target is a solid square, whose phi1 sits near 1/6;
    // widen the production bands to cover it.
    let cfg = DetectorConfig {
        phi1_min: 0.1,
        phi1_max: 0.3,
        area_min: 50.0,
        area_max: 120.0,
        ..DetectorConfig::default()
    };

    let source = SyntheticSource {
        remaining: args.frames,
        y: 0,
    };
    let mut runner = Runner::new(source, LogDriver, cfg);

    if args.debug {
        if let Err(err) = fs::create_dir_all("img") {
            error!("cannot create img/ directory: {err}");
            return ExitCode::FAILURE;
        }
        runner.set_frame_sink(Box::new(|n, frame, report| {
            if n % 25 != 0 {
                return;
            }
            info!("frame {n}: {} detection(s)", report.detections.len());
            let path = format!("img/frame{n}.png");
            if let Err(err) = frame.to_rgb_image().save(&path) {
                error!("cannot save {path}: {err}");
            }
        }));
    }

    match runner.run(|_| false) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("capture failed: {err}");
            ExitCode::FAILURE
        }
    }
}
