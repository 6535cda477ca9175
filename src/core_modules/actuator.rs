// THEORY:
// The `actuator` module runs the solenoid strike cycle as a non-blocking
// three-state machine polled once per frame. READY waits out the recovery
// dwell, then pops the next token from the strike queue; STRIKE engages the
// matching arm; RECOVER holds it for the strike dwell, releases, and returns
// to READY. Each dwell is 30 ms, enough for the plunger to travel fully in
// either direction.
//
// Time is passed in by the caller and hardware sits behind a trait, so the
// full cycle runs under test with a fake clock and a recording driver.

use std::time::{Duration, Instant};

use crate::core_modules::ring_buffer::TargetQueue;

/// Plunger travel time, used for both the strike and recovery dwells.
pub const SOLENOID_DWELL: Duration = Duration::from_millis(30);

/// Which arm a token addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Electrical command to one arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Engaged,
    Disengaged,
}

/// Hardware seam for the two solenoid arms.
pub trait SolenoidDriver {
    fn set(&mut self, side: Side, level: Level);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorState {
    Ready,
    Strike,
    Recover,
}

/// Non-blocking strike cycle driver. `poll` must be called every loop
/// iteration; it never sleeps.
#[derive(Debug)]
pub struct Actuator {
    state: ActuatorState,
    side: Side,
    timer: Instant,
    free: bool,
}

impl Actuator {
    pub fn new(now: Instant) -> Self {
        Self {
            state: ActuatorState::Ready,
            side: Side::Left,
            timer: now,
            free: true,
        }
    }

    /// True when the plunger is up and no strike is in flight. The decision
    /// layer only accumulates evidence while this holds.
    pub fn is_free(&self) -> bool {
        self.free
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Advances the cycle by one poll.
    pub fn poll(&mut self, now: Instant, queue: &mut TargetQueue, driver: &mut dyn SolenoidDriver) {
        match self.state {
            ActuatorState::Ready => {
                if now.duration_since(self.timer) > SOLENOID_DWELL {
                    self.free = true;
                    if let Some(token) = queue.read() {
                        self.side = if token > 0 { Side::Right } else { Side::Left };
                        self.state = ActuatorState::Strike;
                        self.free = false;
                    }
                }
            }
            ActuatorState::Strike => {
                driver.set(self.side, Level::Engaged);
                self.timer = now;
                self.state = ActuatorState::Recover;
            }
            ActuatorState::Recover => {
                if now.duration_since(self.timer) > SOLENOID_DWELL {
                    driver.set(self.side, Level::Disengaged);
                    self.timer = now;
                    self.state = ActuatorState::Ready;
                }
            }
        }
    }

    /// Releases both arms. Called once on the way out of the run loop.
    pub fn shutdown(&mut self, driver: &mut dyn SolenoidDriver) {
        driver.set(Side::Left, Level::Disengaged);
        driver.set(Side::Right, Level::Disengaged);
        self.state = ActuatorState::Ready;
        self.free = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingDriver {
        ops: Vec<(Side, Level)>,
    }

    impl SolenoidDriver for RecordingDriver {
        fn set(&mut self, side: Side, level: Level) {
            self.ops.push((side, level));
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn idle_actuator_stays_ready_and_free() {
        let t0 = Instant::now();
        let mut actuator = Actuator::new(t0);
        let mut queue = TargetQueue::new();
        let mut driver = RecordingDriver::default();
        for step in 1..5u64 {
            actuator.poll(t0 + ms(40 * step), &mut queue, &mut driver);
        }
        assert_eq!(actuator.state(), ActuatorState::Ready);
        assert!(actuator.is_free());
        assert!(driver.ops.is_empty());
    }

    #[test]
    fn full_strike_cycle_with_fake_clock() {
        let t0 = Instant::now();
        let mut actuator = Actuator::new(t0);
        let mut queue = TargetQueue::new();
        let mut driver = RecordingDriver::default();
        queue.write(1);

        // Initial dwell passes, token popped.
        actuator.poll(t0 + ms(31), &mut queue, &mut driver);
        assert_eq!(actuator.state(), ActuatorState::Strike);
        assert!(!actuator.is_free());

        // Strike engages the right arm.
        actuator.poll(t0 + ms(31), &mut queue, &mut driver);
        assert_eq!(driver.ops, vec![(Side::Right, Level::Engaged)]);
        assert_eq!(actuator.state(), ActuatorState::Recover);

        // Not enough dwell yet: stays engaged.
        actuator.poll(t0 + ms(50), &mut queue, &mut driver);
        assert_eq!(actuator.state(), ActuatorState::Recover);
        assert_eq!(driver.ops.len(), 1);

        // Dwell elapsed: disengage and return to ready.
        actuator.poll(t0 + ms(62), &mut queue, &mut driver);
        assert_eq!(driver.ops.last(), Some(&(Side::Right, Level::Disengaged)));
        assert_eq!(actuator.state(), ActuatorState::Ready);
        assert!(!actuator.is_free());

        // Recovery dwell elapses with an empty queue: free again.
        actuator.poll(t0 + ms(93), &mut queue, &mut driver);
        assert!(actuator.is_free());
    }

    #[test]
    fn negative_token_strikes_left() {
        let t0 = Instant::now();
        let mut actuator = Actuator::new(t0);
        let mut queue = TargetQueue::new();
        let mut driver = RecordingDriver::default();
        queue.write(-1);

        actuator.poll(t0 + ms(31), &mut queue, &mut driver);
        actuator.poll(t0 + ms(31), &mut queue, &mut driver);
        assert_eq!(driver.ops, vec![(Side::Left, Level::Engaged)]);
    }

    #[test]
    fn queued_tokens_drain_one_cycle_at_a_time() {
        let t0 = Instant::now();
        let mut actuator = Actuator::new(t0);
        let mut queue = TargetQueue::new();
        let mut driver = RecordingDriver::default();
        queue.write(1);
        queue.write(-1);

        let mut t = t0;
        while !queue.is_empty() || actuator.state() != ActuatorState::Ready || !actuator.is_free() {
            t += ms(10);
            actuator.poll(t, &mut queue, &mut driver);
            assert!(t.duration_since(t0) < ms(1000), "cycle failed to drain");
        }
        assert_eq!(
            driver.ops,
            vec![
                (Side::Right, Level::Engaged),
                (Side::Right, Level::Disengaged),
                (Side::Left, Level::Engaged),
                (Side::Left, Level::Disengaged),
            ]
        );
    }

    #[test]
    fn shutdown_releases_both_arms() {
        let t0 = Instant::now();
        let mut actuator = Actuator::new(t0);
        let mut driver = RecordingDriver::default();
        actuator.shutdown(&mut driver);
        assert_eq!(
            driver.ops,
            vec![
                (Side::Left, Level::Disengaged),
                (Side::Right, Level::Disengaged),
            ]
        );
    }
}
