//! Blocking time source for the human-visible pacing of the UI.

use std::thread;
use std::time::Duration;

/// A blocking delay. The calculator owns no other notion of time.
pub trait Pace {
    fn delay(&self, duration: Duration);
}

/// Sleeps the calling thread for the full duration.
#[derive(Debug, Default)]
pub struct SleepPace;

impl Pace for SleepPace {
    fn delay(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
