use crate::{GpioInput, GpioResult};
use std::fmt::{Debug, Formatter};
use std::hint::spin_loop;
use std::time::{Duration, Instant};

/// A blocking debounce over a GPIO input.
///
/// [SettleWait::wait_for] spins until the input has read the target state
/// continuously for the whole settle window, so contact bounce around an edge
/// cannot end the wait early. With a zero settle time it degenerates to a
/// plain busy-wait on the raw state.
pub struct SettleWait<'a> {
    input: &'a dyn GpioInput,
    pub settle_time: Duration,
}

impl<'a> SettleWait<'a> {
    pub fn new(input: &'a dyn GpioInput) -> Self {
        Self {
            input,
            settle_time: Duration::from_millis(20),
        }
    }

    pub fn with_settle_time(mut self, settle_time: Duration) -> Self {
        self.settle_time = settle_time;
        self
    }

    /// Blocks until the input has held `target` for the settle window.
    ///
    /// There is no timeout; the caller owns the decision to wait forever.
    pub fn wait_for(&self, target: bool) -> GpioResult<()> {
        let mut stable_since: Option<Instant> = None;

        loop {
            if self.input.read()? == target {
                let since = *stable_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= self.settle_time {
                    return Ok(());
                }
            } else {
                stable_since = None;
            }
            spin_loop();
        }
    }
}

impl Debug for SettleWait<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}(settle {:?})", self.input, self.settle_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GpioError;
    use std::cell::RefCell;

    /// Replays a fixed sequence of samples, then holds the last one.
    #[derive(Debug)]
    struct ReplayInput {
        samples: RefCell<Vec<bool>>,
    }

    impl ReplayInput {
        fn new(mut samples: Vec<bool>) -> Self {
            samples.reverse();
            Self {
                samples: RefCell::new(samples),
            }
        }
    }

    impl GpioInput for ReplayInput {
        fn read(&self) -> GpioResult<bool> {
            let mut samples = self.samples.borrow_mut();
            match samples.len() {
                0 => Err(GpioError::Other("replay exhausted".into())),
                1 => Ok(samples[0]),
                _ => Ok(samples.pop().expect("non-empty")),
            }
        }
    }

    #[test]
    fn waits_through_bounce() {
        let input = ReplayInput::new(vec![true, true, false, true, false, false]);
        let wait = SettleWait::new(&input).with_settle_time(Duration::from_millis(1));
        wait.wait_for(false).unwrap();
        // The bounce back to `true` mid-sequence reset the window, so every
        // sample was consumed before the input counted as settled.
        assert_eq!(input.samples.borrow().len(), 1);
    }

    #[test]
    fn returns_immediately_when_already_settled() {
        let input = ReplayInput::new(vec![false]);
        let wait = SettleWait::new(&input).with_settle_time(Duration::ZERO);
        wait.wait_for(false).unwrap();
    }

    #[test]
    fn propagates_input_errors() {
        let input = ReplayInput::new(vec![]);
        let wait = SettleWait::new(&input).with_settle_time(Duration::ZERO);
        assert!(wait.wait_for(false).is_err());
    }
}
