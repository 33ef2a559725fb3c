//! Time units and bounded waiting

pub use fugit::{
    HertzU32 as Hertz, KilohertzU32 as KiloHertz, MegahertzU32 as MegaHertz,
    MicrosDurationU32 as MicroSeconds, MillisDurationU32 as MilliSeconds,
    NanosDurationU32 as NanoSeconds,
};

/// Bits per second
pub type Bps = Hertz;

/// Extension trait that adds convenience methods to the `u32` type
pub trait U32Ext {
    /// Wrap in `Bps`
    fn bps(self) -> Bps;
}

impl U32Ext for u32 {
    fn bps(self) -> Bps {
        Bps::from_raw(self)
    }
}

/// A point on the millisecond timeline of a [`Monotonic`] clock
pub type Instant = fugit::TimerInstantU64<1000>;

/// A monotonically nondecreasing millisecond clock
pub trait Monotonic {
    /// The current time
    fn now(&self) -> Instant;
}

/// A bounded wait ran out of time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout;

/// Polls `done` until it returns `true` or `timeout` has elapsed on `mono`.
///
/// The condition is always evaluated at least once, and once more after the
/// deadline has passed, so a condition met just as time runs out still
/// succeeds.
pub fn wait_until<M, F>(
    mono: &M,
    timeout: MilliSeconds,
    mut done: F,
) -> Result<(), Timeout>
where
    M: Monotonic + ?Sized,
    F: FnMut() -> bool,
{
    let deadline = mono.now() + timeout;
    loop {
        if done() {
            return Ok(());
        }
        if mono.now() >= deadline {
            return if done() { Ok(()) } else { Err(Timeout) };
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use core::cell::Cell;

    /// A clock that advances by a fixed step every time it is read
    pub(crate) struct SteppingClock {
        now: Cell<u64>,
        step: u64,
    }

    impl SteppingClock {
        pub(crate) fn new(step: u64) -> Self {
            Self {
                now: Cell::new(0),
                step,
            }
        }
    }

    impl Monotonic for SteppingClock {
        fn now(&self) -> Instant {
            let now = self.now.get();
            self.now.set(now + self.step);
            Instant::from_ticks(now)
        }
    }

    #[test]
    fn wait_until_succeeds_immediately() {
        let clock = SteppingClock::new(1);
        assert_eq!(wait_until(&clock, MilliSeconds::millis(0), || true), Ok(()));
    }

    #[test]
    fn wait_until_times_out() {
        let clock = SteppingClock::new(1);
        let mut polls = 0;
        let result = wait_until(&clock, MilliSeconds::millis(10), || {
            polls += 1;
            false
        });
        assert_eq!(result, Err(Timeout));
        assert!(polls >= 10);
    }

    #[test]
    fn wait_until_condition_met_before_deadline() {
        let clock = SteppingClock::new(1);
        let mut polls = 0;
        let result = wait_until(&clock, MilliSeconds::millis(100), || {
            polls += 1;
            polls == 5
        });
        assert_eq!(result, Ok(()));
        assert_eq!(polls, 5);
    }
}
