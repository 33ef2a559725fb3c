//! SysTick as a millisecond timebase
//!
//! [`SysTick`] runs the Cortex-M system timer from HCLK at a fixed tick rate
//! and counts its exceptions. The application forwards its `SysTick`
//! exception to [`SysTick::on_interrupt`]:
//!
//! ```no_run
//! let systick = SysTick::new(core.SYST, &ccdr.clocks, 1.kHz());
//!
//! #[exception]
//! fn SysTick() {
//!     SysTick::on_interrupt();
//! }
//! ```
//!
//! The count is the clock behind every bounded wait in this crate, through
//! the [`Monotonic`] implementation or [`stdglue::now`](crate::stdglue::now).

use core::cell::Cell;

use cortex_m::peripheral::syst::SystClkSource;
use cortex_m::peripheral::SYST;
use critical_section::Mutex;

#[cfg(feature = "log")]
use log::debug;

use crate::rcc::CoreClocks;
use crate::time::{Hertz, Instant, Monotonic};

/// The SysTick Reload Value register supports values between 1 and 0x00FFFFFF.
const MAX_RVR: u32 = 0x00FF_FFFF;

static TIMELINE: Mutex<Cell<Timeline>> = Mutex::new(Cell::new(Timeline::new()));

fn reload_value(hclk: u32, tick_hz: u32) -> u32 {
    assert!(tick_hz > 0, "SysTick rate must be non-zero");
    let rvr = (hclk / tick_hz).saturating_sub(1);
    assert!(
        (1..=MAX_RVR).contains(&rvr),
        "SysTick reload {} out of range for {} Hz from HCLK {} Hz",
        rvr,
        tick_hz,
        hclk
    );
    rvr
}

fn ticks_to_millis(ticks: u64, tick_hz: u32) -> u64 {
    if tick_hz == 0 {
        return 0;
    }
    ticks * 1000 / tick_hz as u64
}

/// Milliseconds folded in from earlier runs plus the ticks of the current
/// one. `tick_hz` is zero while no timer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timeline {
    base_ms: u64,
    ticks: u64,
    tick_hz: u32,
}

impl Timeline {
    const fn new() -> Self {
        Self {
            base_ms: 0,
            ticks: 0,
            tick_hz: 0,
        }
    }

    fn now(&self) -> Instant {
        Instant::from_ticks(
            self.base_ms + ticks_to_millis(self.ticks, self.tick_hz),
        )
    }

    fn tick(self) -> Self {
        Self {
            ticks: self.ticks + 1,
            ..self
        }
    }

    /// Continue the timeline at a new rate, zero to stop it
    fn restart(self, tick_hz: u32) -> Self {
        Self {
            base_ms: self.now().ticks(),
            ticks: 0,
            tick_hz,
        }
    }
}

fn update(f: impl FnOnce(Timeline) -> Timeline) {
    critical_section::with(|cs| {
        let timeline = TIMELINE.borrow(cs);
        timeline.set(f(timeline.get()));
    });
}

fn timeline() -> Timeline {
    critical_section::with(|cs| TIMELINE.borrow(cs).get())
}

/// Returns `true` while a [`SysTick`] drives the timeline
pub(crate) fn is_running() -> bool {
    timeline().tick_hz != 0
}

/// Time on the SysTick timeline. It stands still while no [`SysTick`]
/// runs, and never goes back.
pub(crate) fn now() -> Instant {
    timeline().now()
}

/// System timer (SysTick) as a monotonic clock
pub struct SysTick {
    syst: SYST,
}

impl SysTick {
    /// Start the system timer from HCLK at `tick_hz` and enable its
    /// exception
    ///
    /// # Panics
    ///
    /// Panics if `hclk / tick_hz - 1` does not fit the 24-bit reload
    /// register
    pub fn new(mut syst: SYST, clocks: &CoreClocks, tick_hz: Hertz) -> Self {
        let rvr = reload_value(clocks.hclk().raw(), tick_hz.raw());

        #[cfg(feature = "log")]
        debug!("SysTick at {} Hz, reload {}", tick_hz.raw(), rvr);

        update(|timeline| timeline.restart(tick_hz.raw()));

        syst.set_clock_source(SystClkSource::Core);
        syst.set_reload(rvr);
        syst.clear_current();
        syst.enable_counter();
        syst.enable_interrupt();

        SysTick { syst }
    }

    /// Count one tick. Call from the `SysTick` exception handler.
    pub fn on_interrupt() {
        update(Timeline::tick);
    }

    /// Ticks counted since this timer started
    pub fn ticks(&self) -> u64 {
        timeline().ticks
    }

    /// Stop the timer and release SYST. The timeline keeps the time reached
    /// so far and resumes from it when a timer is started again.
    pub fn free(mut self) -> SYST {
        self.syst.disable_interrupt();
        self.syst.disable_counter();
        update(|timeline| timeline.restart(0));
        self.syst
    }
}

impl Monotonic for SysTick {
    fn now(&self) -> Instant {
        now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_is_hclk_over_rate_minus_one() {
        assert_eq!(reload_value(16_000_000, 1_000), 15_999);
        assert_eq!(reload_value(56_000_000, 1_000), 55_999);
        assert_eq!(reload_value(16_000_000, 1), 15_999_999);
        assert_eq!(reload_value(4_000_000, 2_000_000), 1);
    }

    #[test]
    #[should_panic]
    fn reload_beyond_24_bits_panics() {
        reload_value(56_000_000, 1);
    }

    #[test]
    #[should_panic]
    fn reload_of_zero_panics() {
        reload_value(16_000_000, 16_000_000);
    }

    #[test]
    fn ticks_scale_to_milliseconds() {
        assert_eq!(ticks_to_millis(250, 1_000), 250);
        assert_eq!(ticks_to_millis(250, 100), 2_500);
        assert_eq!(ticks_to_millis(250, 10_000), 25);
        assert_eq!(ticks_to_millis(250, 0), 0);
    }

    fn run(timeline: Timeline, ticks: u64) -> Timeline {
        (0..ticks).fold(timeline, |timeline, _| timeline.tick())
    }

    #[test]
    fn timeline_survives_stop_and_restart_at_new_rate() {
        let timeline = run(Timeline::new().restart(1_000), 5_000);
        let before = timeline.now();
        assert_eq!(before.ticks(), 5_000);

        // Stopped: time stands still, ticks counted meanwhile are dropped
        let stopped = run(timeline.restart(0), 7);
        assert_eq!(stopped.now(), before);

        // Restarted ten times faster: resumes where it stopped
        let restarted = stopped.restart(10_000);
        assert_eq!(restarted.now(), before);
        assert_eq!(run(restarted, 9).now(), before);
        assert_eq!(run(restarted, 10).now().ticks(), 5_001);
        assert_eq!(run(restarted, 25_000).now().ticks(), 7_500);
    }

    #[test]
    fn timeline_never_decreases_across_restarts() {
        let mut timeline = Timeline::new();
        let mut last = timeline.now();
        for (tick_hz, ticks) in [(1_000, 3), (0, 5), (100, 7), (3, 2), (10_000, 11)] {
            timeline = run(timeline.restart(tick_hz), ticks);
            assert!(timeline.now() >= last);
            last = timeline.now();
        }
        // 3 + 70 + 666 + 1 ms
        assert_eq!(last.ticks(), 740);
    }

    #[test]
    fn interrupts_advance_the_count() {
        let before = timeline().ticks;
        for _ in 0..3 {
            SysTick::on_interrupt();
        }
        assert_eq!(timeline().ticks - before, 3);
    }
}
