//! Glue between the application and the crate's runtime services
//!
//! * [`now`] reads the global SysTick timeline, and [`Uptime`] wraps it as a
//!   [`Monotonic`] clock for the bounded waits in this crate while a timer
//!   runs.
//! * [`set_output`] registers where panic and assertion reports go, usually
//!   a serial port, and [`report_panic`] writes to it:
//!
//! ```no_run
//! let serial = dp.USART2.serial((tx, rx), 115_200.bps(), ccdr.peripheral.USART2, &ccdr.clocks)?;
//! static SERIAL: StaticCell<Serial<USART2>> = StaticCell::new();
//! stdglue::set_output(SERIAL.init(serial));
//!
//! #[panic_handler]
//! fn panic(info: &PanicInfo) -> ! {
//!     stdglue::report_panic(info);
//!     loop {}
//! }
//! ```

use core::cell::RefCell;
use core::fmt;
use core::panic::PanicInfo;

use critical_section::Mutex;

use crate::time::{Instant, Monotonic};

type Output = &'static mut (dyn fmt::Write + Send);

static OUTPUT: Mutex<RefCell<Option<Output>>> = Mutex::new(RefCell::new(None));

/// Milliseconds since the SysTick timebase was started
pub fn now() -> Instant {
    crate::systick::now()
}

/// The global SysTick timeline as a [`Monotonic`] clock
///
/// Only available while a [`SysTick`](crate::systick::SysTick) runs, since a
/// bounded wait on a stopped timeline would never expire.
#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    _running: (),
}

impl Uptime {
    /// The running timeline, or `None` if no timer is started
    pub fn new() -> Option<Self> {
        crate::systick::is_running().then_some(Uptime { _running: () })
    }
}

impl Monotonic for Uptime {
    /// # Panics
    ///
    /// Panics if the timer was stopped after this clock was taken.
    fn now(&self) -> Instant {
        assert!(
            crate::systick::is_running(),
            "SysTick timebase stopped under a running wait"
        );
        now()
    }
}

/// Register the sink for panic and assertion reports, returning the previous
/// one
pub fn set_output(output: Output) -> Option<Output> {
    critical_section::with(|cs| OUTPUT.borrow_ref_mut(cs).replace(output))
}

/// Unregister the report sink
pub fn take_output() -> Option<Output> {
    critical_section::with(|cs| OUTPUT.borrow_ref_mut(cs).take())
}

/// Write a line to the report sink, if there is one
///
/// Write errors are dropped: there is nowhere left to report them.
pub fn report(args: fmt::Arguments<'_>) {
    critical_section::with(|cs| {
        if let Some(output) = OUTPUT.borrow_ref_mut(cs).as_mut() {
            let _ = output.write_fmt(args);
            let _ = output.write_str("\r\n");
        }
    });
}

/// Write the location and message of a panic to the report sink
pub fn report_panic(info: &PanicInfo<'_>) {
    report(format_args!("{}", info));
}
