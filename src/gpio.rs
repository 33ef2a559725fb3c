//! General Purpose Input / Output
//!
//! The GPIO pins are organised into groups of 16 pins which can be accessed through the
//! `gpioa`, `gpiob`... modules. To get access to the pins, you first need to convert them into a
//! HAL designed struct from the `stm32` struct using the [split](trait.GpioExt.html#tymethod.split) function.
//! ```rust
//! // Acquire the GPIOA peripheral
//! // NOTE: `dp` is the device peripherals from `stm32::Peripherals::take()`
//! let gpioa = dp.GPIOA.split(ccdr.peripheral.GPIOA);
//! ```
//!
//! This gives you a struct containing all the pins `px0..px15`.
//! Out of reset pins are in analog mode, except for the SWD pins. You can
//! change their modes. For example, to set `pa5` high, you would call
//!
//! ```rust
//! let mut output = gpioa.pa5.into_push_pull_output();
//! output.set_high();
//! ```
//!
//! ## Modes
//!
//! Each GPIO pin can be set to various modes:
//!
//! - **Alternate**: Pin mode required when the pin is driven by other peripherals
//! - **Analog**: Analog input, the lowest power state of a pin
//! - Input
//!     - **PullUp**: Input connected to high with a weak pull up resistor. Will be high when nothing
//!       is connected
//!     - **PullDown**: Input connected to low with a weak pull down resistor. Will be low when nothing
//!       is connected
//!     - **Floating**: Input not pulled to high or low. Will be undefined when nothing is connected
//! - Output
//!     - **PushPull**: Output which either drives the pin high or low
//!     - **OpenDrain**: Output which leaves the gate floating, or pulls it do ground in drain
//!       mode. Can be used as an input in the `open` configuration
//!
//! ## Changing modes
//! The simplest way to change the pin mode is to use the `into_<mode>` functions. These return a
//! new struct with the correct mode that you can use the input or output functions on.
//!
//! If you need a more temporary mode change, and can not use the `into_<mode>` functions for
//! ownership reasons, you can use the closure based `with_<mode>` functions to temporarily change the pin type, do
//! some output or input, and then have it change back once done.
//!
//! ## External interrupts
//!
//! Any input or output pin can be routed to the EXTI line of the same
//! number, see [`ExtiPin`].

mod convert;
mod exti;
mod gpio_def;
mod hal;

use core::{fmt, marker::PhantomData};

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::rcc::ResetEnable;
use crate::stm32::gpio::{pin_field, OSPEEDR, PUPDR};

pub use convert::PinMode;
pub use embedded_hal::digital::PinState;

pub use exti::ExtiPin;
pub use gpio_def::*;

/// A filler pin type
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoPin;

/// Extension trait to split a GPIO peripheral into independent pins and
/// registers
pub trait GpioExt {
    /// The parts to split the GPIO into
    type Parts;

    /// The Reset and Enable control block for this GPIO block
    type Rec: ResetEnable;

    /// Takes the GPIO peripheral and splits it into Zero-Sized Types
    /// (ZSTs) representing individual pins. These are public
    /// members of the return type.
    ///
    /// ```
    /// let device_peripherals = stm32::Peripherals.take().unwrap();
    /// let ccdr = ...; // From RCC
    ///
    /// let gpioa = device_peripherals.GPIOA.split(ccdr.peripheral.GPIOA);
    ///
    /// let pa0 = gpioa.pa0; // Pin 0
    /// ```
    fn split(self, prec: Self::Rec) -> Self::Parts;

    /// As [split](GpioExt#tymethod.split), but does not reset the GPIO
    /// peripheral in the RCC_IOPRSTR register. However it still enables the
    /// peripheral in RCC_IOPENR, so our accesses to the peripheral memory will
    /// always be valid.
    ///
    /// This is useful for situations where some GPIO functionality
    /// was already activated outside the HAL in early startup code
    /// or a bootloader. In this case, `split_without_reset` allows
    /// this GPIO HAL to be used without generating unwanted edges on
    /// already initialised pins.
    fn split_without_reset(self, prec: Self::Rec) -> Self::Parts;
}

/// GPIO peripheral corresponding to GPIOA, GPIOB, etc
pub(crate) struct Gpio<const P: char>;

impl<const P: char> Gpio<P> {
    #[inline(always)]
    fn rb() -> &'static crate::stm32::gpio::RegisterBlock {
        // unsafe: the port is memory mapped for the lifetime of the program
        unsafe { &*Self::ptr() }
    }
}

/// Id, port and mode for any pin
pub trait PinExt {
    /// Current pin mode
    type Mode;
    /// Pin number
    fn pin_id(&self) -> u8;
    /// Port number starting from 0
    fn port_id(&self) -> u8;
}

/// Some alternate mode (type state)
pub struct Alternate<const A: u8, Otype = PushPull>(PhantomData<Otype>);

/// Input mode (type state)
pub struct Input;

/// Pull setting for an input.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// Floating
    None = 0,
    /// Pulled up
    Up = 1,
    /// Pulled down
    Down = 2,
}

/// Open drain input or output (type state)
pub struct OpenDrain;

/// Output mode (type state)
pub struct Output<MODE = PushPull> {
    _mode: PhantomData<MODE>,
}

/// Push pull output (type state)
pub struct PushPull;

/// Analog mode (type state)
pub struct Analog;

/// SWD mode (type state)
pub type Debugger = Alternate<0, PushPull>;

mod marker {
    /// Marker trait that show if `ExtiPin` can be implemented
    pub trait Interruptable {}
    /// Marker trait for readable pin modes
    pub trait Readable {}
    /// Marker trait for slew rate configurable pin modes
    pub trait OutputSpeed {}
    /// Marker trait for active pin modes
    pub trait Active {}
    /// Marker trait for all pin modes except alternate
    pub trait NotAlt {}
    /// Marker trait for pins with alternate function `A` mapping
    pub trait IntoAf<const A: u8> {}
}

impl<MODE> marker::Interruptable for Output<MODE> {}
impl marker::Interruptable for Input {}
impl marker::Readable for Input {}
impl<const A: u8, MODE> marker::Readable for Alternate<A, MODE> {}
impl marker::Readable for Output<OpenDrain> {}
impl marker::Active for Input {}
impl<Otype> marker::OutputSpeed for Output<Otype> {}
impl<const A: u8, Otype> marker::OutputSpeed for Alternate<A, Otype> {}
impl<Otype> marker::Active for Output<Otype> {}
impl<const A: u8, Otype> marker::Active for Alternate<A, Otype> {}
impl marker::NotAlt for Input {}
impl<Otype> marker::NotAlt for Output<Otype> {}
impl marker::NotAlt for Analog {}

/// GPIO Pin speed selection
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Speed {
    /// Low speed
    Low = 0,
    /// Medium speed
    Medium = 1,
    /// High speed
    High = 2,
    /// Very high speed
    VeryHigh = 3,
}

/// GPIO interrupt trigger edge selection
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Edge {
    /// Rising edge of voltage
    Rising,
    /// Falling edge of voltage
    Falling,
    /// Rising and falling edge of voltage
    RisingFalling,
}

#[doc = "Alternate function 0 (type state)"]
pub type AF0<Otype = PushPull> = Alternate<0, Otype>;
#[doc = "Alternate function 1 (type state)"]
pub type AF1<Otype = PushPull> = Alternate<1, Otype>;
#[doc = "Alternate function 2 (type state)"]
pub type AF2<Otype = PushPull> = Alternate<2, Otype>;
#[doc = "Alternate function 3 (type state)"]
pub type AF3<Otype = PushPull> = Alternate<3, Otype>;
#[doc = "Alternate function 4 (type state)"]
pub type AF4<Otype = PushPull> = Alternate<4, Otype>;
#[doc = "Alternate function 5 (type state)"]
pub type AF5<Otype = PushPull> = Alternate<5, Otype>;
#[doc = "Alternate function 6 (type state)"]
pub type AF6<Otype = PushPull> = Alternate<6, Otype>;
#[doc = "Alternate function 7 (type state)"]
pub type AF7<Otype = PushPull> = Alternate<7, Otype>;
#[doc = "Alternate function 8 (type state)"]
pub type AF8<Otype = PushPull> = Alternate<8, Otype>;
#[doc = "Alternate function 9 (type state)"]
pub type AF9<Otype = PushPull> = Alternate<9, Otype>;
#[doc = "Alternate function 10 (type state)"]
pub type AF10<Otype = PushPull> = Alternate<10, Otype>;
#[doc = "Alternate function 11 (type state)"]
pub type AF11<Otype = PushPull> = Alternate<11, Otype>;
#[doc = "Alternate function 12 (type state)"]
pub type AF12<Otype = PushPull> = Alternate<12, Otype>;
#[doc = "Alternate function 13 (type state)"]
pub type AF13<Otype = PushPull> = Alternate<13, Otype>;
#[doc = "Alternate function 14 (type state)"]
pub type AF14<Otype = PushPull> = Alternate<14, Otype>;
#[doc = "Alternate function 15 (type state)"]
pub type AF15<Otype = PushPull> = Alternate<15, Otype>;

/// Generic pin type
///
/// - `MODE` is one of the pin modes (see [Modes](crate::gpio#modes) section).
/// - `P` is port name: `A` for GPIOA, `B` for GPIOB, etc.
/// - `N` is pin number: from `0` to `15`.
pub struct Pin<const P: char, const N: u8, MODE = Analog> {
    _mode: PhantomData<MODE>,
}
impl<const P: char, const N: u8, MODE> Pin<P, N, MODE> {
    const fn new() -> Self {
        Self { _mode: PhantomData }
    }
}

impl<const P: char, const N: u8, MODE> fmt::Debug for Pin<P, N, MODE> {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_fmt(format_args!(
            "P{}{}<{}>",
            P,
            N,
            crate::stripped_type_name::<MODE>()
        ))
    }
}

#[cfg(feature = "defmt")]
impl<const P: char, const N: u8, MODE> defmt::Format for Pin<P, N, MODE> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "P{}{}<{}>",
            P,
            N,
            crate::stripped_type_name::<MODE>()
        );
    }
}

impl<const P: char, const N: u8, MODE> PinExt for Pin<P, N, MODE> {
    type Mode = MODE;

    #[inline(always)]
    fn pin_id(&self) -> u8 {
        N
    }
    #[inline(always)]
    fn port_id(&self) -> u8 {
        P as u8 - b'A'
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, MODE>
where
    MODE: marker::OutputSpeed,
{
    /// Set pin speed
    pub fn set_speed(&mut self, speed: Speed) {
        Gpio::<P>::rb()
            .ospeedr
            .modify(pin_field::<OSPEEDR::Register>(N, 2, speed as u32));
    }

    /// Set pin speed
    pub fn speed(mut self, speed: Speed) -> Self {
        self.set_speed(speed);
        self
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, MODE>
where
    MODE: marker::Active,
{
    /// Set the internal pull-up and pull-down resistor
    pub fn set_internal_resistor(&mut self, resistor: Pull) {
        Gpio::<P>::rb()
            .pupdr
            .modify(pin_field::<PUPDR::Register>(N, 2, resistor as u32));
    }

    /// Set the internal pull-up and pull-down resistor
    pub fn internal_resistor(mut self, resistor: Pull) -> Self {
        self.set_internal_resistor(resistor);
        self
    }

    /// Enables / disables the internal pull up
    pub fn internal_pull_up(self, on: bool) -> Self {
        if on {
            self.internal_resistor(Pull::Up)
        } else {
            self.internal_resistor(Pull::None)
        }
    }

    /// Enables / disables the internal pull down
    pub fn internal_pull_down(self, on: bool) -> Self {
        if on {
            self.internal_resistor(Pull::Down)
        } else {
            self.internal_resistor(Pull::None)
        }
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, MODE> {
    /// Set the output of the pin regardless of its mode.
    /// Primarily used to set the output value of the pin
    /// before changing its mode to an output to avoid
    /// a short spike of an incorrect value
    #[inline(always)]
    fn _set_state(&mut self, state: PinState) {
        match state {
            PinState::High => self._set_high(),
            PinState::Low => self._set_low(),
        }
    }
    #[inline(always)]
    fn _set_high(&mut self) {
        // atomic write to a stateless register
        Gpio::<P>::rb().bsrr.set(1 << N);
    }
    #[inline(always)]
    fn _set_low(&mut self) {
        // atomic write to a stateless register
        Gpio::<P>::rb().bsrr.set(1 << (N + 16));
    }
    #[inline(always)]
    fn _is_set_low(&self) -> bool {
        Gpio::<P>::rb().odr.get() & (1 << N) == 0
    }
    #[inline(always)]
    fn _is_low(&self) -> bool {
        Gpio::<P>::rb().idr.get() & (1 << N) == 0
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, Output<MODE>> {
    /// Drives the pin high
    #[inline(always)]
    pub fn set_high(&mut self) {
        self._set_high()
    }

    /// Drives the pin low
    #[inline(always)]
    pub fn set_low(&mut self) {
        self._set_low()
    }

    /// Is the pin in drive high or low mode?
    #[inline(always)]
    pub fn get_state(&mut self) -> PinState {
        if self.is_set_low() {
            PinState::Low
        } else {
            PinState::High
        }
    }

    /// Drives the pin high or low depending on the provided value
    #[inline(always)]
    pub fn set_state(&mut self, state: PinState) {
        match state {
            PinState::Low => self.set_low(),
            PinState::High => self.set_high(),
        }
    }

    /// Is the pin in drive high mode?
    #[inline(always)]
    pub fn is_set_high(&mut self) -> bool {
        !self.is_set_low()
    }

    /// Is the pin in drive low mode?
    #[inline(always)]
    pub fn is_set_low(&mut self) -> bool {
        self._is_set_low()
    }

    /// Toggle pin output
    #[inline(always)]
    pub fn toggle(&mut self) {
        if self.is_set_low() {
            self.set_high()
        } else {
            self.set_low()
        }
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, MODE>
where
    MODE: marker::Readable,
{
    /// Is the input pin high?
    #[inline(always)]
    pub fn is_high(&mut self) -> bool {
        !self.is_low()
    }

    /// Is the input pin low?
    #[inline(always)]
    pub fn is_low(&mut self) -> bool {
        self._is_low()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rcc::PeripheralREC;
    use crate::stm32::{sim, GPIOA, GPIOB, RCC};

    const MODER: usize = 0x00;
    const OSPEEDR: usize = 0x08;
    const PUPDR: usize = 0x0C;
    const IDR: usize = 0x10;
    const ODR: usize = 0x14;
    const BSRR: usize = 0x18;
    const IOPENR: usize = 0x4C;

    fn rec() -> PeripheralREC {
        let rcc = unsafe { RCC::steal() };
        unsafe { crate::rcc::RccExt::constrain(rcc).steal_peripheral_rec() }
    }

    #[test]
    fn split_enables_port_clock() {
        let rec = rec();
        let _gpiob = unsafe { GPIOB::steal() }.split(rec.GPIOB);
        assert_eq!(sim::peek(RCC::ADDRESS, IOPENR), 1 << 1);
    }

    #[test]
    fn output_drives_through_bsrr() {
        let gpioa = unsafe { GPIOA::steal() }.split(rec().GPIOA);
        sim::poke(GPIOA::ADDRESS, MODER, 0xEBFF_FFFF);

        let mut pa5 = gpioa.pa5.into_push_pull_output();
        assert_eq!(sim::peek(GPIOA::ADDRESS, MODER), 0xEBFF_F7FF);

        pa5.set_high();
        assert_eq!(sim::peek(GPIOA::ADDRESS, BSRR), 1 << 5);
        pa5.set_low();
        assert_eq!(sim::peek(GPIOA::ADDRESS, BSRR), 1 << 21);

        // Toggle reads the output data register
        sim::poke(GPIOA::ADDRESS, ODR, 1 << 5);
        assert!(pa5.is_set_high());
        pa5.toggle();
        assert_eq!(sim::peek(GPIOA::ADDRESS, BSRR), 1 << 21);
    }

    #[test]
    fn input_reads_idr() {
        let gpioa = unsafe { GPIOA::steal() }.split(rec().GPIOA);
        let mut pa3 = gpioa.pa3.into_pull_up_input();
        assert_eq!(sim::peek(GPIOA::ADDRESS, PUPDR), 0b01 << 6);
        assert_eq!(sim::peek(GPIOA::ADDRESS, MODER) & (0b11 << 6), 0);

        assert!(pa3.is_low());
        sim::poke(GPIOA::ADDRESS, IDR, 1 << 3);
        assert!(pa3.is_high());
    }

    #[test]
    fn speed_only_touches_own_field() {
        let gpioa = unsafe { GPIOA::steal() }.split(rec().GPIOA);
        sim::poke(GPIOA::ADDRESS, OSPEEDR, 0b11);
        let _pa1 = gpioa.pa1.into_push_pull_output().speed(Speed::High);
        assert_eq!(sim::peek(GPIOA::ADDRESS, OSPEEDR), 0b11 | (0b10 << 2));
    }

    #[test]
    fn debug_names_port_pin_and_mode() {
        let gpioa = unsafe { GPIOA::steal() }.split(rec().GPIOA);
        let pa7 = gpioa.pa7.into_floating_input();
        assert_eq!(std::format!("{:?}", pa7), "PA7<Input>");
    }
}
