use tock_registers::interfaces::ReadWriteable;

use super::*;
use crate::stm32::gpio::{AFR, MODER, OTYPER};

impl<const P: char, const N: u8, const A: u8> Pin<P, N, Alternate<A, PushPull>> {
    /// Turns pin alternate configuration pin into open drain
    pub fn set_open_drain(self) -> Pin<P, N, Alternate<A, OpenDrain>> {
        self.into_mode()
    }
}

impl<const P: char, const N: u8, MODE: PinMode> Pin<P, N, MODE> {
    /// Configures the pin to operate alternate mode
    pub fn into_alternate<const A: u8>(self) -> Pin<P, N, Alternate<A, PushPull>>
    where
        Self: marker::IntoAf<A>,
    {
        self.into_mode()
    }

    /// Configures the pin to operate in alternate open drain mode
    pub fn into_alternate_open_drain<const A: u8>(
        self,
    ) -> Pin<P, N, Alternate<A, OpenDrain>>
    where
        Self: marker::IntoAf<A>,
    {
        self.into_mode()
    }

    /// Configures the pin to operate as a input pin
    pub fn into_input(self) -> Pin<P, N, Input> {
        self.into_mode()
    }

    /// Configures the pin to operate as a floating input pin
    pub fn into_floating_input(self) -> Pin<P, N, Input> {
        self.into_input().internal_resistor(Pull::None)
    }

    /// Configures the pin to operate as a pulled down input pin
    pub fn into_pull_down_input(self) -> Pin<P, N, Input> {
        self.into_input().internal_resistor(Pull::Down)
    }

    /// Configures the pin to operate as a pulled up input pin
    pub fn into_pull_up_input(self) -> Pin<P, N, Input> {
        self.into_input().internal_resistor(Pull::Up)
    }

    /// Configures the pin to operate as an open drain output pin
    /// Initial state will be low.
    pub fn into_open_drain_output(self) -> Pin<P, N, Output<OpenDrain>> {
        self.into_open_drain_output_in_state(PinState::Low)
    }

    /// Configures the pin to operate as an open-drain output pin.
    /// `initial_state` specifies whether the pin should be initially high or low.
    pub fn into_open_drain_output_in_state(
        mut self,
        initial_state: PinState,
    ) -> Pin<P, N, Output<OpenDrain>> {
        self._set_state(initial_state);
        self.into_mode()
    }

    /// Configures the pin to operate as an push pull output pin
    /// Initial state will be low.
    pub fn into_push_pull_output(self) -> Pin<P, N, Output<PushPull>> {
        self.into_push_pull_output_in_state(PinState::Low)
    }

    /// Configures the pin to operate as an push pull output pin
    /// `initial_state` specifies whether the pin should be initially high or low.
    pub fn into_push_pull_output_in_state(
        mut self,
        initial_state: PinState,
    ) -> Pin<P, N, Output<PushPull>> {
        self._set_state(initial_state);
        self.into_mode()
    }

    /// Configures the pin to operate as an analog input pin
    pub fn into_analog(self) -> Pin<P, N, Analog> {
        self.into_mode()
    }

    /// Writes the OTYPER, AFR and MODER fields of mode `M`, in that order
    #[inline(always)]
    pub(super) fn mode<M: PinMode>(&mut self) {
        let gpio = Gpio::<P>::rb();

        if let Some(otype) = M::OTYPER {
            gpio.otyper
                .modify(pin_field::<OTYPER::Register>(N, 1, otype));
        }

        if let Some(af) = M::AFR {
            if N < 8 {
                gpio.afrl.modify(pin_field::<AFR::Register>(N, 4, af));
            } else {
                gpio.afrh.modify(pin_field::<AFR::Register>(N - 8, 4, af));
            }
        }

        gpio.moder
            .modify(pin_field::<MODER::Register>(N, 2, M::MODER));
    }

    #[inline(always)]
    /// Converts pin into specified mode
    pub fn into_mode<M: PinMode>(mut self) -> Pin<P, N, M> {
        self.mode::<M>();
        Pin::new()
    }
}

impl<const P: char, const N: u8, MODE> Pin<P, N, MODE>
where
    MODE: PinMode,
{
    fn with_mode<M, F, R>(&mut self, f: F) -> R
    where
        M: PinMode,
        F: FnOnce(&mut Pin<P, N, M>) -> R,
    {
        self.mode::<M>();

        // This will reset the pin back to the original mode when dropped.
        // (so either when `with_mode` returns or when `f` unwinds)
        let _resetti = ResetMode { pin: self };

        let mut witness = Pin::new();

        f(&mut witness)
    }

    /// Temporarily configures this pin as a input.
    ///
    /// The closure `f` is called with the reconfigured pin. After it returns,
    /// the pin will be configured back.
    pub fn with_input<R>(&mut self, f: impl FnOnce(&mut Pin<P, N, Input>) -> R) -> R {
        self.with_mode(f)
    }

    /// Temporarily configures this pin as an analog pin.
    ///
    /// The closure `f` is called with the reconfigured pin. After it returns,
    /// the pin will be configured back.
    pub fn with_analog<R>(&mut self, f: impl FnOnce(&mut Pin<P, N, Analog>) -> R) -> R {
        self.with_mode(f)
    }

    /// Temporarily configures this pin as an open drain output.
    ///
    /// The closure `f` is called with the reconfigured pin. After it returns,
    /// the pin will be configured back.
    /// The value of the pin after conversion is undefined. If you
    /// want to control it, use `with_open_drain_output_in_state`
    pub fn with_open_drain_output<R>(
        &mut self,
        f: impl FnOnce(&mut Pin<P, N, Output<OpenDrain>>) -> R,
    ) -> R {
        self.with_mode(f)
    }

    /// Temporarily configures this pin as an open drain output .
    ///
    /// The closure `f` is called with the reconfigured pin. After it returns,
    /// the pin will be configured back.
    /// Note that the new state is set slightly before conversion
    /// happens. This can cause a short output glitch if switching
    /// between output modes
    pub fn with_open_drain_output_in_state<R>(
        &mut self,
        state: PinState,
        f: impl FnOnce(&mut Pin<P, N, Output<OpenDrain>>) -> R,
    ) -> R {
        self._set_state(state);
        self.with_mode(f)
    }

    /// Temporarily configures this pin as a push-pull output.
    ///
    /// The closure `f` is called with the reconfigured pin. After it returns,
    /// the pin will be configured back.
    /// The value of the pin after conversion is undefined. If you
    /// want to control it, use `with_push_pull_output_in_state`
    pub fn with_push_pull_output<R>(
        &mut self,
        f: impl FnOnce(&mut Pin<P, N, Output<PushPull>>) -> R,
    ) -> R {
        self.with_mode(f)
    }

    /// Temporarily configures this pin as a push-pull output.
    ///
    /// The closure `f` is called with the reconfigured pin. After it returns,
    /// the pin will be configured back.
    /// Note that the new state is set slightly before conversion
    /// happens. This can cause a short output glitch if switching
    /// between output modes
    pub fn with_push_pull_output_in_state<R>(
        &mut self,
        state: PinState,
        f: impl FnOnce(&mut Pin<P, N, Output<PushPull>>) -> R,
    ) -> R {
        self._set_state(state);
        self.with_mode(f)
    }
}

/// Wrapper around a pin that transitions the pin to mode ORIG when dropped
struct ResetMode<'a, const P: char, const N: u8, ORIG: PinMode> {
    pin: &'a mut Pin<P, N, ORIG>,
}
impl<const P: char, const N: u8, ORIG: PinMode> Drop
    for ResetMode<'_, P, N, ORIG>
{
    fn drop(&mut self) {
        self.pin.mode::<ORIG>();
    }
}

/// Marker trait for valid pin modes (type state).
///
/// It can not be implemented by outside types.
pub trait PinMode: crate::Sealed {
    // These constants are used to implement the pin configuration code.
    // They are not part of public API.

    #[doc(hidden)]
    const MODER: u32 = u32::MAX;
    #[doc(hidden)]
    const OTYPER: Option<u32> = None;
    #[doc(hidden)]
    const AFR: Option<u32> = None;
}

impl crate::Sealed for Input {}
impl PinMode for Input {
    const MODER: u32 = 0b00;
}

impl crate::Sealed for Analog {}
impl PinMode for Analog {
    const MODER: u32 = 0b11;
}

impl<Otype> crate::Sealed for Output<Otype> {}
impl PinMode for Output<OpenDrain> {
    const MODER: u32 = 0b01;
    const OTYPER: Option<u32> = Some(0b1);
}

impl PinMode for Output<PushPull> {
    const MODER: u32 = 0b01;
    const OTYPER: Option<u32> = Some(0b0);
}

impl<const A: u8, Otype> crate::Sealed for Alternate<A, Otype> {}
impl<const A: u8> PinMode for Alternate<A, OpenDrain> {
    const MODER: u32 = 0b10;
    const OTYPER: Option<u32> = Some(0b1);
    const AFR: Option<u32> = Some(A as u32);
}

impl<const A: u8> PinMode for Alternate<A, PushPull> {
    const MODER: u32 = 0b10;
    const OTYPER: Option<u32> = Some(0b0);
    const AFR: Option<u32> = Some(A as u32);
}

#[cfg(test)]
mod tests {
    use crate::gpio::{GpioExt, PinState};
    use crate::rcc::RccExt;
    use crate::stm32::{sim, GPIOB, RCC};

    const MODER: usize = 0x00;
    const OTYPER: usize = 0x04;
    const AFRL: usize = 0x20;
    const AFRH: usize = 0x24;
    const BSRR: usize = 0x18;

    fn gpiob() -> crate::gpio::gpiob::Parts {
        let rec = unsafe { RCC::steal().constrain().steal_peripheral_rec() };
        unsafe { GPIOB::steal() }.split(rec.GPIOB)
    }

    #[test]
    fn alternate_function_lands_in_its_afr_half() {
        let gpiob = gpiob();
        let _scl = gpiob.pb8.into_alternate_open_drain::<4>();
        let _tx = gpiob.pb6.into_alternate::<7>();

        assert_eq!(sim::peek(GPIOB::ADDRESS, AFRH), 4);
        assert_eq!(sim::peek(GPIOB::ADDRESS, AFRL), 7 << 24);
        assert_eq!(sim::peek(GPIOB::ADDRESS, OTYPER), 1 << 8);
        assert_eq!(
            sim::peek(GPIOB::ADDRESS, MODER),
            (0b10 << 16) | (0b10 << 12)
        );
    }

    #[test]
    fn open_drain_keeps_alternate_function() {
        let gpiob = gpiob();
        let _sda = gpiob.pb9.into_alternate::<4>().set_open_drain();
        assert_eq!(sim::peek(GPIOB::ADDRESS, AFRH), 4 << 4);
        assert_eq!(sim::peek(GPIOB::ADDRESS, OTYPER), 1 << 9);
    }

    #[test]
    fn output_state_is_set_before_mode() {
        let gpiob = gpiob();
        let _led = gpiob.pb3.into_push_pull_output_in_state(PinState::High);
        assert_eq!(sim::peek(GPIOB::ADDRESS, BSRR), 1 << 3);
        assert_eq!(sim::peek(GPIOB::ADDRESS, MODER), 0b01 << 6);
    }

    #[test]
    fn with_mode_restores_original_mode() {
        let mut pb0 = gpiob().pb0.into_analog();
        assert_eq!(sim::peek(GPIOB::ADDRESS, MODER), 0b11);
        pb0.with_push_pull_output(|out| {
            out.set_high();
            assert_eq!(sim::peek(GPIOB::ADDRESS, MODER), 0b01);
        });
        assert_eq!(sim::peek(GPIOB::ADDRESS, MODER), 0b11);
    }
}
