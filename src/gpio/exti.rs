use tock_registers::interfaces::{Readable, Writeable};

use super::{marker, Edge, Pin, PinExt};
use crate::stm32::EXTI;

/// External Interrupt Pin
///
/// EXTI lines 0 to 15 are shared between ports: line `N` follows pin `N` of
/// whichever port was last selected with
/// [`make_interrupt_source`](ExtiPin::make_interrupt_source).
pub trait ExtiPin {
    /// Route this pin to its EXTI line
    fn make_interrupt_source(&mut self, exti: &mut EXTI);
    /// Generate interrupt on rising edge, falling edge or both
    fn trigger_on_edge(&mut self, exti: &mut EXTI, level: Edge);
    /// Enable wakeup events from this pin
    fn enable_event(&mut self, exti: &mut EXTI);
    /// Disable wakeup events from this pin
    fn disable_event(&mut self, exti: &mut EXTI);
    /// Enable external interrupts from this pin
    fn enable_interrupt(&mut self, exti: &mut EXTI);
    /// Disable external interrupts from this pin
    fn disable_interrupt(&mut self, exti: &mut EXTI);
    /// Clear the interrupt pending bit for this pin
    fn clear_interrupt_pending_bit(&mut self, edge: Edge);
    /// Reads the interrupt pending bit for this pin
    fn check_interrupt(&self, edge: Edge) -> bool;
}

impl<const P: char, const N: u8, M> ExtiPin for Pin<P, N, M>
where
    M: marker::Interruptable,
{
    #[inline(always)]
    fn make_interrupt_source(&mut self, exti: &mut EXTI) {
        let port = self.port_id() as u32;
        let offset = 8 * (N % 4);
        let exticr = &exti.exticr[(N / 4) as usize];
        exticr.set((exticr.get() & !(0xff << offset)) | (port << offset));
    }

    #[inline(always)]
    fn trigger_on_edge(&mut self, exti: &mut EXTI, edge: Edge) {
        let (rising, falling) = match edge {
            Edge::Rising => (true, false),
            Edge::Falling => (false, true),
            Edge::RisingFalling => (true, true),
        };
        set_line(&exti.rtsr1, N, rising);
        set_line(&exti.ftsr1, N, falling);
    }

    #[inline(always)]
    fn enable_event(&mut self, exti: &mut EXTI) {
        set_line(&exti.emr1, N, true);
    }

    #[inline(always)]
    fn disable_event(&mut self, exti: &mut EXTI) {
        set_line(&exti.emr1, N, false);
    }

    #[inline(always)]
    fn enable_interrupt(&mut self, exti: &mut EXTI) {
        set_line(&exti.imr1, N, true);
    }

    #[inline(always)]
    fn disable_interrupt(&mut self, exti: &mut EXTI) {
        set_line(&exti.imr1, N, false);
    }

    #[inline(always)]
    fn clear_interrupt_pending_bit(&mut self, edge: Edge) {
        // unsafe: the pending registers are write-1-to-clear, no other line
        // is affected
        let exti = unsafe { EXTI::steal() };
        let mask = 1 << N;
        match edge {
            Edge::Rising => exti.rpr1.set(mask),
            Edge::Falling => exti.fpr1.set(mask),
            Edge::RisingFalling => {
                exti.rpr1.set(mask);
                exti.fpr1.set(mask);
            }
        }
    }

    #[inline(always)]
    fn check_interrupt(&self, edge: Edge) -> bool {
        // unsafe: atomic read with no side effects
        let exti = unsafe { EXTI::steal() };
        let bits = match edge {
            Edge::Rising => exti.rpr1.get(),
            Edge::Falling => exti.fpr1.get(),
            Edge::RisingFalling => exti.rpr1.get() | exti.fpr1.get(),
        };
        bits & (1 << N) != 0
    }
}

#[inline(always)]
fn set_line<R>(reg: &R, line: u8, on: bool)
where
    R: Readable<T = u32> + Writeable<T = u32>,
{
    let bits = reg.get();
    if on {
        reg.set(bits | (1 << line));
    } else {
        reg.set(bits & !(1 << line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::GpioExt;
    use crate::rcc::RccExt;
    use crate::stm32::{sim, GPIOB, RCC};

    const RTSR1: usize = 0x00;
    const FTSR1: usize = 0x04;
    const RPR1: usize = 0x0C;
    const EXTICR2: usize = 0x64;
    const IMR1: usize = 0x80;

    #[test]
    fn pin_selects_its_port_on_its_line() {
        let rec = unsafe { RCC::steal().constrain().steal_peripheral_rec() };
        let gpiob = unsafe { GPIOB::steal() }.split(rec.GPIOB);
        let mut exti = unsafe { EXTI::steal() };
        sim::poke(EXTI::ADDRESS, EXTICR2, 0x0505_0505);

        let mut pb5 = gpiob.pb5.into_pull_down_input();
        pb5.make_interrupt_source(&mut exti);
        assert_eq!(sim::peek(EXTI::ADDRESS, EXTICR2), 0x0505_0105);

        pb5.trigger_on_edge(&mut exti, Edge::Falling);
        assert_eq!(sim::peek(EXTI::ADDRESS, RTSR1), 0);
        assert_eq!(sim::peek(EXTI::ADDRESS, FTSR1), 1 << 5);
        pb5.trigger_on_edge(&mut exti, Edge::RisingFalling);
        assert_eq!(sim::peek(EXTI::ADDRESS, RTSR1), 1 << 5);

        pb5.enable_interrupt(&mut exti);
        assert_eq!(sim::peek(EXTI::ADDRESS, IMR1), 1 << 5);
        pb5.disable_interrupt(&mut exti);
        assert_eq!(sim::peek(EXTI::ADDRESS, IMR1), 0);
    }

    #[test]
    fn pending_bits_are_per_edge() {
        let rec = unsafe { RCC::steal().constrain().steal_peripheral_rec() };
        let gpiob = unsafe { GPIOB::steal() }.split(rec.GPIOB);
        let mut pb2 = gpiob.pb2.into_floating_input();

        sim::poke(EXTI::ADDRESS, RPR1, 1 << 2);
        assert!(pb2.check_interrupt(Edge::Rising));
        assert!(!pb2.check_interrupt(Edge::Falling));
        assert!(pb2.check_interrupt(Edge::RisingFalling));

        // Write-1-to-clear lands in the register as the line mask
        sim::poke(EXTI::ADDRESS, RPR1, 0);
        pb2.clear_interrupt_pending_bit(Edge::Rising);
        assert_eq!(sim::peek(EXTI::ADDRESS, RPR1), 1 << 2);
    }
}
