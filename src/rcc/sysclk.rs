//! System clock selection

use tock_registers::interfaces::{ReadWriteable, Readable};

use super::osc::Oscillator;
use super::Rcc;
use crate::stm32::rcc::CFGR;
use crate::time::{wait_until, Hertz, MilliSeconds, Monotonic, Timeout};

/// Clock sources that can drive `sys_ck`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SysClkSource {
    /// MSI
    Msi,
    /// HSI16
    Hsi16,
    /// HSE
    Hse,
    /// PLL R output
    Pll,
    /// LSI
    Lsi,
    /// LSE
    Lse,
}

impl SysClkSource {
    fn switch(self) -> CFGR::SW::Value {
        match self {
            SysClkSource::Msi => CFGR::SW::Value::Msi,
            SysClkSource::Hsi16 => CFGR::SW::Value::Hsi16,
            SysClkSource::Hse => CFGR::SW::Value::Hse,
            SysClkSource::Pll => CFGR::SW::Value::PllR,
            SysClkSource::Lsi => CFGR::SW::Value::Lsi,
            SysClkSource::Lse => CFGR::SW::Value::Lse,
        }
    }
}

/// System clock multiplexer
pub struct SysClk<'a> {
    rcc: &'a Rcc,
}

impl<'a> SysClk<'a> {
    pub(super) fn new(rcc: &'a Rcc) -> Self {
        Self { rcc }
    }

    fn with_oscillator<R>(
        &self,
        source: SysClkSource,
        f: impl FnOnce(&dyn Oscillator) -> R,
    ) -> R {
        let rcc = self.rcc;
        match source {
            SysClkSource::Msi => f(&rcc.msi()),
            SysClkSource::Hsi16 => f(&rcc.hsi16()),
            SysClkSource::Hse => f(&rcc.hse()),
            SysClkSource::Pll => f(&rcc.pll()),
            SysClkSource::Lsi => f(&rcc.lsi()),
            SysClkSource::Lse => f(&rcc.lse()),
        }
    }

    /// Request a switch of `sys_ck` to `source`.
    ///
    /// The switch completes in hardware some cycles later; see
    /// [`is_source`](Self::is_source).
    ///
    /// # Panics
    ///
    /// Panics if `source` is not ready, or if it is HSE and the HSE frequency
    /// was never recorded with [`Hse::set_descriptor`](super::Hse::set_descriptor).
    pub fn set_source(&self, source: SysClkSource) {
        if source == SysClkSource::Hse {
            assert!(
                self.rcc.hse().get_descriptor().is_some(),
                "HSE frequency must be configured before it can drive sys_ck"
            );
        }
        assert!(
            self.with_oscillator(source, |osc| osc.is_ready()),
            "{:?} must be ready before it can drive sys_ck",
            source
        );
        critical_section::with(|_| {
            self.rcc.rb.cfgr.modify(CFGR::SW.val(source.switch() as u32))
        });
    }

    /// Returns `true` if the hardware reports `source` as driving `sys_ck`
    pub fn is_source(&self, source: SysClkSource) -> bool {
        self.rcc.rb.cfgr.read(CFGR::SWS) == source.switch() as u32
    }

    /// Clock source currently driving `sys_ck`
    ///
    /// # Panics
    ///
    /// Panics if the switch status holds a reserved value.
    pub fn source(&self) -> SysClkSource {
        match self.rcc.rb.cfgr.read_as_enum(CFGR::SWS) {
            Some(CFGR::SWS::Value::Msi) => SysClkSource::Msi,
            Some(CFGR::SWS::Value::Hsi16) => SysClkSource::Hsi16,
            Some(CFGR::SWS::Value::Hse) => SysClkSource::Hse,
            Some(CFGR::SWS::Value::PllR) => SysClkSource::Pll,
            Some(CFGR::SWS::Value::Lsi) => SysClkSource::Lsi,
            Some(CFGR::SWS::Value::Lse) => SysClkSource::Lse,
            None => panic!(
                "sys_ck switch status {:#05b} selects no clock",
                self.rcc.rb.cfgr.read(CFGR::SWS)
            ),
        }
    }

    /// `sys_ck` frequency, taken from whichever oscillator drives it
    pub fn frequency(&self) -> Hertz {
        self.with_oscillator(self.source(), |osc| osc.frequency())
    }

    /// Spin until `source` drives `sys_ck`, giving up after `timeout`
    pub fn wait_source<M: Monotonic + ?Sized>(
        &self,
        source: SysClkSource,
        mono: &M,
        timeout: MilliSeconds,
    ) -> Result<(), Timeout> {
        wait_until(mono, timeout, || self.is_source(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rcc::{HseDescriptor, RccExt};
    use crate::stm32::{sim, RCC};
    use crate::time::tests::SteppingClock;

    const CR_OFFSET: usize = 0x00;
    const CFGR_OFFSET: usize = 0x08;

    fn rcc() -> Rcc {
        unsafe { RCC::steal() }.constrain()
    }

    #[test]
    fn set_source_writes_switch_only() {
        let rcc = rcc();
        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0x0000_9000);
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, 1 << 10);

        rcc.sysclk().set_source(SysClkSource::Hsi16);
        assert_eq!(sim::peek(RCC::ADDRESS, CFGR_OFFSET), 0x0000_9001);
        // Not switched until the hardware says so
        assert!(!rcc.sysclk().is_source(SysClkSource::Hsi16));

        sim::set_bits(RCC::ADDRESS, CFGR_OFFSET, 0b001 << 3);
        assert!(rcc.sysclk().is_source(SysClkSource::Hsi16));
        assert_eq!(rcc.sysclk().source(), SysClkSource::Hsi16);
    }

    #[test]
    #[should_panic(expected = "Hse must be ready before it can drive sys_ck")]
    fn set_source_requires_ready_oscillator() {
        let rcc = rcc();
        rcc.hse().set_descriptor(HseDescriptor {
            frequency: Hertz::MHz(8),
            bypass: false,
        });
        rcc.sysclk().set_source(SysClkSource::Hse);
    }

    #[test]
    #[should_panic(expected = "HSE frequency must be configured")]
    fn set_source_requires_known_hse_frequency() {
        let rcc = rcc();
        // HSEON | HSERDY, enabled without a descriptor
        sim::poke(RCC::ADDRESS, CR_OFFSET, (1 << 16) | (1 << 17));
        rcc.sysclk().set_source(SysClkSource::Hse);
    }

    #[test]
    fn set_source_hse_after_descriptor() {
        let rcc = rcc();
        rcc.hse().set_descriptor(HseDescriptor {
            frequency: Hertz::MHz(8),
            bypass: false,
        });
        sim::poke(RCC::ADDRESS, CR_OFFSET, (1 << 16) | (1 << 17));
        rcc.sysclk().set_source(SysClkSource::Hse);
        assert_eq!(sim::peek(RCC::ADDRESS, CFGR_OFFSET) & 0b111, 0b010);

        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0b010 << 3);
        assert_eq!(rcc.sysclk().frequency().raw(), 8_000_000);
    }

    #[test]
    fn frequency_follows_switch_status() {
        let rcc = rcc();
        // MSI at its 4 MHz standby range out of reset
        sim::poke(RCC::ADDRESS, 0x94, 0b0110 << 8);
        assert_eq!(rcc.sysclk().frequency().raw(), 4_000_000);

        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0b001 << 3);
        assert_eq!(rcc.sysclk().frequency().raw(), 16_000_000);

        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0b100 << 3);
        assert_eq!(rcc.sysclk().frequency().raw(), 32_000);

        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0b101 << 3);
        assert_eq!(rcc.sysclk().frequency().raw(), 32_768);
    }

    #[test]
    #[should_panic(expected = "selects no clock")]
    fn reserved_switch_status_panics() {
        let rcc = rcc();
        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0b111 << 3);
        let _ = rcc.sysclk().frequency();
    }

    #[test]
    fn wait_source_times_out() {
        let rcc = rcc();
        let clock = SteppingClock::new(1);
        assert_eq!(
            rcc.sysclk().wait_source(
                SysClkSource::Hse,
                &clock,
                MilliSeconds::millis(3)
            ),
            Err(Timeout)
        );
        assert_eq!(
            rcc.sysclk().wait_source(
                SysClkSource::Msi,
                &clock,
                MilliSeconds::millis(3)
            ),
            Ok(())
        );
    }
}
