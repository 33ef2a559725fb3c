//! Reset and Clock Control
//!
//! This module configures the RCC unit to provide set frequencies for
//! the system clock `sys_ck`, the High-performance Bus (AHB) `hclk` and
//! the Peripheral (APB) Bus `pclk`.
//!
//! See Figure 16 "Clock tree" in Reference Manual RM0503 for more
//! information.
//!
//! HSI16 is 16 MHz.
//! MSI is 100 kHz to 48 MHz, 4 MHz after reset.
//! HSI48 is 48 MHz.
//! LSI is 32 kHz.
//!
//! # Usage
//!
//! A builder pattern is used to specify the state and frequency of
//! possible clocks. The `freeze` method configures the RCC peripheral
//! in a best-effort attempt to generate these clocks. The actual
//! clocks configured are returned in `ccdr.clocks`.
//!
//! Some clock specifications imply other clock specifications, as follows:
//!
//! * `use_hse(a)` implies `sys_ck(a)`
//!
//! * `use_msi(r)` implies `sys_ck(r)` unless `use_hse` was specified
//!
//! * `sys_ck(b)` implies the PLL R output at `b` unless `b` equals the
//!   selected oscillator
//!
//! Implied clock specifications can always be overridden by explicitly
//! specifying that clock. If this results in a configuration that cannot
//! be achieved by hardware, `freeze` will panic.
//!
//! ```rust
//!     let dp = stm32::Peripherals::take().unwrap();
//!
//!     let rcc = dp.RCC.constrain();
//!     let ccdr = rcc
//!         .sys_ck(48.MHz()) // Implies the PLL, from HSI16
//!         .pclk(24.MHz())
//!         .freeze();
//! ```
//!
//! # Step by step
//!
//! Each oscillator, the system clock multiplexer and both bus prescalers
//! can also be driven directly, before `freeze` is called:
//!
//! ```rust
//!     let rcc = dp.RCC.constrain();
//!
//!     let hsi16 = rcc.hsi16();
//!     hsi16.enable();
//!     hsi16.wait_ready_timeout(&mono, 10.millis())?;
//!
//!     rcc.sysclk().set_source(SysClkSource::Hsi16);
//!     rcc.sysclk().wait_source(SysClkSource::Hsi16, &mono, 10.millis())?;
//!
//!     assert_eq!(rcc.apb().frequency(), 16.MHz());
//! ```
//!
//! # Peripherals
//!
//! The `freeze()` method returns a [Core Clocks Distribution and Reset
//! (CCDR)](struct.Ccdr.html) object. This singleton tells you how the core
//! clocks were actually configured (in [CoreClocks](struct.CoreClocks.html))
//! and allows you to configure the remaining peripherals (see
//! [PeripheralREC](crate::rcc::rec::struct.PeripheralREC.html)).
//!
//!```rust
//! let ccdr = ...; // Returned by `freeze()`, see examples above
//!
//! // Runtime confirmation that hclk really is 48MHz
//! assert_eq!(ccdr.clocks.hclk().raw(), 48_000_000);
//!
//! // Enable the clock to a peripheral and reset it
//! ccdr.peripheral.USART2.enable().reset();
//!```
//!
//! The [PeripheralREC](struct.PeripheralREC.html) members implement move
//! semantics, so once you have passed them to a constructor they cannot be
//! modified again in safe Rust.
#![deny(missing_docs)]

use core::cell::Cell;

use tock_registers::interfaces::{ReadWriteable, Readable};

use crate::stm32::flash::ACR;
use crate::stm32::pwr::CR1;
use crate::stm32::rcc::APB1;
use crate::stm32::{FLASH, PWR, RCC};
use crate::time::Hertz;

#[cfg(feature = "log")]
use log::debug;

#[macro_use]
pub mod osc;
pub mod bus;
mod core_clocks;
pub mod pll;
pub mod rec;
pub mod sysclk;

pub use bus::{
    Descriptor as BusDescriptor, Hclk, HclkPrescaler, Pclk, PclkPrescaler,
    Prescaler,
};
pub use core_clocks::{CoreClocks, PllClocks};
pub use osc::{
    Hse, HseDescriptor, Hsi16, Hsi16Descriptor, Hsi48, Lse, LseDescriptor,
    LseDrive, Lsi, Msi, MsiDescriptor, MsiRange, Oscillator, HSI16, HSI48,
    LSE, LSI,
};
pub use pll::{Pll, PllDescriptor, PllSource};
pub use rec::{I2cClkSel, LowPowerMode, PeripheralREC, ResetEnable, UsartClkSel};
pub use sysclk::{SysClk, SysClkSource};

/// Configuration of the core clocks
pub struct Config {
    hse: Option<u32>,
    bypass_hse: bool,
    msi: Option<MsiRange>,
    lse: bool,
    bypass_lse: bool,
    lsi: bool,
    hsi48: bool,
    pll: Option<PllDescriptor>,
    sys_ck: Option<u32>,
    rcc_hclk: Option<u32>,
    rcc_pclk: Option<u32>,
}

/// Extension trait that constrains the `RCC` peripheral
pub trait RccExt {
    /// Constrains the `RCC` peripheral so it plays nicely with the
    /// other abstractions
    fn constrain(self) -> Rcc;
}

impl RccExt for RCC {
    fn constrain(self) -> Rcc {
        Rcc {
            config: Config {
                hse: None,
                bypass_hse: false,
                msi: None,
                lse: false,
                bypass_lse: false,
                lsi: false,
                hsi48: false,
                pll: None,
                sys_ck: None,
                rcc_hclk: None,
                rcc_pclk: None,
            },
            rb: self,
            hse_ck: Cell::new(None),
        }
    }
}

/// Constrained RCC peripheral
///
/// Generated by calling `constrain` on the RCC peripheral.
///
/// ```rust
/// let dp = stm32::Peripherals::take().unwrap();
/// let rcc = dp.RCC.constrain();
/// ```
pub struct Rcc {
    config: Config,
    pub(crate) rb: RCC,
    /// HSE frequency, known once it has been configured
    hse_ck: Cell<Option<Hertz>>,
}

/// Core Clock Distribution and Reset (CCDR)
///
/// Generated when the RCC is frozen. The configuration of the `sys_ck`,
/// the AHB clock `hclk`, the APB clock `pclk` and the PLL outputs are
/// frozen. However the distribution of some clocks may still be modified and
/// peripherals enabled / reset by passing this object to other implementations
/// in this stack.
pub struct Ccdr {
    /// A record of the frozen core clock frequencies
    pub clocks: CoreClocks,

    /// Peripheral reset / enable / kernel clock control
    pub peripheral: PeripheralREC,
}

const MAX_SYSCLK_FREQ_HZ: u32 = 56_000_000;

impl Rcc {
    /// HSI16 oscillator
    pub fn hsi16(&self) -> Hsi16<'_> {
        Hsi16::new(self)
    }

    /// MSI oscillator
    pub fn msi(&self) -> Msi<'_> {
        Msi::new(self)
    }

    /// HSE oscillator
    pub fn hse(&self) -> Hse<'_> {
        Hse::new(self)
    }

    /// LSE oscillator
    pub fn lse(&self) -> Lse<'_> {
        Lse::new(self)
    }

    /// LSI oscillator
    pub fn lsi(&self) -> Lsi<'_> {
        Lsi::new(self)
    }

    /// HSI48 oscillator
    pub fn hsi48(&self) -> Hsi48<'_> {
        Hsi48::new(self)
    }

    /// Main PLL
    pub fn pll(&self) -> Pll<'_> {
        Pll::new(self)
    }

    /// System clock multiplexer
    pub fn sysclk(&self) -> SysClk<'_> {
        SysClk::new(self)
    }

    /// AHB prescaler
    pub fn ahb(&self) -> Hclk<'_> {
        Hclk::new(self)
    }

    /// APB prescaler
    pub fn apb(&self) -> Pclk<'_> {
        Pclk::new(self)
    }

    /// Grant write access to the backup domain, which holds the LSE and RTC
    /// configuration.
    pub fn unlock_backup_domain(&self) {
        critical_section::with(|_| self.rb.apbenr1.modify(APB1::PWR::SET));

        // unsafe: DBP is only written here
        let pwr = unsafe { &*PWR::ptr() };
        pwr.cr1.modify(CR1::DBP::SET);
        while !pwr.cr1.is_set(CR1::DBP) {}
    }

    /// Current clock frequencies, read back from the RCC registers.
    ///
    /// Oscillators that are not ready are reported as `None`.
    pub fn clocks(&self) -> CoreClocks {
        fn running<O: Oscillator>(osc: &O) -> Option<Hertz> {
            osc.is_ready().then(|| osc.frequency())
        }

        let pll = self.pll();
        let pll_clocks = match pll.get_descriptor() {
            Some(desc) if pll.is_ready() => {
                let ref_ck = pll.source_frequency(desc.source);
                PllClocks::new(
                    desc.p_frequency(ref_ck),
                    desc.q_frequency(ref_ck),
                    Some(desc.r_frequency(ref_ck)),
                )
            }
            _ => PllClocks::new(None, None, None),
        };

        CoreClocks {
            sys_ck: self.sysclk().frequency(),
            hclk: self.ahb().frequency(),
            pclk: self.apb().frequency(),
            ppre: self.apb().get_descriptor().prescaler.divisor() as u8,
            msi_ck: running(&self.msi()),
            hsi16_ck: running(&self.hsi16()),
            hse_ck: self.hse_ck.get().filter(|_| self.hse().is_ready()),
            lse_ck: running(&self.lse()),
            lsi_ck: running(&self.lsi()),
            hsi48_ck: running(&self.hsi48()),
            pll: pll_clocks,
        }
    }
}

impl Rcc {
    /// Uses HSE (external oscillator) instead of HSI16 (internal RC
    /// oscillator) as the clock source. Will result in a hang if an
    /// external oscillator is not connected or it fails to start.
    #[must_use]
    pub fn use_hse(mut self, freq: Hertz) -> Self {
        assert!(
            freq.raw() <= 48_000_000,
            "HSE frequency must not exceed 48 MHz"
        );
        self.config.hse = Some(freq.raw());
        self
    }

    /// Use an external clock signal rather than a crystal oscillator,
    /// bypassing the XTAL driver.
    #[must_use]
    pub fn bypass_hse(mut self) -> Self {
        self.config.bypass_hse = true;
        self
    }

    /// Uses MSI at the given range instead of HSI16 as the clock source
    #[must_use]
    pub fn use_msi(mut self, range: MsiRange) -> Self {
        self.config.msi = Some(range);
        self
    }

    /// Start the 32.768 kHz LSE crystal
    #[must_use]
    pub fn use_lse(mut self) -> Self {
        self.config.lse = true;
        self
    }

    /// Start LSE with an external clock signal rather than a crystal
    #[must_use]
    pub fn bypass_lse(mut self) -> Self {
        self.config.lse = true;
        self.config.bypass_lse = true;
        self
    }

    /// Start the 32 kHz LSI oscillator
    #[must_use]
    pub fn use_lsi(mut self) -> Self {
        self.config.lsi = true;
        self
    }

    /// Start the 48 MHz HSI48 oscillator
    #[must_use]
    pub fn use_hsi48(mut self) -> Self {
        self.config.hsi48 = true;
        self
    }

    /// Drive `sys_ck` from the PLL with explicit dividers. Overrides
    /// `sys_ck`.
    #[must_use]
    pub fn use_pll(mut self, desc: PllDescriptor) -> Self {
        self.config.pll = Some(desc);
        self
    }

    /// Set SYSCLK frequency
    #[must_use]
    pub fn sys_ck(mut self, freq: Hertz) -> Self {
        assert!(
            freq.raw() <= MAX_SYSCLK_FREQ_HZ,
            "Max frequency is {MAX_SYSCLK_FREQ_HZ}Hz"
        );
        self.config.sys_ck = Some(freq.raw());
        self
    }

    /// Set the peripheral clock frequency for AHB peripherals.
    #[must_use]
    pub fn hclk(mut self, freq: Hertz) -> Self {
        assert!(
            freq.raw() <= MAX_SYSCLK_FREQ_HZ,
            "Max frequency is {MAX_SYSCLK_FREQ_HZ}Hz"
        );
        self.config.rcc_hclk = Some(freq.raw());
        self
    }

    /// Set the peripheral clock frequency for APB peripherals.
    #[must_use]
    pub fn pclk(mut self, freq: Hertz) -> Self {
        assert!(
            freq.raw() <= MAX_SYSCLK_FREQ_HZ,
            "Max frequency is {MAX_SYSCLK_FREQ_HZ}Hz"
        );
        self.config.rcc_pclk = Some(freq.raw());
        self
    }
}

/// Flash wait states for a given `hclk`, voltage range 1 (RM0503 Table 10)
fn flash_latency(rcc_hclk: u32) -> u32 {
    match rcc_hclk {
        0..=24_000_000 => 0,
        24_000_001..=48_000_000 => 1,
        _ => 2,
    }
}

fn start<O: Oscillator>(osc: &O) {
    if !osc.is_enabled() {
        osc.enable();
    }
    osc.wait_ready();
}

impl Rcc {
    fn flash_setup(wait_states: u32) {
        // unsafe: LATENCY is only written while the clocks are frozen
        let flash = unsafe { &*FLASH::ptr() };
        flash.acr.modify(ACR::LATENCY.val(wait_states));
        while flash.acr.read(ACR::LATENCY) != wait_states {}
    }

    /// Frequency the PLL will see from `source` once the oscillators are
    /// configured
    fn pll_reference(&self, source: PllSource) -> u32 {
        match source {
            PllSource::Hse => match self.config.hse {
                Some(hse) => hse,
                None => panic!("The PLL can only run from HSE after use_hse"),
            },
            PllSource::Msi => match self.config.msi {
                Some(range) => range.frequency().raw(),
                None => self.msi().frequency().raw(),
            },
            PllSource::Hsi16 => HSI16.raw(),
        }
    }

    /// Setup sys_ck
    /// Returns the oscillator that feeds sys_ck directly or through the PLL,
    /// the PLL dividers if the PLL is needed and the sys_ck frequency
    fn sys_ck_setup(&self) -> (SysClkSource, Option<PllDescriptor>, u32) {
        if let Some(desc) = self.config.pll {
            let ref_ck = Hertz::from_raw(self.pll_reference(desc.source));
            return (
                SysClkSource::Pll,
                Some(desc),
                desc.r_frequency(ref_ck).raw(),
            );
        }

        let (src, pll_src) = match (self.config.hse, self.config.msi) {
            (Some(_), _) => (SysClkSource::Hse, PllSource::Hse),
            (None, Some(_)) => (SysClkSource::Msi, PllSource::Msi),
            (None, None) => (SysClkSource::Hsi16, PllSource::Hsi16),
        };
        // Compare available with wanted clocks
        let srcclk = self.pll_reference(pll_src);
        let sys_ck = self.config.sys_ck.unwrap_or(srcclk);

        if sys_ck == srcclk {
            return (src, None, sys_ck);
        }

        // The requested system clock is not the immediately available
        // oscillator, so the PLL R output must be used
        let desc = match PllDescriptor::for_target(
            pll_src,
            Hertz::from_raw(srcclk),
            Hertz::from_raw(sys_ck),
        ) {
            Some(desc) => desc,
            None => panic!(
                "sys_ck of {sys_ck}Hz cannot be generated from {srcclk}Hz"
            ),
        };
        let sys_ck = desc.r_frequency(Hertz::from_raw(srcclk)).raw();
        (SysClkSource::Pll, Some(desc), sys_ck)
    }

    fn start_reference(&self, source: SysClkSource) {
        match source {
            SysClkSource::Msi => start(&self.msi()),
            SysClkSource::Hsi16 => start(&self.hsi16()),
            SysClkSource::Hse => start(&self.hse()),
            SysClkSource::Lsi => start(&self.lsi()),
            SysClkSource::Lse => start(&self.lse()),
            SysClkSource::Pll => unreachable!(),
        }
    }

    /// Freeze the core clocks, returning a Core Clocks Distribution
    /// and Reset (CCDR) structure. The actual frequency of the clocks
    /// configured is returned in the `clocks` member of the CCDR
    /// structure.
    ///
    /// Note that `freeze` will never result in a clock _faster_ than
    /// that specified. It may result in a clock that is a factor of [1,
    /// 2) slower.
    ///
    /// # Panics
    ///
    /// If a clock specification cannot be achieved within the
    /// hardware specification then this function will panic.
    pub fn freeze(self) -> Ccdr {
        // We do not reset RCC here. This routine must assert when
        // the previous state of the RCC peripheral is unacceptable.

        // sys_ck from the PLL if needed, else HSE, MSI or HSI16
        let (sys_src, pll_desc, sys_ck) = self.sys_ck_setup();
        assert!(
            sys_ck <= MAX_SYSCLK_FREQ_HZ,
            "Max frequency is {MAX_SYSCLK_FREQ_HZ}Hz"
        );
        let ref_src = match pll_desc.map(|desc| desc.source) {
            Some(PllSource::Msi) => SysClkSource::Msi,
            Some(PllSource::Hsi16) => SysClkSource::Hsi16,
            Some(PllSource::Hse) => SysClkSource::Hse,
            None => sys_src,
        };

        // Get AHB clock or sensible default
        let rcc_hclk = self.config.rcc_hclk.unwrap_or(sys_ck);
        let hpre = HclkPrescaler::at_most(sys_ck, rcc_hclk);
        // Calculate real AHB clock
        let rcc_hclk = sys_ck >> hpre.shift();

        let rcc_pclk = self.config.rcc_pclk.unwrap_or(rcc_hclk);
        let ppre = PclkPrescaler::at_most(rcc_hclk, rcc_pclk);

        // Start switching clocks here! ----------------------------------------

        // Flash wait states for the fastest clock seen while switching
        let flash = unsafe { &*FLASH::ptr() };
        let transition = flash_latency(sys_ck).max(flash.acr.read(ACR::LATENCY));
        Self::flash_setup(transition);

        // HSE
        if let Some(hse) = self.config.hse {
            let osc = self.hse();
            let frequency = Hertz::from_raw(hse);
            if osc.is_enabled() {
                self.hse_ck.set(Some(frequency));
            } else {
                osc.set_descriptor(HseDescriptor {
                    frequency,
                    bypass: self.config.bypass_hse,
                });
            }
        }

        // MSI
        if let Some(range) = self.config.msi {
            let msi = self.msi();
            if msi.is_enabled() {
                msi.wait_ready();
            }
            let current = msi.get_descriptor();
            msi.set_descriptor(MsiDescriptor {
                range,
                standby_range: current
                    .standby_range
                    .clamp(MsiRange::Range1M, MsiRange::Range8M),
                trim: current.trim,
            });
        }

        // Ensure the oscillator feeding sys_ck is on and stable
        self.start_reference(ref_src);

        if self.config.lse {
            self.unlock_backup_domain();
            let lse = self.lse();
            if !lse.is_enabled() {
                lse.set_descriptor(LseDescriptor {
                    bypass: self.config.bypass_lse,
                    ..LseDescriptor::default()
                });
            }
            start(&lse);
        }
        if self.config.lsi {
            start(&self.lsi());
        }
        if self.config.hsi48 {
            start(&self.hsi48());
        }

        // PLL
        if let Some(desc) = pll_desc {
            let pll = self.pll();
            if pll.is_enabled() {
                assert!(
                    !self.sysclk().is_source(SysClkSource::Pll),
                    "The PLL cannot be reconfigured while it drives sys_ck"
                );
                pll.disable();
                while pll.is_ready() {}
            }
            pll.set_descriptor(desc);
            // Enable PLL and wait for it to stabilise
            pll.enable();
            pll.wait_ready();
        }

        // AHB Prescaler / APB Prescaler
        self.ahb().set_descriptor(BusDescriptor { prescaler: hpre });
        self.apb().set_descriptor(BusDescriptor { prescaler: ppre });

        // Select system clock source
        let sysclk = self.sysclk();
        sysclk.set_source(sys_src);
        while !sysclk.is_source(sys_src) {}

        // Wait states for the final hclk
        Self::flash_setup(flash_latency(rcc_hclk));

        // This section prints the final register configuration for the main
        // RCC registers:
        // - System Clock Mux
        // - PLL configuration
        // - System Prescalers
        #[cfg(feature = "log")]
        {
            debug!("--- RCC register settings");
            debug!("CR register: {:#010x}", self.rb.cr.get());
            debug!(
                "CFGR register: SWS (System Clock Mux)={:?} HPRE={:?} PPRE={:?}",
                sysclk.source(),
                self.ahb().get_descriptor().prescaler,
                self.apb().get_descriptor().prescaler,
            );
            debug!("PLLCFGR register: {:?}", self.pll().get_descriptor());
            debug!("FLASH ACR register: LATENCY={}", flash.acr.read(ACR::LATENCY));
        }

        // Return frozen clock configuration
        Ccdr {
            clocks: self.clocks(),
            peripheral: unsafe {
                // unsafe: we consume self which was a singleton, hence
                // we can safely create a singleton here
                PeripheralREC::new_singleton()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stm32::sim;
    use fugit::RateExtU32;

    const CR_OFFSET: usize = 0x00;
    const CFGR_OFFSET: usize = 0x08;

    const HSIRDY: u32 = 1 << 10;
    const HSERDY: u32 = 1 << 17;
    const PLLRDY: u32 = 1 << 25;

    fn rcc() -> Rcc {
        unsafe { RCC::steal() }.constrain()
    }

    fn switch_status(source: u32) {
        sim::poke(RCC::ADDRESS, CFGR_OFFSET, source << 3);
    }

    #[test]
    fn freeze_defaults_to_hsi16() {
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, HSIRDY);
        switch_status(0b001);

        let ccdr = rcc().freeze();

        assert_eq!(ccdr.clocks.sys_ck().raw(), 16_000_000);
        assert_eq!(ccdr.clocks.hclk().raw(), 16_000_000);
        assert_eq!(ccdr.clocks.pclk().raw(), 16_000_000);
        assert_eq!(ccdr.clocks.ppre(), 1);
        assert_eq!(ccdr.clocks.hsi16_ck(), Some(16.MHz()));
        assert_eq!(ccdr.clocks.hse_ck(), None);
        assert_eq!(ccdr.clocks.pll().r_ck(), None);

        // HSION set, SW = HSI16
        assert_eq!(sim::peek(RCC::ADDRESS, CR_OFFSET) & (1 << 8), 1 << 8);
        assert_eq!(sim::peek(RCC::ADDRESS, CFGR_OFFSET) & 0b111, 0b001);
        assert_eq!(sim::peek(FLASH::ADDRESS, 0), 0);
    }

    #[test]
    fn freeze_with_pll_from_hsi16() {
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, HSIRDY | PLLRDY);
        switch_status(0b011);

        let ccdr = rcc().sys_ck(48.MHz()).pclk(24.MHz()).freeze();

        assert_eq!(ccdr.clocks.sys_ck().raw(), 48_000_000);
        assert_eq!(ccdr.clocks.hclk().raw(), 48_000_000);
        assert_eq!(ccdr.clocks.pclk().raw(), 24_000_000);
        assert_eq!(ccdr.clocks.ppre(), 2);
        assert_eq!(ccdr.clocks.timer_ker_ck().raw(), 48_000_000);
        assert_eq!(ccdr.clocks.pll().r_ck(), Some(48.MHz()));

        // One wait state at 48 MHz
        assert_eq!(sim::peek(FLASH::ADDRESS, 0) & 0b111, 1);
        // SW = PLL R, PPRE = /2
        let cfgr = sim::peek(RCC::ADDRESS, CFGR_OFFSET);
        assert_eq!(cfgr & 0b111, 0b011);
        assert_eq!((cfgr >> 12) & 0b111, 0b100);
    }

    #[test]
    fn freeze_with_pll_from_hse() {
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, HSERDY | PLLRDY);
        switch_status(0b011);

        let ccdr = rcc().use_hse(8.MHz()).sys_ck(32.MHz()).freeze();

        assert_eq!(ccdr.clocks.sys_ck().raw(), 32_000_000);
        assert_eq!(ccdr.clocks.hse_ck(), Some(8.MHz()));
        assert_eq!(ccdr.clocks.hsi16_ck(), None);
    }

    #[test]
    fn freeze_with_explicit_pll() {
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, HSIRDY | PLLRDY);
        switch_status(0b011);

        let desc = PllDescriptor {
            source: PllSource::Hsi16,
            m: 2,
            n: 14,
            r: 2,
            p: None,
            q: Some(2),
        };
        let ccdr = rcc().use_pll(desc).freeze();

        assert_eq!(ccdr.clocks.sys_ck().raw(), 56_000_000);
        assert_eq!(ccdr.clocks.pll().q_ck(), Some(56.MHz()));
        assert_eq!(sim::peek(FLASH::ADDRESS, 0) & 0b111, 2);
    }

    #[test]
    fn freeze_hse_without_pll() {
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, HSERDY);
        switch_status(0b010);

        let ccdr = rcc().use_hse(24.MHz()).bypass_hse().hclk(12.MHz()).freeze();

        assert_eq!(ccdr.clocks.sys_ck().raw(), 24_000_000);
        assert_eq!(ccdr.clocks.hclk().raw(), 12_000_000);
        // HSEON and HSEBYP
        let cr = sim::peek(RCC::ADDRESS, CR_OFFSET);
        assert_eq!(cr & (0b101 << 16), 0b101 << 16);
    }

    #[test]
    #[should_panic(expected = "Max frequency is 56000000Hz")]
    fn sys_ck_above_maximum() {
        let _ = rcc().sys_ck(64.MHz());
    }

    #[test]
    fn flash_latency_steps() {
        assert_eq!(flash_latency(4_000_000), 0);
        assert_eq!(flash_latency(24_000_000), 0);
        assert_eq!(flash_latency(24_000_001), 1);
        assert_eq!(flash_latency(48_000_000), 1);
        assert_eq!(flash_latency(56_000_000), 2);
    }

    #[test]
    fn backup_domain_unlock() {
        rcc().unlock_backup_domain();
        assert_eq!(sim::peek(RCC::ADDRESS, 0x58), 1 << 28);
        assert_eq!(sim::peek(PWR::ADDRESS, 0), 1 << 8);
    }
}
