//! Oscillators
//!
//! Each clock source of the STM32U0 has a driver borrowed from the
//! constrained [`Rcc`]. The enabled and ready states are always read from
//! hardware; nothing is cached.
//!
//! ```rust
//! let rcc = dp.RCC.constrain();
//!
//! let hsi16 = rcc.hsi16();
//! hsi16.enable();
//! hsi16.wait_ready();
//! assert_eq!(hsi16.frequency(), 16.MHz());
//! ```

use tock_registers::interfaces::{ReadWriteable, Readable};

use super::Rcc;
use crate::stm32::rcc::{BDCR, CR, CRRCR, CSR, ICSCR};
use crate::time::{wait_until, Hertz, MilliSeconds, Monotonic, Timeout};

/// HSI16 frequency
pub const HSI16: Hertz = Hertz::MHz(16);
/// LSI frequency
pub const LSI: Hertz = Hertz::kHz(32);
/// LSE frequency
pub const LSE: Hertz = Hertz::Hz(32_768);
/// HSI48 frequency
pub const HSI48: Hertz = Hertz::MHz(48);

/// Enable, disable and readiness of a clock source
pub trait Oscillator {
    /// Switch the oscillator on.
    ///
    /// # Panics
    ///
    /// Panics if the oscillator is already enabled.
    fn enable(&self);

    /// Switch the oscillator off.
    ///
    /// # Panics
    ///
    /// Panics if the oscillator is already disabled.
    fn disable(&self);

    /// Returns `true` if the oscillator has been switched on
    fn is_enabled(&self) -> bool;

    /// Returns `true` once the oscillator output is stable. Does not block.
    fn is_ready(&self) -> bool;

    /// Output frequency of the oscillator
    fn frequency(&self) -> Hertz;

    /// Spin until the oscillator is ready
    fn wait_ready(&self) {
        while !self.is_ready() {}
    }

    /// Spin until the oscillator is ready, giving up after `timeout`
    fn wait_ready_timeout<M>(
        &self,
        mono: &M,
        timeout: MilliSeconds,
    ) -> Result<(), Timeout>
    where
        Self: Sized,
        M: Monotonic + ?Sized,
    {
        wait_until(mono, timeout, || self.is_ready())
    }
}

macro_rules! oscillator {
    ($(#[$doc:meta])* $Osc:ident: $name:literal, $reg:ident, $REG:ident::[$ON:ident, $RDY:ident]) => {
        $(#[$doc])*
        pub struct $Osc<'a> {
            pub(super) rcc: &'a Rcc,
        }

        impl<'a> $Osc<'a> {
            pub(super) fn new(rcc: &'a Rcc) -> Self {
                Self { rcc }
            }
        }

        impl Oscillator for $Osc<'_> {
            fn enable(&self) {
                assert!(!self.is_enabled(), concat!($name, " is already enabled"));
                critical_section::with(|_| {
                    self.rcc.rb.$reg.modify($REG::$ON::SET)
                });
            }

            fn disable(&self) {
                assert!(self.is_enabled(), concat!($name, " is already disabled"));
                critical_section::with(|_| {
                    self.rcc.rb.$reg.modify($REG::$ON::CLEAR)
                });
            }

            #[inline]
            fn is_enabled(&self) -> bool {
                self.rcc.rb.$reg.is_set($REG::$ON)
            }

            #[inline]
            fn is_ready(&self) -> bool {
                self.rcc.rb.$reg.is_set($REG::$RDY)
            }

            fn frequency(&self) -> Hertz {
                self.current_frequency()
            }
        }
    };
}

oscillator!(
    /// 16 MHz high-speed internal RC oscillator
    Hsi16: "HSI16", cr, CR::[HSION, HSIRDY]
);
oscillator!(
    /// Multi-speed internal RC oscillator, 100 kHz to 48 MHz
    Msi: "MSI", cr, CR::[MSION, MSIRDY]
);
oscillator!(
    /// High-speed external crystal or clock input
    ///
    /// Its frequency is only known once recorded with
    /// [`Hse::set_descriptor`]; do that before enabling it.
    Hse: "HSE", cr, CR::[HSEON, HSERDY]
);
oscillator!(
    /// 32.768 kHz low-speed external crystal or clock input
    Lse: "LSE", bdcr, BDCR::[LSEON, LSERDY]
);
oscillator!(
    /// 32 kHz low-speed internal RC oscillator
    Lsi: "LSI", csr, CSR::[LSION, LSIRDY]
);
oscillator!(
    /// 48 MHz internal RC oscillator
    Hsi48: "HSI48", crrcr, CRRCR::[HSI48ON, HSI48RDY]
);

/// HSI16 configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsi16Descriptor {
    /// User trimming, 0..=127. 64 is the factory centre value.
    pub trim: u8,
}

impl Default for Hsi16Descriptor {
    fn default() -> Self {
        Self { trim: 64 }
    }
}

impl Hsi16<'_> {
    fn current_frequency(&self) -> Hertz {
        HSI16
    }

    /// Apply the HSI16 trimming. May be changed while HSI16 runs.
    pub fn set_descriptor(&self, desc: Hsi16Descriptor) {
        assert!(desc.trim < 128, "HSI16 trim is a 7 bit value");
        critical_section::with(|_| {
            self.rcc
                .rb
                .icscr
                .modify(ICSCR::HSITRIM.val(u32::from(desc.trim)))
        });
    }

    /// Read back the HSI16 configuration
    pub fn get_descriptor(&self) -> Hsi16Descriptor {
        Hsi16Descriptor {
            trim: self.rcc.rb.icscr.read(ICSCR::HSITRIM) as u8,
        }
    }
}

/// MSI frequency range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MsiRange {
    /// Around 100 kHz
    Range100k = 0b0000,
    /// Around 200 kHz
    Range200k = 0b0001,
    /// Around 400 kHz
    Range400k = 0b0010,
    /// Around 800 kHz
    Range800k = 0b0011,
    /// Around 1 MHz
    Range1M = 0b0100,
    /// Around 2 MHz
    Range2M = 0b0101,
    /// Around 4 MHz, the reset value
    Range4M = 0b0110,
    /// Around 8 MHz
    Range8M = 0b0111,
    /// Around 16 MHz
    Range16M = 0b1000,
    /// Around 24 MHz
    Range24M = 0b1001,
    /// Around 32 MHz
    Range32M = 0b1010,
    /// Around 48 MHz
    Range48M = 0b1011,
}

const MSI_RANGES: [MsiRange; 12] = [
    MsiRange::Range100k,
    MsiRange::Range200k,
    MsiRange::Range400k,
    MsiRange::Range800k,
    MsiRange::Range1M,
    MsiRange::Range2M,
    MsiRange::Range4M,
    MsiRange::Range8M,
    MsiRange::Range16M,
    MsiRange::Range24M,
    MsiRange::Range32M,
    MsiRange::Range48M,
];

const MSI_FREQUENCIES: [u32; 12] = [
    100_000, 200_000, 400_000, 800_000, 1_000_000, 2_000_000, 4_000_000,
    8_000_000, 16_000_000, 24_000_000, 32_000_000, 48_000_000,
];

impl MsiRange {
    /// Nominal frequency of this range
    pub const fn frequency(self) -> Hertz {
        Hertz::from_raw(MSI_FREQUENCIES[self as usize])
    }

    fn from_field(bits: u32) -> Self {
        match MSI_RANGES.get(bits as usize) {
            Some(range) => *range,
            None => panic!("Reserved MSI range {:#06b}", bits),
        }
    }
}

/// MSI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MsiDescriptor {
    /// Range used in run mode
    pub range: MsiRange,
    /// Range used after waking from standby, 1 MHz to 8 MHz
    pub standby_range: MsiRange,
    /// User trimming, added to the factory calibration
    pub trim: u8,
}

impl Default for MsiDescriptor {
    fn default() -> Self {
        Self {
            range: MsiRange::Range4M,
            standby_range: MsiRange::Range4M,
            trim: 0,
        }
    }
}

impl Msi<'_> {
    fn current_frequency(&self) -> Hertz {
        self.range().frequency()
    }

    /// The range currently in effect.
    ///
    /// Until a run range has been selected through MSIRGSEL the MSI runs at
    /// the standby range.
    pub fn range(&self) -> MsiRange {
        let rb = &self.rcc.rb;
        if rb.cr.is_set(CR::MSIRGSEL) {
            MsiRange::from_field(rb.cr.read(CR::MSIRANGE))
        } else {
            MsiRange::from_field(rb.csr.read(CSR::MSISRANGE))
        }
    }

    /// Apply the MSI configuration and select the run range.
    ///
    /// # Panics
    ///
    /// Panics if MSI is on but not yet ready, since the range may not be
    /// changed then, or if the standby range is outside 1 MHz to 8 MHz.
    pub fn set_descriptor(&self, desc: MsiDescriptor) {
        assert!(
            !self.is_enabled() || self.is_ready(),
            "MSI range cannot change while MSI is starting"
        );
        assert!(
            (MsiRange::Range1M..=MsiRange::Range8M)
                .contains(&desc.standby_range),
            "MSI standby range must be between 1 MHz and 8 MHz"
        );
        critical_section::with(|_| {
            let rb = &self.rcc.rb;
            rb.icscr.modify(ICSCR::MSITRIM.val(u32::from(desc.trim)));
            rb.csr
                .modify(CSR::MSISRANGE.val(desc.standby_range as u32));
            rb.cr.modify(
                CR::MSIRANGE.val(desc.range as u32) + CR::MSIRGSEL::SET,
            );
        });
    }

    /// Read back the MSI configuration
    pub fn get_descriptor(&self) -> MsiDescriptor {
        let rb = &self.rcc.rb;
        MsiDescriptor {
            range: MsiRange::from_field(rb.cr.read(CR::MSIRANGE)),
            standby_range: MsiRange::from_field(rb.csr.read(CSR::MSISRANGE)),
            trim: rb.icscr.read(ICSCR::MSITRIM) as u8,
        }
    }
}

/// HSE configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HseDescriptor {
    /// Frequency of the crystal or external clock
    pub frequency: Hertz,
    /// External clock signal instead of a crystal
    pub bypass: bool,
}

impl Hse<'_> {
    fn current_frequency(&self) -> Hertz {
        match self.rcc.hse_ck.get() {
            Some(frequency) => frequency,
            None => panic!("HSE frequency has not been configured"),
        }
    }

    /// Record the board's HSE frequency and select crystal or bypass mode.
    ///
    /// # Panics
    ///
    /// Panics if HSE is enabled or the frequency is above 48 MHz.
    pub fn set_descriptor(&self, desc: HseDescriptor) {
        assert!(
            !self.is_enabled(),
            "HSE must be disabled to change its configuration"
        );
        assert!(
            desc.frequency <= Hertz::MHz(48),
            "HSE frequency must not exceed 48 MHz"
        );
        critical_section::with(|_| {
            self.rcc.rb.cr.modify(if desc.bypass {
                CR::HSEBYP::SET
            } else {
                CR::HSEBYP::CLEAR
            })
        });
        self.rcc.hse_ck.set(Some(desc.frequency));
    }

    /// Read back the HSE configuration, if its frequency is known
    pub fn get_descriptor(&self) -> Option<HseDescriptor> {
        self.rcc.hse_ck.get().map(|frequency| HseDescriptor {
            frequency,
            bypass: self.rcc.rb.cr.is_set(CR::HSEBYP),
        })
    }
}

/// LSE oscillator drive capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LseDrive {
    /// Lowest drive
    Low = 0b00,
    /// Medium-low drive
    MediumLow = 0b01,
    /// Medium-high drive
    MediumHigh = 0b10,
    /// Highest drive
    High = 0b11,
}

/// LSE configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LseDescriptor {
    /// External clock signal instead of a crystal
    pub bypass: bool,
    /// Crystal drive capability
    pub drive: LseDrive,
}

impl Default for LseDescriptor {
    fn default() -> Self {
        Self {
            bypass: false,
            drive: LseDrive::Low,
        }
    }
}

impl Lse<'_> {
    fn current_frequency(&self) -> Hertz {
        LSE
    }

    /// Apply the LSE configuration. Backup domain write access must have
    /// been granted with [`Rcc::unlock_backup_domain`].
    ///
    /// # Panics
    ///
    /// Panics if LSE is enabled.
    pub fn set_descriptor(&self, desc: LseDescriptor) {
        assert!(
            !self.is_enabled(),
            "LSE must be disabled to change its configuration"
        );
        let bypass = if desc.bypass {
            BDCR::LSEBYP::SET
        } else {
            BDCR::LSEBYP::CLEAR
        };
        critical_section::with(|_| {
            self.rcc
                .rb
                .bdcr
                .modify(bypass + BDCR::LSEDRV.val(desc.drive as u32))
        });
    }

    /// Read back the LSE configuration
    pub fn get_descriptor(&self) -> LseDescriptor {
        let bdcr = &self.rcc.rb.bdcr;
        LseDescriptor {
            bypass: bdcr.is_set(BDCR::LSEBYP),
            drive: match bdcr.read(BDCR::LSEDRV) {
                0b00 => LseDrive::Low,
                0b01 => LseDrive::MediumLow,
                0b10 => LseDrive::MediumHigh,
                _ => LseDrive::High,
            },
        }
    }
}

impl Lsi<'_> {
    fn current_frequency(&self) -> Hertz {
        LSI
    }
}

impl Hsi48<'_> {
    fn current_frequency(&self) -> Hertz {
        HSI48
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rcc::RccExt;
    use crate::stm32::{sim, RCC};
    use crate::time::tests::SteppingClock;

    const CR_OFFSET: usize = 0x00;
    const CSR_OFFSET: usize = 0x94;

    fn rcc() -> Rcc {
        unsafe { RCC::steal() }.constrain()
    }

    #[test]
    fn fixed_frequencies() {
        let rcc = rcc();
        assert_eq!(rcc.hsi16().frequency().raw(), 16_000_000);
        assert_eq!(rcc.lsi().frequency().raw(), 32_000);
        assert_eq!(rcc.lse().frequency().raw(), 32_768);
        assert_eq!(rcc.hsi48().frequency().raw(), 48_000_000);
    }

    #[test]
    fn enable_touches_only_its_own_bit() {
        let rcc = rcc();
        sim::poke(RCC::ADDRESS, CR_OFFSET, 0x0000_00F9);

        rcc.hsi16().enable();
        assert_eq!(sim::peek(RCC::ADDRESS, CR_OFFSET), 0x0000_01F9);
        assert!(rcc.hsi16().is_enabled());

        rcc.hse().enable();
        assert_eq!(sim::peek(RCC::ADDRESS, CR_OFFSET), 0x0001_01F9);

        rcc.hsi16().disable();
        assert_eq!(sim::peek(RCC::ADDRESS, CR_OFFSET), 0x0001_00F9);
    }

    #[test]
    fn low_speed_oscillators_use_their_own_registers() {
        let rcc = rcc();
        rcc.lsi().enable();
        assert_eq!(sim::peek(RCC::ADDRESS, CSR_OFFSET), 0b1);
        assert_eq!(sim::peek(RCC::ADDRESS, CR_OFFSET), 0);

        rcc.hsi48().enable();
        assert_eq!(sim::peek(RCC::ADDRESS, 0x98), 0b1);
    }

    #[test]
    #[should_panic(expected = "HSI16 is already enabled")]
    fn double_enable_panics() {
        let rcc = rcc();
        rcc.hsi16().enable();
        rcc.hsi16().enable();
    }

    #[test]
    #[should_panic(expected = "LSI is already disabled")]
    fn disable_when_off_panics() {
        rcc().lsi().disable();
    }

    #[test]
    fn ready_is_read_from_hardware() {
        let rcc = rcc();
        let hsi = rcc.hsi16();
        assert!(!hsi.is_ready());
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, 1 << 10);
        assert!(hsi.is_ready());
    }

    #[test]
    fn wait_ready_times_out() {
        let rcc = rcc();
        let clock = SteppingClock::new(1);
        rcc.hse().enable();
        assert_eq!(
            rcc.hse().wait_ready_timeout(&clock, MilliSeconds::millis(5)),
            Err(Timeout)
        );
        sim::set_bits(RCC::ADDRESS, CR_OFFSET, 1 << 17);
        assert_eq!(
            rcc.hse().wait_ready_timeout(&clock, MilliSeconds::millis(5)),
            Ok(())
        );
    }

    #[test]
    fn msi_standby_range_after_reset() {
        let rcc = rcc();
        sim::poke(RCC::ADDRESS, CSR_OFFSET, 0b0110 << 8);
        assert_eq!(rcc.msi().range(), MsiRange::Range4M);
        assert_eq!(rcc.msi().frequency().raw(), 4_000_000);
    }

    #[test]
    fn msi_run_range_decoded_from_table() {
        let rcc = rcc();
        for (i, expected) in MSI_FREQUENCIES.iter().enumerate() {
            sim::poke(RCC::ADDRESS, CR_OFFSET, (1 << 3) | ((i as u32) << 4));
            assert_eq!(rcc.msi().frequency().raw(), *expected);
        }
    }

    #[test]
    fn msi_descriptor_round_trip() {
        let rcc = rcc();
        let desc = MsiDescriptor {
            range: MsiRange::Range16M,
            standby_range: MsiRange::Range2M,
            trim: 5,
        };
        rcc.msi().set_descriptor(desc);
        assert_eq!(rcc.msi().get_descriptor(), desc);
        assert_eq!(rcc.msi().range(), MsiRange::Range16M);
    }

    #[test]
    #[should_panic(expected = "MSI range cannot change while MSI is starting")]
    fn msi_range_locked_while_starting() {
        let rcc = rcc();
        rcc.msi().enable();
        rcc.msi().set_descriptor(MsiDescriptor::default());
    }

    #[test]
    #[should_panic(expected = "Reserved MSI range")]
    fn reserved_msi_range_panics() {
        let rcc = rcc();
        sim::poke(RCC::ADDRESS, CR_OFFSET, (1 << 3) | (0b1100 << 4));
        let _ = rcc.msi().frequency();
    }

    #[test]
    fn hse_descriptor() {
        let rcc = rcc();
        assert_eq!(rcc.hse().get_descriptor(), None);
        let desc = HseDescriptor {
            frequency: Hertz::MHz(8),
            bypass: true,
        };
        rcc.hse().set_descriptor(desc);
        assert_eq!(rcc.hse().get_descriptor(), Some(desc));
        assert_eq!(rcc.hse().frequency().raw(), 8_000_000);
        assert_eq!(sim::peek(RCC::ADDRESS, CR_OFFSET), 1 << 18);
    }

    #[test]
    fn hsi16_and_lse_descriptors() {
        let rcc = rcc();
        rcc.hsi16().set_descriptor(Hsi16Descriptor { trim: 70 });
        assert_eq!(rcc.hsi16().get_descriptor().trim, 70);

        let lse = LseDescriptor {
            bypass: false,
            drive: LseDrive::MediumHigh,
        };
        rcc.lse().set_descriptor(lse);
        assert_eq!(rcc.lse().get_descriptor(), lse);
    }
}
