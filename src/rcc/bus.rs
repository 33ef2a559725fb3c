//! AHB and APB bus prescalers
//!
//! HPRE and PPRE encode their division factor with the top bit as an enable
//! flag: any value below `0b1000` (resp. `0b100`) means "not divided". The
//! raw field is turned into an index into a table of right shifts, so the
//! bus frequency is the parent frequency shifted right.

use tock_registers::interfaces::{ReadWriteable, Readable};

use super::Rcc;
use crate::stm32::rcc::CFGR;
use crate::time::Hertz;

/// AHB prescaler, `hclk = sys_ck / n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum HclkPrescaler {
    Div1 = 0b0000,
    Div2 = 0b1000,
    Div4 = 0b1001,
    Div8 = 0b1010,
    Div16 = 0b1011,
    Div64 = 0b1100,
    Div128 = 0b1101,
    Div256 = 0b1110,
    Div512 = 0b1111,
}

/// APB prescaler, `pclk = hclk / n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum PclkPrescaler {
    Div1 = 0b000,
    Div2 = 0b100,
    Div4 = 0b101,
    Div8 = 0b110,
    Div16 = 0b111,
}

/// Bus prescaler, as programmed in a CFGR field
pub trait Prescaler: Copy + 'static {
    /// Raw values below or equal to this do not divide
    const UNDIVIDED: u32;
    /// Right shift applied to the parent clock, by table index
    const SHIFTS: &'static [u8];
    /// Prescalers by table index
    const ALL: &'static [Self];

    /// Register encoding
    fn bits(self) -> u32;

    /// Table index of a raw register value
    fn index(bits: u32) -> usize {
        bits.saturating_sub(Self::UNDIVIDED) as usize
    }

    /// Decode a raw register value
    fn from_bits(bits: u32) -> Self {
        Self::ALL[Self::index(bits)]
    }

    /// Right shift applied to the parent clock
    fn shift(self) -> u8 {
        Self::SHIFTS[Self::index(self.bits())]
    }

    /// Division factor
    fn divisor(self) -> u32 {
        1 << self.shift()
    }
}

impl Prescaler for HclkPrescaler {
    const UNDIVIDED: u32 = 0b0111;
    const SHIFTS: &'static [u8] = &[0, 1, 2, 3, 4, 6, 7, 8, 9];
    const ALL: &'static [Self] = &[
        HclkPrescaler::Div1,
        HclkPrescaler::Div2,
        HclkPrescaler::Div4,
        HclkPrescaler::Div8,
        HclkPrescaler::Div16,
        HclkPrescaler::Div64,
        HclkPrescaler::Div128,
        HclkPrescaler::Div256,
        HclkPrescaler::Div512,
    ];

    fn bits(self) -> u32 {
        self as u32
    }
}

impl Prescaler for PclkPrescaler {
    const UNDIVIDED: u32 = 0b011;
    const SHIFTS: &'static [u8] = &[0, 1, 2, 3, 4];
    const ALL: &'static [Self] = &[
        PclkPrescaler::Div1,
        PclkPrescaler::Div2,
        PclkPrescaler::Div4,
        PclkPrescaler::Div8,
        PclkPrescaler::Div16,
    ];

    fn bits(self) -> u32 {
        self as u32
    }
}

impl HclkPrescaler {
    /// Smallest prescaler that brings `sys_ck` down to at most `hclk`
    pub fn at_most(sys_ck: u32, hclk: u32) -> Self {
        match sys_ck.div_ceil(hclk) {
            0 => unreachable!(),
            1 => HclkPrescaler::Div1,
            2 => HclkPrescaler::Div2,
            3..=4 => HclkPrescaler::Div4,
            5..=8 => HclkPrescaler::Div8,
            9..=16 => HclkPrescaler::Div16,
            17..=64 => HclkPrescaler::Div64,
            65..=128 => HclkPrescaler::Div128,
            129..=256 => HclkPrescaler::Div256,
            _ => HclkPrescaler::Div512,
        }
    }
}

impl PclkPrescaler {
    /// Smallest prescaler that brings `hclk` down to at most `pclk`
    pub fn at_most(hclk: u32, pclk: u32) -> Self {
        match hclk.div_ceil(pclk) {
            0 => unreachable!(),
            1 => PclkPrescaler::Div1,
            2 => PclkPrescaler::Div2,
            3..=4 => PclkPrescaler::Div4,
            5..=8 => PclkPrescaler::Div8,
            _ => PclkPrescaler::Div16,
        }
    }
}

/// Bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Descriptor<P> {
    /// Division from the parent clock
    pub prescaler: P,
}

/// AHB clock, `hclk`
pub struct Hclk<'a> {
    rcc: &'a Rcc,
}

/// APB clock, `pclk`
pub struct Pclk<'a> {
    rcc: &'a Rcc,
}

impl<'a> Hclk<'a> {
    pub(super) fn new(rcc: &'a Rcc) -> Self {
        Self { rcc }
    }

    /// Program the AHB prescaler
    pub fn set_descriptor(&self, desc: Descriptor<HclkPrescaler>) {
        critical_section::with(|_| {
            self.rcc.rb.cfgr.modify(CFGR::HPRE.val(desc.prescaler.bits()))
        });
    }

    /// Read back the AHB prescaler
    pub fn get_descriptor(&self) -> Descriptor<HclkPrescaler> {
        Descriptor {
            prescaler: HclkPrescaler::from_bits(
                self.rcc.rb.cfgr.read(CFGR::HPRE),
            ),
        }
    }

    /// `hclk` frequency, `sys_ck` shifted by the prescaler
    pub fn frequency(&self) -> Hertz {
        let shift = self.get_descriptor().prescaler.shift();
        Hertz::from_raw(self.rcc.sysclk().frequency().raw() >> shift)
    }
}

impl<'a> Pclk<'a> {
    pub(super) fn new(rcc: &'a Rcc) -> Self {
        Self { rcc }
    }

    /// Program the APB prescaler
    pub fn set_descriptor(&self, desc: Descriptor<PclkPrescaler>) {
        critical_section::with(|_| {
            self.rcc.rb.cfgr.modify(CFGR::PPRE.val(desc.prescaler.bits()))
        });
    }

    /// Read back the APB prescaler
    pub fn get_descriptor(&self) -> Descriptor<PclkPrescaler> {
        Descriptor {
            prescaler: PclkPrescaler::from_bits(
                self.rcc.rb.cfgr.read(CFGR::PPRE),
            ),
        }
    }

    /// `pclk` frequency, `hclk` shifted by the prescaler
    pub fn frequency(&self) -> Hertz {
        let shift = self.get_descriptor().prescaler.shift();
        Hertz::from_raw(self.rcc.ahb().frequency().raw() >> shift)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rcc::RccExt;
    use crate::stm32::{sim, RCC};

    const CFGR_OFFSET: usize = 0x08;

    fn rcc() -> Rcc {
        unsafe { RCC::steal() }.constrain()
    }

    #[test]
    fn undivided_encodings_share_the_first_slot() {
        for bits in 0..=0b0111 {
            assert_eq!(HclkPrescaler::from_bits(bits), HclkPrescaler::Div1);
        }
        for bits in 0..=0b011 {
            assert_eq!(PclkPrescaler::from_bits(bits), PclkPrescaler::Div1);
        }
    }

    #[test]
    fn hclk_skips_divide_by_32() {
        let divisors: Vec<u32> =
            HclkPrescaler::ALL.iter().map(|p| p.divisor()).collect();
        assert_eq!(divisors, [1, 2, 4, 8, 16, 64, 128, 256, 512]);
    }

    #[test]
    fn at_most_never_overshoots() {
        assert_eq!(HclkPrescaler::at_most(48_000_000, 48_000_000), HclkPrescaler::Div1);
        assert_eq!(HclkPrescaler::at_most(48_000_000, 16_000_000), HclkPrescaler::Div4);
        assert_eq!(HclkPrescaler::at_most(48_000_000, 1_000_000), HclkPrescaler::Div64);
        assert_eq!(PclkPrescaler::at_most(48_000_000, 20_000_000), PclkPrescaler::Div4);
        assert_eq!(PclkPrescaler::at_most(48_000_000, 1), PclkPrescaler::Div16);
    }

    #[test]
    fn descriptor_round_trip() {
        let rcc = rcc();
        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0b001);
        rcc.ahb().set_descriptor(Descriptor {
            prescaler: HclkPrescaler::Div64,
        });
        rcc.apb().set_descriptor(Descriptor {
            prescaler: PclkPrescaler::Div2,
        });
        assert_eq!(
            sim::peek(RCC::ADDRESS, CFGR_OFFSET),
            0b001 | (0b1100 << 8) | (0b100 << 12)
        );
        assert_eq!(rcc.ahb().get_descriptor().prescaler, HclkPrescaler::Div64);
        assert_eq!(rcc.apb().get_descriptor().prescaler, PclkPrescaler::Div2);
    }

    #[test]
    fn frequencies_cascade_from_sys_ck() {
        let rcc = rcc();
        // sys_ck from HSI16, HPRE /4, PPRE /2
        sim::poke(
            RCC::ADDRESS,
            CFGR_OFFSET,
            (0b001 << 3) | (0b1001 << 8) | (0b100 << 12),
        );
        assert_eq!(rcc.ahb().frequency().raw(), 4_000_000);
        assert_eq!(rcc.apb().frequency().raw(), 2_000_000);
    }

    #[test]
    fn every_prescaler_pair_round_trips_and_shifts() {
        let rcc = rcc();
        // sys_ck from HSI16
        sim::poke(RCC::ADDRESS, CFGR_OFFSET, 0b001 << 3);
        let sys_ck = rcc.sysclk().frequency().raw();
        assert_eq!(sys_ck, 16_000_000);

        for &hpre in HclkPrescaler::ALL {
            for &ppre in PclkPrescaler::ALL {
                let ahb = Descriptor { prescaler: hpre };
                let apb = Descriptor { prescaler: ppre };
                rcc.ahb().set_descriptor(ahb);
                rcc.apb().set_descriptor(apb);

                assert_eq!(rcc.ahb().get_descriptor(), ahb);
                assert_eq!(rcc.apb().get_descriptor(), apb);

                let hclk = rcc.ahb().frequency().raw();
                assert_eq!(hclk, sys_ck >> hpre.shift());
                assert_eq!(hclk, sys_ck / hpre.divisor());
                assert_eq!(rcc.apb().frequency().raw(), hclk >> ppre.shift());
            }
        }
    }
}
