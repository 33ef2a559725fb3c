//! Phase Locked Loop Configuration

use core::ops::RangeInclusive;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use super::osc::{Oscillator, HSI16};
use super::Rcc;
use crate::stm32::rcc::{CR, PLLCFGR};
use crate::time::Hertz;

const PLL_M_MAX: u8 = 8;
const PLL_N: RangeInclusive<u8> = 4..=127;
const PLL_P: RangeInclusive<u8> = 2..=32;
const PLL_Q: RangeInclusive<u8> = 2..=8;
const PLL_R: RangeInclusive<u8> = 2..=8;

/// Reference clock after the M divider
const VCO_INPUT: RangeInclusive<u32> = 2_660_000..=16_000_000;
/// VCO output before the P, Q and R dividers
const VCO_OUTPUT: RangeInclusive<u32> = 96_000_000..=344_000_000;

/// PLL reference clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllSource {
    /// MSI at its current range
    Msi,
    /// HSI16
    Hsi16,
    /// HSE at its configured frequency
    Hse,
}

/// Divider settings of the PLL
///
/// All values are the actual division or multiplication factors, not their
/// register encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllDescriptor {
    /// Reference clock
    pub source: PllSource,
    /// Input divider, 1..=8
    pub m: u8,
    /// VCO multiplier, 4..=127
    pub n: u8,
    /// R output divider feeding the system clock, 2..=8
    pub r: u8,
    /// P output divider, 2..=32, if the P output is enabled
    pub p: Option<u8>,
    /// Q output divider, 2..=8, if the Q output is enabled
    pub q: Option<u8>,
}

impl PllDescriptor {
    /// VCO frequency for a given reference clock
    pub fn vco_frequency(&self, ref_ck: Hertz) -> Hertz {
        let vco = u64::from(ref_ck.raw()) * u64::from(self.n)
            / u64::from(self.m);
        Hertz::from_raw(vco as u32)
    }

    /// R output frequency for a given reference clock
    pub fn r_frequency(&self, ref_ck: Hertz) -> Hertz {
        self.vco_frequency(ref_ck) / u32::from(self.r)
    }

    /// P output frequency for a given reference clock
    pub fn p_frequency(&self, ref_ck: Hertz) -> Option<Hertz> {
        self.p.map(|p| self.vco_frequency(ref_ck) / u32::from(p))
    }

    /// Q output frequency for a given reference clock
    pub fn q_frequency(&self, ref_ck: Hertz) -> Option<Hertz> {
        self.q.map(|q| self.vco_frequency(ref_ck) / u32::from(q))
    }

    /// Search for dividers that produce `target` on the R output.
    ///
    /// An exact match is preferred. Otherwise the fastest setting that does
    /// not exceed `target` is returned, so the PLL never runs faster than
    /// requested. Returns `None` if no setting respects the VCO limits.
    pub fn for_target(
        source: PllSource,
        ref_ck: Hertz,
        target: Hertz,
    ) -> Option<Self> {
        let ref_ck = u64::from(ref_ck.raw());
        let target = u64::from(target.raw());
        let mut best: Option<(u64, Self)> = None;

        for m in 1..=PLL_M_MAX {
            let input = ref_ck / u64::from(m);
            if !VCO_INPUT.contains(&(input as u32)) {
                continue;
            }
            for r in PLL_R {
                // Round down, never faster than requested
                let n = target * u64::from(r) * u64::from(m) / ref_ck;
                if n > u64::from(*PLL_N.end()) || n < u64::from(*PLL_N.start())
                {
                    continue;
                }
                let vco = ref_ck * n / u64::from(m);
                if !VCO_OUTPUT.contains(&(vco as u32)) {
                    continue;
                }

                let output = vco / u64::from(r);
                let desc = PllDescriptor {
                    source,
                    m,
                    n: n as u8,
                    r,
                    p: None,
                    q: None,
                };
                if output == target {
                    return Some(desc);
                }
                if best.map_or(true, |(ck, _)| output > ck) {
                    best = Some((output, desc));
                }
            }
        }

        best.map(|(_, desc)| desc)
    }
}

oscillator!(
    /// Main PLL
    Pll: "PLL", cr, CR::[PLLON, PLLRDY]
);

impl Pll<'_> {
    fn current_frequency(&self) -> Hertz {
        match self.get_descriptor() {
            Some(desc) => desc.r_frequency(self.source_frequency(desc.source)),
            None => Hertz::from_raw(0),
        }
    }

    /// Frequency of the reference clock `source`
    pub fn source_frequency(&self, source: PllSource) -> Hertz {
        match source {
            PllSource::Msi => self.rcc.msi().frequency(),
            PllSource::Hsi16 => HSI16,
            PllSource::Hse => self.rcc.hse().frequency(),
        }
    }

    /// Program the PLL dividers. The R output is always enabled.
    ///
    /// # Panics
    ///
    /// Panics if the PLL is enabled or any divider is out of range.
    pub fn set_descriptor(&self, desc: PllDescriptor) {
        assert!(
            !self.is_enabled(),
            "PLL must be disabled to change its configuration"
        );
        assert!(
            (1..=PLL_M_MAX).contains(&desc.m),
            "PLL M divider out of range: {}",
            desc.m
        );
        assert!(
            PLL_N.contains(&desc.n),
            "PLL N multiplier out of range: {}",
            desc.n
        );
        assert!(
            PLL_R.contains(&desc.r),
            "PLL R divider out of range: {}",
            desc.r
        );
        if let Some(p) = desc.p {
            assert!(PLL_P.contains(&p), "PLL P divider out of range: {p}");
        }
        if let Some(q) = desc.q {
            assert!(PLL_Q.contains(&q), "PLL Q divider out of range: {q}");
        }

        let source = match desc.source {
            PllSource::Msi => PLLCFGR::PLLSRC::Msi,
            PllSource::Hsi16 => PLLCFGR::PLLSRC::Hsi16,
            PllSource::Hse => PLLCFGR::PLLSRC::Hse,
        };
        let p = match desc.p {
            Some(p) => PLLCFGR::PLLPEN::SET + PLLCFGR::PLLP.val(u32::from(p - 1)),
            None => PLLCFGR::PLLPEN::CLEAR,
        };
        let q = match desc.q {
            Some(q) => PLLCFGR::PLLQEN::SET + PLLCFGR::PLLQ.val(u32::from(q - 1)),
            None => PLLCFGR::PLLQEN::CLEAR,
        };

        self.rcc.rb.pllcfgr.write(
            source
                + PLLCFGR::PLLM.val(u32::from(desc.m - 1))
                + PLLCFGR::PLLN.val(u32::from(desc.n))
                + PLLCFGR::PLLREN::SET
                + PLLCFGR::PLLR.val(u32::from(desc.r - 1))
                + p
                + q,
        );
    }

    /// Read back the PLL dividers. `None` if no reference clock is selected.
    pub fn get_descriptor(&self) -> Option<PllDescriptor> {
        let pllcfgr = &self.rcc.rb.pllcfgr;
        let source = match pllcfgr.read_as_enum(PLLCFGR::PLLSRC) {
            Some(PLLCFGR::PLLSRC::Value::Msi) => PllSource::Msi,
            Some(PLLCFGR::PLLSRC::Value::Hsi16) => PllSource::Hsi16,
            Some(PLLCFGR::PLLSRC::Value::Hse) => PllSource::Hse,
            _ => return None,
        };
        let m = pllcfgr.read(PLLCFGR::PLLM) as u8 + 1;
        let n = pllcfgr.read(PLLCFGR::PLLN) as u8;
        let r = pllcfgr.read(PLLCFGR::PLLR) as u8 + 1;
        let p = pllcfgr
            .is_set(PLLCFGR::PLLPEN)
            .then(|| pllcfgr.read(PLLCFGR::PLLP) as u8 + 1);
        let q = pllcfgr
            .is_set(PLLCFGR::PLLQEN)
            .then(|| pllcfgr.read(PLLCFGR::PLLQ) as u8 + 1);

        Some(PllDescriptor {
            source,
            m,
            n,
            r,
            p,
            q,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rcc::RccExt;
    use crate::stm32::{sim, RCC};

    const PLLCFGR_OFFSET: usize = 0x0C;

    fn check_search(source: PllSource, ref_ck: Hertz, target: Hertz) {
        let desc = PllDescriptor::for_target(source, ref_ck, target)
            .expect("No PLL setting found");
        let input = ref_ck.raw() / u32::from(desc.m);
        let vco = desc.vco_frequency(ref_ck).raw();
        println!(
            "{} MHz -> {} MHz: M={} N={} R={} VCO={} MHz",
            ref_ck.raw() as f32 / 1e6,
            target.raw() as f32 / 1e6,
            desc.m,
            desc.n,
            desc.r,
            vco as f32 / 1e6
        );
        assert!(VCO_INPUT.contains(&input));
        assert!(VCO_OUTPUT.contains(&vco));
        assert!(desc.r_frequency(ref_ck) <= target);
    }

    #[test]
    fn search_exact_targets() {
        let cases = [
            (PllSource::Hsi16, Hertz::MHz(16), Hertz::MHz(56)),
            (PllSource::Hsi16, Hertz::MHz(16), Hertz::MHz(48)),
            (PllSource::Hse, Hertz::MHz(8), Hertz::MHz(32)),
            (PllSource::Msi, Hertz::MHz(4), Hertz::MHz(24)),
        ];
        for (source, ref_ck, target) in cases {
            check_search(source, ref_ck, target);
            let desc =
                PllDescriptor::for_target(source, ref_ck, target).unwrap();
            assert_eq!(desc.r_frequency(ref_ck), target);
        }
    }

    #[test]
    fn search_rounds_down() {
        let ref_ck = Hertz::MHz(12);
        let target = Hertz::from_raw(50_000_001);
        check_search(PllSource::Hse, ref_ck, target);
    }

    #[test]
    fn search_respects_vco_limits() {
        // 100 kHz is below the minimum VCO input whatever M is
        assert_eq!(
            PllDescriptor::for_target(PllSource::Msi, Hertz::kHz(100), Hertz::MHz(48)),
            None
        );
    }

    #[test]
    fn descriptor_encoding() {
        let rcc = unsafe { RCC::steal() }.constrain();
        let desc = PllDescriptor {
            source: PllSource::Hsi16,
            m: 1,
            n: 7,
            r: 2,
            p: None,
            q: Some(4),
        };
        rcc.pll().set_descriptor(desc);

        let expected = 0b10 | (7 << 8) | (1 << 24) | (3 << 25) | (1 << 28) | (1 << 29);
        assert_eq!(sim::peek(RCC::ADDRESS, PLLCFGR_OFFSET), expected);
        assert_eq!(rcc.pll().get_descriptor(), Some(desc));
        assert_eq!(rcc.pll().frequency().raw(), 56_000_000);
    }

    #[test]
    fn frequency_is_zero_without_source() {
        let rcc = unsafe { RCC::steal() }.constrain();
        assert_eq!(rcc.pll().get_descriptor(), None);
        assert_eq!(rcc.pll().frequency().raw(), 0);
    }

    #[test]
    #[should_panic(expected = "PLL must be disabled to change its configuration")]
    fn descriptor_locked_while_enabled() {
        let rcc = unsafe { RCC::steal() }.constrain();
        rcc.pll().enable();
        rcc.pll().set_descriptor(PllDescriptor {
            source: PllSource::Hsi16,
            m: 1,
            n: 6,
            r: 2,
            p: None,
            q: None,
        });
    }
}
