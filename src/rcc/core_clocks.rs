//! Structure to represent frozen core clock frequencies

use crate::time::Hertz;

/// PLL output frequencies. `None` for outputs that are not enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllClocks {
    p_ck: Option<Hertz>,
    q_ck: Option<Hertz>,
    r_ck: Option<Hertz>,
}

impl PllClocks {
    /// PLL output frequencies
    pub fn new(
        p_ck: Option<Hertz>,
        q_ck: Option<Hertz>,
        r_ck: Option<Hertz>,
    ) -> Self {
        Self { p_ck, q_ck, r_ck }
    }

    /// P output
    pub fn p_ck(&self) -> Option<Hertz> {
        self.p_ck
    }

    /// Q output
    pub fn q_ck(&self) -> Option<Hertz> {
        self.q_ck
    }

    /// R output, also a candidate for `sys_ck`
    pub fn r_ck(&self) -> Option<Hertz> {
        self.r_ck
    }
}

/// Frozen core clock frequencies
///
/// The existence of this value indicates that the core clock
/// configuration can no longer be changed
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoreClocks {
    pub(super) sys_ck: Hertz,
    pub(super) hclk: Hertz,
    pub(super) pclk: Hertz,
    pub(super) ppre: u8,
    pub(super) msi_ck: Option<Hertz>,
    pub(super) hsi16_ck: Option<Hertz>,
    pub(super) hse_ck: Option<Hertz>,
    pub(super) lse_ck: Option<Hertz>,
    pub(super) lsi_ck: Option<Hertz>,
    pub(super) hsi48_ck: Option<Hertz>,
    pub(super) pll: PllClocks,
}

/// Getters for optional clocks
macro_rules! optional_ck_getter {
    ($($opt_ck:ident: $doc:expr,)+) => {
        $(
            /// Returns `Some(frequency)` if
            #[doc=$doc]
            /// is running, otherwise `None`
            pub fn $opt_ck(&self) -> Option<Hertz> {
                self.$opt_ck
            }
        )+
    };
}

impl CoreClocks {
    /// Returns the frequency of the AHB bus and the core
    pub fn hclk(&self) -> Hertz {
        self.hclk
    }

    /// Returns the frequency of the APB bus
    pub fn pclk(&self) -> Hertz {
        self.pclk
    }

    /// Returns the prescaler of the APB bus
    pub fn ppre(&self) -> u8 {
        self.ppre
    }

    /// Returns the frequency of timer kernel clocks on APB. The timers run
    /// at twice `pclk` whenever APB is divided.
    pub fn timer_ker_ck(&self) -> Hertz {
        if self.ppre == 1 {
            self.pclk
        } else {
            self.pclk * 2
        }
    }

    optional_ck_getter! {
        msi_ck: "msi_ck",
        hsi16_ck: "hsi16_ck",
        hse_ck: "hse_ck",
        lse_ck: "lse_ck",
        lsi_ck: "lsi_ck",
        hsi48_ck: "hsi48_ck",
    }

    /// Returns the PLL output frequencies
    pub fn pll(&self) -> PllClocks {
        self.pll
    }

    /// Returns the system clock frequency
    pub fn sys_ck(&self) -> Hertz {
        self.sys_ck
    }

    /// Returns the system clock frequency - ALIAS
    pub fn sysclk(&self) -> Hertz {
        self.sys_ck
    }
}
