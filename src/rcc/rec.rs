//! Peripheral Reset and Enable Control (REC)
//!
//! This module contains safe accessors to the RCC functionality for each
//! peripheral.
//!
//! At a minimum each peripheral implements
//! [ResetEnable](trait.ResetEnable.html). Peripherals that have an
//! individual clock multiplexer in CCIPR also have methods
//! `kernel_clk_mux` and `get_kernel_clk_mux`. These set and get the state
//! of the kernel clock multiplexer respectively.
//!
//! # Reset/Enable Example
//!
//! ```
//! let rcc = dp.RCC.constrain();
//! let ccdr = rcc.sys_ck(48.MHz()).freeze();
//!
//! // Enable the clock to a peripheral and reset it
//! ccdr.peripheral.USART2.enable().reset();
//! ```
//!
//! # Individual Kernel Clock Example
//! ```
//! let ccdr = ...; // Returned by `freeze()`, see example above
//!
//! // Kernel clocks may only change while the peripheral is disabled
//! let usart1_rec = ccdr.peripheral.USART1.kernel_clk_mux(UsartClkSel::Hsi16);
//!
//! assert_eq!(usart1_rec.get_kernel_clk_mux(), UsartClkSel::Hsi16);
//! ```
//!
//! # REC object
//!
//! There is a REC object for each peripheral. For example:
//!
//! ```
//! let rec_object = ccdr.peripheral.I2C1;
//! ```
//!
//! If REC object is dropped by user code, then the Reset or Enable state of
//! this peripheral cannot be modified for the lifetime of the program.
#![deny(missing_docs)]

use core::marker::PhantomData;

use tock_registers::interfaces::{ReadWriteable, Readable};

use super::Rcc;
use crate::stm32::rcc::{RegisterBlock, APB1, APB2, CCIPR, IOP};
use crate::stm32::RCC;

/// A trait for Resetting, Enabling and Disabling a single peripheral
pub trait ResetEnable {
    /// Enable this peripheral
    #[allow(clippy::return_self_not_must_use)]
    fn enable(self) -> Self;
    /// Disable this peripheral. The low-power gate is closed and any kernel
    /// clock selection returns to its reset value.
    #[allow(clippy::return_self_not_must_use)]
    fn disable(self) -> Self;
    /// Reset this peripheral
    #[allow(clippy::return_self_not_must_use)]
    fn reset(self) -> Self;
    /// Returns `true` if the bus clock of this peripheral is enabled
    fn is_enabled(&self) -> bool;
}

/// The clock gating state of a peripheral in low-power mode
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerMode {
    /// Kernel and bus interface clocks are not provided in Sleep and Stop
    /// modes.
    Off,
    /// Kernel and bus interface clocks are provided in Sleep and Stop
    /// modes.
    #[default]
    Enabled,
}

/// USART kernel clock source selection
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartClkSel {
    /// APB clock, `pclk`
    Pclk = 0b00,
    /// System clock, `sys_ck`
    Sysclk = 0b01,
    /// HSI16
    Hsi16 = 0b10,
    /// LSE
    Lse = 0b11,
}

/// I2C kernel clock source selection
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cClkSel {
    /// APB clock, `pclk`
    Pclk = 0b00,
    /// System clock, `sys_ck`
    Sysclk = 0b01,
    /// HSI16
    Hsi16 = 0b10,
}

/// Conversion between a kernel clock selection and its CCIPR encoding
trait KernelClkSel: Copy + Sized {
    fn bits(self) -> u32;
    fn from_bits(bits: u32) -> Option<Self>;
}

impl KernelClkSel for UsartClkSel {
    fn bits(self) -> u32 {
        self as u32
    }
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0b00 => Some(UsartClkSel::Pclk),
            0b01 => Some(UsartClkSel::Sysclk),
            0b10 => Some(UsartClkSel::Hsi16),
            0b11 => Some(UsartClkSel::Lse),
            _ => None,
        }
    }
}

impl KernelClkSel for I2cClkSel {
    fn bits(self) -> u32 {
        self as u32
    }
    fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            0b00 => Some(I2cClkSel::Pclk),
            0b01 => Some(I2cClkSel::Sysclk),
            0b10 => Some(I2cClkSel::Hsi16),
            _ => None,
        }
    }
}

#[inline(always)]
fn rcc() -> &'static RegisterBlock {
    // unsafe: RCC is memory mapped for the lifetime of the program
    unsafe { &*RCC::ptr() }
}

impl Rcc {
    /// Returns all the peripherals resets / enables / kernel clocks.
    ///
    /// # Use case
    ///
    /// Allows peripherals to be reset / enabled before the calling
    /// freeze. For example, the internal watchdog could be enabled to
    /// issue a reset if the call to freeze hangs waiting for an external
    /// clock that is stopped.
    ///
    /// # Safety
    ///
    /// If this method is called multiple times, or is called before the
    /// [freeze](struct.Rcc.html#freeze), then multiple accesses to the
    /// same memory exist.
    #[inline]
    pub unsafe fn steal_peripheral_rec(&self) -> PeripheralREC {
        PeripheralREC::new_singleton()
    }
}

// This macro uses the paste::item! macro to create identifiers.
//
// https://crates.io/crates/paste
macro_rules! peripheral_reset_and_enable_control {
    ($( #[ $tmeta:meta ] $GROUP:ident $enr:ident $rstr:ident $smenr:ident, $doc:expr => [
        $(
            $(($NoReset:ident))? $p:ident
                $([ kernel clk: $pk:ident $(($Variant:ident))* $sel:ident $clk_doc:expr ])*
                $([ fixed clk: $clk_doc_f:expr ])*
        ),*
    ];)+) => {
        paste::item! {
            /// Peripheral Reset and Enable Control
            #[allow(non_snake_case)]
            #[non_exhaustive]
            pub struct PeripheralREC {
                $(
                    $(
                        #[allow(missing_docs)]
                        #[ $tmeta ]
                        pub [< $p:upper >]: $p,
                    )*
                )+
            }
            impl PeripheralREC {
                /// Return a new instance of the peripheral resets /
                /// enables / kernel clocks
                ///
                /// # Safety
                ///
                /// If this method is called multiple times, then multiple
                /// accesses to the same memory exist.
                pub(super) unsafe fn new_singleton() -> PeripheralREC {
                    PeripheralREC {
                        $(
                            $(
                                #[ $tmeta ]
                                [< $p:upper >]: $p {
                                    _marker: PhantomData,
                                },
                            )*
                        )+
                    }
                }
            }
            $(
                $(
                    #[ $tmeta ]
                    peripheral_reset_and_enable_control_generator! (
                        $GROUP $enr $rstr $smenr,
                        $(($NoReset))* $p, [< $p:upper >],
                        $(
                            [kernel clk: $pk $(($Variant))* $sel $clk_doc]
                        )*
                        $(
                            [fixed clk: $clk_doc_f]
                        )*
                    );
                )*
            )+
        }
    }
}

macro_rules! peripheral_reset_function_behavior {
    (
        $GROUP:ident $rstr:ident,
        $p_upper:ident
    ) => {
        critical_section::with(|_| {
            rcc().$rstr.modify($GROUP::$p_upper::SET);
            rcc().$rstr.modify($GROUP::$p_upper::CLEAR);
        });
    };
    (
        $GROUP:ident $rstr:ident,
        $NoReset:ident $p_upper:ident
    ) => {};
}

// The macro is intended only to be called from within the
// peripheral_reset_and_enable_control macro
macro_rules! peripheral_reset_and_enable_control_generator {
    (
        $GROUP:ident $enr:ident $rstr:ident $smenr:ident,
        $(($NoReset:ident))? $p:ident,
        $p_upper:ident,
        $([ kernel clk: $pk:ident $(($Variant:ident))* $sel:ident $clk_doc:expr ])*
        $([ fixed clk: $clk_doc_f:expr ])*
    ) => {
        paste::item! {
            #[doc = " Reset, Enable and Clock functionality for " $p]
            ///
            /// ```
            /// let ccdr = ...; // From RCC
            ///
            /// // Enable the clock to the peripheral and reset it
            #[doc = "ccdr.peripheral." $p_upper ".enable().reset();"]
            /// ```
            $(
                ///
                /// # Kernel Clock
                ///
                #[doc = "Selected by " $clk_doc ", see [" $pk "ClkSel](crate::rcc::rec::" $pk "ClkSel)."]
            )*
            $(
                ///
                /// # Fixed Kernel Clock
                ///
                /// This peripheral has a kernel clock that is always equal to
                #[doc = $clk_doc_f "."]
            )*
            pub struct $p {
                pub(crate) _marker: PhantomData<*const ()>,
            }
            impl $p {
                /// Set Low Power Mode for peripheral
                #[allow(clippy::return_self_not_must_use)]
                pub fn low_power(self, lpm: LowPowerMode) -> Self {
                    let smen = match lpm {
                        LowPowerMode::Off => $GROUP::$p_upper::CLEAR,
                        LowPowerMode::Enabled => $GROUP::$p_upper::SET,
                    };
                    critical_section::with(|_| rcc().$smenr.modify(smen));
                    self
                }

                /// Low Power Mode currently set for this peripheral
                pub fn get_low_power(&self) -> LowPowerMode {
                    if rcc().$smenr.is_set($GROUP::$p_upper) {
                        LowPowerMode::Enabled
                    } else {
                        LowPowerMode::Off
                    }
                }
            }
            unsafe impl Send for $p {}
            impl ResetEnable for $p {
                #[inline(always)]
                fn enable(self) -> Self {
                    critical_section::with(|_| {
                        rcc().$enr.modify($GROUP::$p_upper::SET)
                    });
                    self
                }
                #[inline(always)]
                fn disable(self) -> Self {
                    critical_section::with(|_| {
                        rcc().$enr.modify($GROUP::$p_upper::CLEAR);
                        rcc().$smenr.modify($GROUP::$p_upper::CLEAR);
                        $(
                            rcc().ccipr.modify(CCIPR::$sel::CLEAR);
                        )*
                    });
                    self
                }
                #[inline(always)]
                fn reset(self) -> Self {
                    peripheral_reset_function_behavior!($GROUP $rstr, $($NoReset)? $p_upper);
                    self
                }
                #[inline(always)]
                fn is_enabled(&self) -> bool {
                    rcc().$enr.is_set($GROUP::$p_upper)
                }
            }
            $(
                impl $p {
                    /// Modify the kernel clock for
                    #[doc = $clk_doc "."]
                    ///
                    /// # Panics
                    ///
                    /// Panics if the peripheral is enabled.
                    #[allow(clippy::return_self_not_must_use)]
                    pub fn kernel_clk_mux(self, sel: [< $pk ClkSel >]) -> Self {
                        assert!(
                            !self.is_enabled(),
                            concat!("Kernel clock of ", stringify!($p_upper), " cannot change while it is enabled")
                        );
                        critical_section::with(|_| {
                            rcc().ccipr.modify(CCIPR::$sel.val(sel.bits()))
                        });
                        self
                    }

                    /// Return the current kernel clock selection
                    #[inline(always)]
                    pub fn get_kernel_clk_mux(&self) ->
                        variant_return_type!([< $pk ClkSel >] $(, $Variant)*)
                    {
                        let bits = rcc().ccipr.read(CCIPR::$sel);
                        variant_return_value!([< $pk ClkSel >], bits $(, $Variant)*)
                    }

                    /// Returns `true` if `sel` drives the kernel clock
                    pub fn is_kernel_clk_selected(&self, sel: [< $pk ClkSel >]) -> bool {
                        rcc().ccipr.read(CCIPR::$sel) == sel.bits()
                    }

                    /// Set the low-power gate and the kernel clock, then
                    /// enable the peripheral
                    #[allow(clippy::return_self_not_must_use)]
                    pub fn enable_with(self, lpm: LowPowerMode, sel: [< $pk ClkSel >]) -> Self {
                        self.low_power(lpm).kernel_clk_mux(sel).enable()
                    }
                }
            )*
        }
    }
}

// If a CCIPR field does not use all of its encodings, then we use a
// different return type
macro_rules! variant_return_type {
    ($t:ty) => { $t };
    ($t:ty, $Variant: ident) => {
        Option<$t>
    };
}

macro_rules! variant_return_value {
    ($t:ty, $bits:expr) => {
        match <$t>::from_bits($bits) {
            Some(sel) => sel,
            None => unreachable!(),
        }
    };
    ($t:ty, $bits:expr, $Variant: ident) => {
        <$t>::from_bits($bits)
    };
}

// Enumerate all peripherals and optional clock multiplexers
//
// Peripherals are grouped by bus for convenience. Each bus is specified like:
// #[attribute] GROUP enable reset sleep, "description" => [..];
//
// The attribute is mandatory for the bus grouping, but can just be
// #[cfg(all())]. The description is not used. Each bus grouping can be repeated
// multiple times if needed.
peripheral_reset_and_enable_control! {

    #[cfg(all())]
    IOP iopenr ioprstr iopsmenr, "I/O port peripherals" => [
        Gpioa,
        Gpiob,
        Gpioc,
        Gpiod,
        Gpiof
    ];
    #[cfg(feature = "gpio-u0x3")]
    IOP iopenr ioprstr iopsmenr, "" => [
        Gpioe
    ];

    #[cfg(all())]
    APB1 apbenr1 apbrstr1 apbsmenr1, "Advanced Peripheral Bus 1 peripherals" => [
        Usart2 [kernel clk: Usart USART2SEL "USART2SEL"],
        I2c1 [kernel clk: I2c(Variant) I2C1SEL "I2C1SEL"],
        I2c2 [fixed clk: "pclk"],
        Pwr,
        (NoReset) RtcApb
    ];
    #[cfg(feature = "u0x3")]
    APB1 apbenr1 apbrstr1 apbsmenr1, "" => [
        Usart3 [fixed clk: "pclk"],
        Usart4 [fixed clk: "pclk"],
        I2c3 [kernel clk: I2c(Variant) I2C3SEL "I2C3SEL"]
    ];

    #[cfg(all())]
    APB2 apbenr2 apbrstr2 apbsmenr2, "Advanced Peripheral Bus 2 peripherals" => [
        Usart1 [kernel clk: Usart USART1SEL "USART1SEL"],
        Syscfg
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stm32::sim;

    const APBENR1: usize = 0x58;
    const APBSMENR1: usize = 0x78;
    const APBRSTR1: usize = 0x38;
    const IOPENR: usize = 0x4C;
    const CCIPR_OFFSET: usize = 0x88;

    fn rec() -> PeripheralREC {
        unsafe { PeripheralREC::new_singleton() }
    }

    #[test]
    fn enable_sets_only_its_gate() {
        let rec = rec();
        sim::poke(RCC::ADDRESS, APBENR1, 1 << 28);
        let usart2 = rec.USART2.enable();
        assert!(usart2.is_enabled());
        assert_eq!(sim::peek(RCC::ADDRESS, APBENR1), (1 << 28) | (1 << 17));

        rec.GPIOC.enable();
        assert_eq!(sim::peek(RCC::ADDRESS, IOPENR), 1 << 2);
    }

    #[test]
    fn kernel_clock_encoding() {
        let rec = rec();
        let usart1 = rec.USART1;
        let usart2 = rec.USART2;

        let usart1 = usart1.kernel_clk_mux(UsartClkSel::Sysclk);
        assert_eq!(sim::peek(RCC::ADDRESS, CCIPR_OFFSET), 0b01);
        let usart1 = usart1.kernel_clk_mux(UsartClkSel::Hsi16);
        assert_eq!(sim::peek(RCC::ADDRESS, CCIPR_OFFSET), 0b10);
        let usart1 = usart1.kernel_clk_mux(UsartClkSel::Lse);
        assert_eq!(sim::peek(RCC::ADDRESS, CCIPR_OFFSET), 0b11);
        assert_eq!(usart1.get_kernel_clk_mux(), UsartClkSel::Lse);

        let usart2 = usart2.kernel_clk_mux(UsartClkSel::Hsi16);
        assert_eq!(sim::peek(RCC::ADDRESS, CCIPR_OFFSET), 0b1011);
        assert!(usart2.is_kernel_clk_selected(UsartClkSel::Hsi16));
        assert!(!usart2.is_kernel_clk_selected(UsartClkSel::Pclk));
    }

    #[test]
    fn enable_with_then_disable_clears_everything() {
        let rec = rec();
        sim::poke(RCC::ADDRESS, APBSMENR1, 0);
        let usart2 =
            rec.USART2.enable_with(LowPowerMode::Enabled, UsartClkSel::Lse);
        assert!(usart2.is_enabled());
        assert_eq!(usart2.get_low_power(), LowPowerMode::Enabled);
        assert_eq!(sim::peek(RCC::ADDRESS, CCIPR_OFFSET), 0b11 << 2);

        let usart2 = usart2.disable();
        assert!(!usart2.is_enabled());
        assert_eq!(usart2.get_low_power(), LowPowerMode::Off);
        assert_eq!(usart2.get_kernel_clk_mux(), UsartClkSel::Pclk);
        assert_eq!(sim::peek(RCC::ADDRESS, CCIPR_OFFSET), 0);
    }

    #[test]
    #[should_panic(expected = "Kernel clock of USART1 cannot change while it is enabled")]
    fn kernel_clock_locked_while_enabled() {
        let usart1 = rec().USART1.enable();
        let _ = usart1.kernel_clk_mux(UsartClkSel::Hsi16);
    }

    #[test]
    fn i2c_reserved_selection() {
        let rec = rec();
        assert_eq!(rec.I2C1.get_kernel_clk_mux(), Some(I2cClkSel::Pclk));
        sim::poke(RCC::ADDRESS, CCIPR_OFFSET, 0b11 << 12);
        assert_eq!(rec.I2C1.get_kernel_clk_mux(), None);
    }

    #[test]
    fn reset_leaves_peripheral_out_of_reset() {
        let rec = rec();
        sim::poke(RCC::ADDRESS, APBRSTR1, 1 << 22);
        rec.I2C1.reset();
        assert_eq!(sim::peek(RCC::ADDRESS, APBRSTR1), 1 << 22);
    }
}
