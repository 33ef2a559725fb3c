//! Inter Integrated Circuit (I2C)
//!
//! This module provides I2C functionality as a Controller. The bus speed and
//! noise filters are described by a [`Descriptor`], which can be changed at
//! runtime with [`I2c::set_descriptor`] and read back with
//! [`I2c::get_descriptor`].
//!
//! # Terminology
//! This uses the updated Controller/Target terminology that replaces Master/Slave, as of v7 of the
//! I2C Spec. See https://www.nxp.com/docs/en/user-guide/UM10204.pdf
//!
//! # Usage
//!
//! In the simplest case, the I2C can be initialized from the device peripheral
//! and GPIO pins:
//!
//! ```
//! let dp = ...;            // Device peripherals
//! let (scl, sda) = ...;    // GPIO pins
//!
//! let mut i2c = dp.I2C1.i2c((scl, sda), Mode::Fast, ccdr.peripheral.I2C1, &ccdr.clocks);
//! ```
//!
//! The GPIO pins should be supplied as a tuple in the following order:
//!
//! - Clock (SCL)
//! - Data (SDA)
//!
//! The driver exposes the controller functionality via the embedded-hal I2C
//! traits:
//!
//! ```
//! use embedded_hal::i2c::I2c;
//!
//! // Write only
//! let write = [0x11, 0x22, 0x33];
//! i2c.write(0x18, &write)?;
//!
//! // Read only
//! let mut read = [0u8; 4];
//! i2c.read(0x18, &mut read)?;
//!
//! // Write, repeat start, read
//! let write = [0x02];
//! let mut read = [0u8; 4];
//! i2c.write_read(0x18, &write, &mut read)?;
//! ```
//!
//! The kernel clock is selected in RCC (see
//! [`I2cClkSel`](crate::rcc::I2cClkSel)) before the driver is created.

use core::ops::Deref;

use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::LocalRegisterCopy;

#[cfg(feature = "log")]
use log::debug;

use crate::rcc::{CoreClocks, ResetEnable};
use crate::stm32::i2c::{self as regs, CR1, CR2, ICR, ISR, TIMINGR};
use crate::time::Hertz;

pub mod config;
pub use config::{Descriptor, Mode};

mod hal;
mod i2c_def;

type Isr = LocalRegisterCopy<u32, ISR::Register>;

/// I2C Stop Configuration
///
/// Peripheral options for generating the STOP condition
#[derive(Copy, Clone, PartialEq, Eq)]
enum Stop {
    /// A repeat start condition will be generated at the end of the current
    /// operation.
    RepeatStart,
    /// A STOP condition is automatically generated once the configured number
    /// of bytes have been transferred
    Automatic,
    /// The next operation continues this one without a new start condition
    /// (it must be the same type of operation).
    Reload,
}

/// Direction of transfer
#[derive(Copy, Clone, PartialEq, Eq)]
enum Direction {
    Read,
    Write,
}

/// Addressing mode
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum AddressMode {
    /// 7-bit addressing mode
    AddressMode7bit,
    /// 10-bit addressing mode
    AddressMode10bit,
}

/// I2C error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Bus error
    Bus,
    /// Arbitration loss
    Arbitration,
    /// NACK received
    NotAcknowledge,
}

/// A trait to represent the SCL Pin of an I2C Port
pub trait PinScl<I2C> {}

/// A trait to represent the SDA Pin of an I2C Port
pub trait PinSda<I2C> {}

/// A trait to represent the collection of pins required for an I2C port
pub trait Pins<I2C> {}

impl<I2C, SCL, SDA> Pins<I2C> for (SCL, SDA)
where
    SCL: PinScl<I2C>,
    SDA: PinSda<I2C>,
{
}

pub trait Instance:
    crate::Sealed + Deref<Target = regs::RegisterBlock>
{
    type Rec: ResetEnable;

    #[doc(hidden)]
    fn ptr() -> *const regs::RegisterBlock;

    /// Kernel clock, `None` when the selected source is not running
    #[doc(hidden)]
    fn clock(clocks: &CoreClocks) -> Option<Hertz>;

    #[doc(hidden)]
    fn rec() -> Self::Rec;
}

/// I2C controller
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2c<I2C> {
    i2c: I2C,
    ker_ck: Hertz,
}

pub trait I2cExt<I2C: Instance>: Sized {
    /// Create a I2c instance that is capable of Controller operation
    fn i2c<P: Pins<I2C>>(
        self,
        _pins: P,
        descriptor: impl Into<Descriptor>,
        rec: I2C::Rec,
        clocks: &CoreClocks,
    ) -> I2c<I2C>;

    /// Create a I2c instance that is capable of Controller operation.
    /// This will not check that the pins are properly configured.
    fn i2c_unchecked(
        self,
        descriptor: impl Into<Descriptor>,
        rec: I2C::Rec,
        clocks: &CoreClocks,
    ) -> I2c<I2C>;
}

impl<I2C: Instance> I2cExt<I2C> for I2C {
    fn i2c<P: Pins<I2C>>(
        self,
        _pins: P,
        descriptor: impl Into<Descriptor>,
        rec: I2C::Rec,
        clocks: &CoreClocks,
    ) -> I2c<I2C> {
        I2c::new(self, descriptor, rec, clocks)
    }

    fn i2c_unchecked(
        self,
        descriptor: impl Into<Descriptor>,
        rec: I2C::Rec,
        clocks: &CoreClocks,
    ) -> I2c<I2C> {
        I2c::new(self, descriptor, rec, clocks)
    }
}

/// Computes (PRESC, SCLL, SCLH, SDADEL, SCLDEL) for a bus frequency.
///
/// ST refers to STM32CubeMX for TIMINGR values; this derivation comes from
/// the stm32h7xx-hal and keeps every I2C bus timing requirement over the
/// U0 kernel clock range. See RM0503 sections 32.4.5 and 32.4.9.
///
/// t_I2CCLK = 1 / i2c_ker_ck
/// t_PRESC  = (PRESC + 1) * t_I2CCLK
/// t_SCLL   = (SCLL + 1) * t_PRESC
/// t_SCLH   = (SCLH + 1) * t_PRESC
///
/// t_SYNC1 + t_SYNC2 > 4 * t_I2CCLK
/// t_SCL ~= t_SYNC1 + t_SYNC2 + t_SCLL + t_SCLH
fn calc_timing_params(ker_ck: u32, target_freq: u32) -> (u8, u8, u8, u8, u8) {
    let ratio = ker_ck / target_freq;

    // For the standard-mode configuration method, we must have a ratio of 4
    // or higher
    assert!(
        ratio >= 4,
        "i2c_ker_ck must be at least 4 times the bus frequency!"
    );

    let (presc_reg, scll, sclh, sdadel, scldel) = if target_freq > 100_000 {
        // Fast-mode (Fm) or Fast-mode Plus (Fm+)
        // here we pick SCLL + 1 = 2 * (SCLH + 1)

        // Prescaler, 96 ticks for sclh/scll. Round up then subtract 1
        let presc_reg = ((ratio - 1) / 96) as u8;

        let presc = (presc_reg + 1) as u32;

        let sclh = ((ratio / presc) - 3) / 3;
        let scll = (2 * (sclh + 1)) - 1;

        let (sdadel, scldel) = if target_freq > 400_000 {
            // Fast-mode Plus (Fm+)
            assert!(
                ker_ck >= 17_000_000,
                "Fast-mode Plus needs i2c_ker_ck of at least 17 MHz"
            );

            let sdadel = ker_ck / 8_000_000 / presc;
            let scldel = ker_ck / 4_000_000 / presc - 1;

            (sdadel, scldel)
        } else {
            // Fast-mode (Fm)
            assert!(
                ker_ck >= 8_000_000,
                "Fast-mode needs i2c_ker_ck of at least 8 MHz"
            );

            let sdadel = ker_ck / 3_000_000 / presc;
            let scldel = ker_ck / 1_000_000 / presc - 1;

            (sdadel, scldel)
        };

        (
            presc_reg,
            scll as u8,
            sclh as u8,
            sdadel as u8,
            scldel as u8,
        )
    } else {
        // Standard-mode (Sm)
        // here we pick SCLL = SCLH
        assert!(
            ker_ck >= 2_000_000,
            "Standard-mode needs i2c_ker_ck of at least 2 MHz"
        );

        // Prescaler, 128 or 256 ticks for sclh/scll. Round up then
        // subtract 1
        let presc_reg = (ratio - 1)
            / if target_freq < 8000 {
                256
            } else if target_freq < 80_000 {
                128
            } else {
                64
            };
        let presc_reg = core::cmp::min(presc_reg, 15) as u8;

        let presc = (presc_reg + 1) as u32;

        let sclh = ((ratio / presc) - 2) / 2;
        let scll = sclh;

        assert!(
            sclh < 256,
            "The I2C kernel clock is too fast for this bus frequency!"
        );

        let sdadel = ker_ck / 2_000_000 / presc;
        let scldel = ker_ck / 500_000 / presc - 1;

        (
            presc_reg,
            scll as u8,
            sclh as u8,
            sdadel as u8,
            scldel as u8,
        )
    };

    assert!(presc_reg < 16);

    // Keep values within reasonable limits for fast ker_ck
    let sdadel = sdadel.clamp(1, 15);
    let scldel = scldel.clamp(4, 15);

    (presc_reg, scll, sclh, sdadel, scldel)
}

impl<I2C: Instance> I2c<I2C> {
    /// Create and initialise a new I2C peripheral.
    ///
    /// # Panics
    ///
    /// Panics if the kernel clock selected for this instance is not running,
    /// or cannot produce the bus frequency of the descriptor's mode (see
    /// [`set_descriptor`](I2c::set_descriptor)).
    pub fn new(
        i2c: I2C,
        descriptor: impl Into<Descriptor>,
        rec: I2C::Rec,
        clocks: &CoreClocks,
    ) -> Self {
        let _ = rec.enable().reset();

        let ker_ck = match I2C::clock(clocks) {
            Some(ker_ck) => ker_ck,
            None => panic!("I2C kernel clock source not running"),
        };

        let mut i2c = I2c { i2c, ker_ck };
        i2c.set_descriptor(descriptor.into());
        i2c
    }

    /// Program bus timing and noise filters
    ///
    /// The peripheral is disabled while TIMINGR and the filters are written,
    /// as the hardware requires.
    ///
    /// # Panics
    ///
    /// Panics if the kernel clock is below the minimum for the mode: 2 MHz
    /// for Standard-mode, 8 MHz for Fast-mode and 17 MHz for Fast-mode Plus,
    /// or if the digital filter is longer than 15 periods.
    pub fn set_descriptor(&mut self, descriptor: Descriptor) {
        assert!(
            descriptor.digital_filter < 16,
            "I2C digital filter is at most 15 periods"
        );
        let freq = descriptor.mode.frequency().raw();
        let (presc, scll, sclh, sdadel, scldel) =
            calc_timing_params(self.ker_ck.raw(), freq);

        self.i2c.cr1.modify(CR1::PE::CLEAR);
        interrupt_clear_clock_sync_delay!(self.i2c.cr1);
        while self.i2c.cr1.is_set(CR1::PE) {}

        self.i2c.timingr.write(
            TIMINGR::PRESC.val(presc as u32)
                + TIMINGR::SCLL.val(scll as u32)
                + TIMINGR::SCLH.val(sclh as u32)
                + TIMINGR::SDADEL.val(sdadel as u32)
                + TIMINGR::SCLDEL.val(scldel as u32),
        );

        #[cfg(feature = "log")]
        debug!(
            "I2C {:?} from {} Hz: TIMINGR {:#010x}",
            descriptor.mode,
            self.ker_ck.raw(),
            self.i2c.timingr.get()
        );

        self.i2c.cr1.modify(
            CR1::ANFOFF.val(!descriptor.analog_filter as u32)
                + CR1::DNF.val(descriptor.digital_filter as u32),
        );
        self.i2c.cr1.modify(CR1::PE::SET);
    }

    /// The configuration currently programmed in the peripheral
    pub fn get_descriptor(&self) -> Descriptor {
        let timingr = self.i2c.timingr.extract();
        let presc = timingr.read(TIMINGR::PRESC) + 1;
        let period = timingr.read(TIMINGR::SCLL) + timingr.read(TIMINGR::SCLH) + 2;
        let scl = self.ker_ck.raw() / (presc * period);

        Descriptor {
            mode: Mode::from_scl(scl),
            analog_filter: !self.i2c.cr1.is_set(CR1::ANFOFF),
            digital_filter: self.i2c.cr1.read(CR1::DNF) as u8,
        }
    }

    /// Kernel clock the timing was derived from
    pub fn kernel_clock(&self) -> Hertz {
        self.ker_ck
    }

    pub fn free(self) -> I2C {
        let _ = I2C::rec().reset().disable();
        self.i2c
    }

    /// Reset the peripheral
    pub fn reset(&mut self) {
        self.i2c.cr1.modify(CR1::PE::CLEAR);
        interrupt_clear_clock_sync_delay!(self.i2c.cr1);
        while self.i2c.cr1.is_set(CR1::PE) {}
        self.i2c.cr1.modify(CR1::PE::SET);
    }
}

impl<I2C: Instance> I2c<I2C> {
    #[inline(always)]
    fn flush_txdr(&self) {
        // If a pending TXIS flag is set, write dummy data to TXDR
        if self.i2c.isr.is_set(ISR::TXIS) {
            self.i2c.txdr.set(0);
        }

        // If TXDR is not flagged as empty, write 1 to flush it
        if !self.i2c.isr.is_set(ISR::TXE) {
            self.i2c.isr.write(ISR::TXE::SET);
        }
    }

    #[inline(always)]
    fn read_isr_and_check_errors(&self) -> Result<Isr, Error> {
        let isr = self.i2c.isr.extract();
        if isr.is_set(ISR::BERR) {
            self.i2c.icr.write(ICR::BERRCF::SET);
            return Err(Error::Bus);
        } else if isr.is_set(ISR::ARLO) {
            self.i2c.icr.write(ICR::ARLOCF::SET);
            return Err(Error::Arbitration);
        }
        Ok(isr)
    }

    #[inline(always)]
    fn check_clear_nack(&self, isr: &Isr) -> Result<(), Error> {
        if isr.is_set(ISR::NACKF) {
            self.i2c.icr.write(ICR::NACKCF::SET);
            self.flush_txdr();
            Err(Error::NotAcknowledge)
        } else {
            Ok(())
        }
    }

    /// Write a single byte if possible. If data was written, Ok(true) is
    /// returned. If the peripheral is not yet ready, but no error occurred,
    /// Ok(false) is returned.
    ///
    /// If a previous byte was NACK'd by the receiver, that is indicated by a
    /// NotAcknowledge error being returned.
    #[inline(always)]
    fn write_byte_if_ready(&self, data: u8) -> Result<bool, Error> {
        let isr = self.read_isr_and_check_errors()?;
        self.check_clear_nack(&isr)?;

        if isr.is_set(ISR::TXIS) {
            self.i2c.txdr.set(data as u32);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Read a single byte if one is available. If data was read, Ok(true) is
    /// returned and the value read is stored to `data`.
    #[inline(always)]
    fn read_byte_if_ready(&self, data: &mut u8) -> Result<bool, Error> {
        let isr = self.read_isr_and_check_errors()?;
        self.check_clear_nack(&isr)?;

        if isr.is_set(ISR::RXNE) {
            *data = self.i2c.rxdr.get() as u8;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Controller methods
///
/// These methods begin parts of transactions, but do __not__ read or write
/// the data registers. Complete transactions go through the embedded-hal
/// [`I2c`](embedded_hal::i2c::I2c) implementation.
impl<I2C: Instance> I2c<I2C> {
    fn cr2_value(
        addr: u16,
        address_mode: AddressMode,
        length: usize,
        direction: Direction,
        stop: Stop,
    ) -> tock_registers::fields::FieldValue<u32, CR2::Register> {
        assert!(
            length <= u8::MAX as usize,
            "I2C max transaction size = {} bytes",
            u8::MAX
        );

        let rd_wrn = match direction {
            Direction::Read => CR2::RD_WRN::Read,
            Direction::Write => CR2::RD_WRN::Write,
        };
        let sadd = match address_mode {
            AddressMode::AddressMode10bit => {
                CR2::SADD.val(addr as u32) + CR2::ADD10::SET
            }
            AddressMode::AddressMode7bit => CR2::SADD.val((addr as u32) << 1),
        };

        rd_wrn
            + sadd
            + CR2::NBYTES.val(length as u32)
            + CR2::START::SET
            + CR2::AUTOEND.val((stop == Stop::Automatic) as u32)
            + CR2::RELOAD.val((stop == Stop::Reload) as u32)
    }

    /// Start a transaction
    ///
    /// ```
    /// Controller: ST SAD+R/W  ...  (SP)
    /// Target:                 ...
    /// ```
    fn start(
        &self,
        addr: u16,
        address_mode: AddressMode,
        length: usize,
        direction: Direction,
        stop: Stop,
    ) {
        self.i2c.cr2.write(Self::cr2_value(
            addr,
            address_mode,
            length,
            direction,
            stop,
        ));
    }

    /// Send a repeat start condition. Only valid when the previous operation
    /// was started with `Stop::RepeatStart`.
    ///
    /// In 10-bit mode a restart into a read only resends the header.
    fn repeat_start(
        &self,
        addr: u16,
        address_mode: AddressMode,
        length: usize,
        direction: Direction,
        stop: Stop,
    ) {
        let mut cr2 =
            Self::cr2_value(addr, address_mode, length, direction, stop);
        if address_mode == AddressMode::AddressMode10bit {
            cr2 = cr2 + CR2::HEAD10R::SET;
        }
        self.i2c.cr2.write(cr2);
    }

    /// Continue a transaction without issuing a repeat start condition. This
    /// allows for more than 255 bytes to be written or read during an
    /// operation. Only valid after `Stop::Reload`.
    fn reload(&self, length: usize, direction: Direction, stop: Stop) {
        assert!(
            length <= u8::MAX as usize,
            "I2C max transfer size per reload = {}",
            u8::MAX
        );

        let rd_wrn = match direction {
            Direction::Read => CR2::RD_WRN::Read,
            Direction::Write => CR2::RD_WRN::Write,
        };
        self.i2c.cr2.modify(
            rd_wrn
                + CR2::NBYTES.val(length as u32)
                + CR2::AUTOEND.val((stop == Stop::Automatic) as u32)
                + CR2::RELOAD.val((stop == Stop::Reload) as u32),
        );
    }
}

impl<I2C: Instance> I2c<I2C> {
    /// Blocks until the start sequence has completed
    fn wait_for_start_sequence_complete(&self) -> Result<(), Error> {
        loop {
            let isr = self.read_isr_and_check_errors()?;
            self.check_clear_nack(&isr)?;

            if !self.i2c.cr2.is_set(CR2::START) {
                return Ok(());
            }
        }
    }

    /// Blocks until the operation completes with a STOP condition
    fn wait_for_stop(&self) -> Result<(), Error> {
        loop {
            let isr = self.read_isr_and_check_errors()?;
            self.check_clear_nack(&isr)?;

            if isr.is_set(ISR::STOPF) {
                self.i2c.icr.write(ICR::STOPCF::SET);
                return Ok(());
            }
        }
    }

    /// Blocks until the peripheral is ready for reload
    fn wait_for_reload_ready(&self) -> Result<(), Error> {
        loop {
            let isr = self.read_isr_and_check_errors()?;
            self.check_clear_nack(&isr)?;

            if isr.is_set(ISR::TCR) {
                return Ok(());
            }
        }
    }

    /// Blocks until all bytes have been transmitted before issuing a repeat
    /// start
    fn wait_for_transmit_complete(&self) -> Result<(), Error> {
        loop {
            let isr = self.read_isr_and_check_errors()?;
            self.check_clear_nack(&isr)?;

            if isr.is_set(ISR::TC) {
                return Ok(());
            }
        }
    }

    /// Write the contents of the buffer. Blocks until all data has been
    /// written, or an error occurs.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        for byte in bytes {
            // Blocks until we are allowed to send data (START has been ACKed
            // or the last byte went through)
            while !self.write_byte_if_ready(*byte)? {}
        }
        Ok(())
    }

    /// Fill the buffer with data read from the bus. Blocks until all data
    /// have been read or an error occurs.
    fn read_all(&mut self, buffer: &mut [u8]) -> Result<(), Error> {
        for byte in buffer {
            while !self.read_byte_if_ready(byte)? {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::GpioExt;
    use crate::rcc::{I2cClkSel, RccExt};
    use crate::stm32::{sim, GPIOB, I2C1, I2C2, RCC};

    const CR1_OFFSET: usize = 0x00;
    const TIMINGR_OFFSET: usize = 0x10;

    fn hsi16_clocks() -> crate::rcc::Ccdr {
        sim::poke(RCC::ADDRESS, 0x00, 1 << 10);
        sim::poke(RCC::ADDRESS, 0x08, 0b001 << 3);
        unsafe { RCC::steal() }.constrain().freeze()
    }

    /// Runs a timing testcase over kernel clock and bus frequency ranges
    fn i2c_timing_testcase<F>(f: F)
    where
        F: Fn(u32, u32),
    {
        let i2c_timing_tests = [
            // (i2c_clk, range of bus frequencies to test)
            (2_000_000, (4_000..=100_000)), // Min kernel clock
            (8_000_000, (4_000..=400_000)), // Slowest clock for fast mode
            (16_000_000, (4_000..=400_000)), // HSI16
            (24_000_000, (4_000..=400_000)),
            (32_000_000, (4_000..=1_000_000)),
            (48_000_000, (10_000..=1_000_000)), // HSI48
            (56_000_000, (10_000..=1_000_000)), // Max sysclk
        ];

        for (clock, freq_range) in i2c_timing_tests.iter() {
            for freq in freq_range.clone().step_by(1_000) {
                f(*clock, freq)
            }
        }
    }

    #[test]
    /// Test the SCL frequency is within the expected range
    fn i2c_frequency() {
        i2c_timing_testcase(|i2c_clk: u32, freq: u32| {
            let (presc_reg, scll, sclh, _, _) =
                calc_timing_params(i2c_clk, freq);

            let presc = (presc_reg + 1) as f32;
            let t_i2c_clk = 1. / (i2c_clk as f32);
            let freq = freq as f32;

            // Minimum sync times: analog filter on, 2 i2c_clk cycles
            let t_af_min = 50e-9_f32;
            let t_sync1 = t_af_min + 2. * t_i2c_clk;
            let t_sync2 = t_af_min + 2. * t_i2c_clk;

            let t_high_low = sclh as f32 + 1. + scll as f32 + 1.;
            let t_scl = t_sync1 + t_sync2 + (t_high_low * presc * t_i2c_clk);
            let f_scl = 1. / t_scl;

            // Never faster than requested, tolerating 2%
            assert!(f_scl <= 1.02 * freq, "{} Hz from {}", freq, i2c_clk);
            // But not too much slower either
            assert!(f_scl > 0.8 * freq, "{} Hz from {}", freq, i2c_clk);
        });
    }

    #[test]
    /// Test that the low period of SCL is greater than the minimum specification
    fn i2c_scl_low() {
        i2c_timing_testcase(|i2c_clk: u32, freq: u32| {
            let (presc_reg, scll, _, _, _) = calc_timing_params(i2c_clk, freq);

            let presc = (presc_reg + 1) as f32;
            let t_i2c_clk = 1. / (i2c_clk as f32);
            let freq = freq as f32;
            let t_scll = (scll as f32 + 1.) * presc * t_i2c_clk;

            // UM10204 rev 6 Table 10
            let t_scll_minimum = match freq {
                x if x <= 100_000. => 4.7e-6,
                x if x <= 400_000. => 1.3e-6,
                _ => 0.5e-6,
            };

            assert!(t_scll >= t_scll_minimum);
        });
    }

    #[test]
    /// Test the SDADEL value is within the bus timing limits
    fn i2c_sdadel_limits() {
        i2c_timing_testcase(|i2c_clk: u32, freq: u32| {
            let (presc_reg, _, _, sdadel, _) =
                calc_timing_params(i2c_clk, freq);

            let presc = (presc_reg + 1) as f32;
            let t_i2c_clk = 1. / (i2c_clk as f32);
            let freq = freq as f32;
            let t_sdadel = (sdadel as f32) * presc * t_i2c_clk;

            let t_fall_max = match freq {
                x if x <= 400_000. => 300e-9,
                _ => 120e-9,
            };
            let t_hddat_max = match freq {
                x if x <= 100_000. => 3.45e-6,
                x if x <= 400_000. => 0.9e-6,
                _ => 0.45e-6,
            };
            let t_af_min = 50e-9_f32;
            let t_af_max = 80e-9_f32;

            // tSDADEL >= tf + tHD;DAT(min) - tAF(min) - (DNF + 3) * tI2CCLK
            let t_sdadel_minimum = t_fall_max - t_af_min - (3. * t_i2c_clk);
            // tSDADEL <= tHD;DAT(max) - tAF(max) - (DNF + 4) * tI2CCLK
            let t_sdadel_maximum = t_hddat_max - t_af_max - (4. * t_i2c_clk);

            assert!(sdadel <= 15);
            assert!(t_sdadel >= t_sdadel_minimum);
            assert!(t_sdadel <= t_sdadel_maximum);
        });
    }

    #[test]
    /// Test the SCLDEL value is greater than the minimum specification
    fn i2c_scldel_minimum() {
        i2c_timing_testcase(|i2c_clk: u32, freq: u32| {
            let (presc_reg, _, _, _, scldel) =
                calc_timing_params(i2c_clk, freq);

            let presc = (presc_reg + 1) as f32;
            let t_i2c_clk = 1. / (i2c_clk as f32);
            let freq = freq as f32;
            let t_scldel = (scldel as f32) * presc * t_i2c_clk;

            let t_rise_max = match freq {
                x if x <= 100_000. => 1000e-9,
                x if x <= 400_000. => 300e-9,
                _ => 120e-9,
            };
            let t_sudat_min = match freq {
                x if x <= 100_000. => 250e-9,
                x if x <= 400_000. => 100e-9,
                _ => 50e-9,
            };

            // tSCLDEL >= tr + tSU;DAT(min)
            assert!(scldel <= 15);
            assert!(t_scldel >= t_rise_max + t_sudat_min);
        });
    }

    #[test]
    fn standard_mode_from_hsi16() {
        let ccdr = hsi16_clocks();
        let gpiob = unsafe { GPIOB::steal() }.split(ccdr.peripheral.GPIOB);
        let scl = gpiob.pb6.into_alternate_open_drain::<4>();
        let sda = gpiob.pb7.into_alternate_open_drain::<4>();

        let i2c = unsafe { I2C1::steal() }.i2c(
            (scl, sda),
            Mode::Standard,
            ccdr.peripheral.I2C1,
            &ccdr.clocks,
        );

        // PRESC 2, SCLDEL 9, SDADEL 2, SCLH = SCLL = 25
        assert_eq!(sim::peek(I2C1::ADDRESS, TIMINGR_OFFSET), 0x2092_1919);
        // Enabled, analog filter on, no digital filter
        assert_eq!(sim::peek(I2C1::ADDRESS, CR1_OFFSET), 1);
        assert_eq!(i2c.get_descriptor(), Descriptor::new(Mode::Standard));
    }

    #[test]
    fn descriptor_reads_back_what_was_set() {
        let ccdr = hsi16_clocks();
        let mut i2c = unsafe { I2C2::steal() }.i2c_unchecked(
            Mode::Standard,
            ccdr.peripheral.I2C2,
            &ccdr.clocks,
        );

        let fast = Descriptor::new(Mode::Fast)
            .analog_filter(false)
            .digital_filter(3);
        i2c.set_descriptor(fast);
        // PRESC 0, SCLDEL 15, SDADEL 5, SCLH 12, SCLL 25
        assert_eq!(sim::peek(I2C2::ADDRESS, TIMINGR_OFFSET), 0x00F5_0C19);
        assert_eq!(
            sim::peek(I2C2::ADDRESS, CR1_OFFSET),
            (1 << 12) | (3 << 8) | 1
        );
        assert_eq!(i2c.get_descriptor(), fast);

        let standard = Descriptor::new(Mode::Standard);
        i2c.set_descriptor(standard);
        assert_eq!(i2c.get_descriptor(), standard);
    }

    #[test]
    #[should_panic(expected = "I2C digital filter is at most 15 periods")]
    fn oversized_digital_filter_is_rejected() {
        let ccdr = hsi16_clocks();
        let mut i2c = unsafe { I2C2::steal() }.i2c_unchecked(
            Mode::Standard,
            ccdr.peripheral.I2C2,
            &ccdr.clocks,
        );
        // Bypasses the builder check
        i2c.set_descriptor(Descriptor {
            digital_filter: 16,
            ..Descriptor::new(Mode::Standard)
        });
    }

    #[test]
    fn fast_mode_plus_from_sysclk_mux() {
        let ccdr = hsi16_clocks();
        // Kernel clock 48 MHz, as a PLL sysclk would provide
        let mut i2c = I2c {
            i2c: unsafe { I2C1::steal() },
            ker_ck: Hertz::MHz(48),
        };
        i2c.set_descriptor(Descriptor::new(Mode::FastPlus));
        assert_eq!(i2c.get_descriptor().mode, Mode::FastPlus);

        let rec = ccdr.peripheral.I2C1.kernel_clk_mux(I2cClkSel::Sysclk);
        assert_eq!(rec.get_kernel_clk_mux(), Some(I2cClkSel::Sysclk));
    }

    #[test]
    #[should_panic]
    fn fast_mode_plus_needs_fast_kernel_clock() {
        let ccdr = hsi16_clocks();
        let _ = unsafe { I2C2::steal() }.i2c_unchecked(
            Mode::FastPlus,
            ccdr.peripheral.I2C2,
            &ccdr.clocks,
        );
    }
}
