//! USART implementation for Serial
//!
//! This provides an implementation of the Serial functionality via the USART peripheral. See the
//! documentation for the `serial` module for more information.

use super::config::WordSize;
use super::*;

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::ptr;

use embedded_io as io;
#[cfg(feature = "log")]
use log::debug;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::rcc::{CoreClocks, ResetEnable};
use crate::stm32::usart::{self as usart_regs, CR1, CR2, CR3, ICR, ISR, PRESC};
use crate::time::{wait_until, Bps, Hertz, MilliSeconds, Monotonic, Timeout};

mod usart_def;

pub trait Pins<USART> {
    const SYNCHRONOUS: bool = false;
}
pub trait PinTx<USART> {}
pub trait PinRx<USART> {}
pub trait PinCk<USART> {}

impl<USART, TX, RX> Pins<USART> for (TX, RX)
where
    TX: PinTx<USART>,
    RX: PinRx<USART>,
{
}

impl<USART, TX, RX, CK> Pins<USART> for (TX, RX, CK)
where
    TX: PinTx<USART>,
    RX: PinRx<USART>,
    CK: PinCk<USART>,
{
    const SYNCHRONOUS: bool = true;
}

/// A filler type for when the Tx pin is unnecessary
pub struct NoTx;
/// A filler type for when the Rx pin is unnecessary
pub struct NoRx;
/// A filler type for when the Ck pin is unnecessary
pub struct NoCk;

pub trait InstanceClock {
    /// Kernel clock of this instance, `None` if its source is not running
    fn clock(clocks: &CoreClocks) -> Option<Hertz>;
}

pub trait Instance:
    InstanceClock + crate::Sealed + Deref<Target = usart_regs::RegisterBlock>
{
    type Rec: ResetEnable;

    #[doc(hidden)]
    fn ptr() -> *const usart_regs::RegisterBlock;

    #[doc(hidden)]
    fn rec() -> Self::Rec;
}

/// Kernel clock divisions selectable in PRESC, by register value
const PRESCALERS: [u32; 12] = [1, 2, 4, 6, 8, 10, 12, 16, 32, 64, 128, 256];

/// Compute the BRR value for `baud` from a kernel clock of `ker_ck` Hz.
///
/// The divider is rounded to the nearest integer. Sampling by 8 computes
/// twice the divider and packs its low nibble into BRR[2:0].
pub(crate) fn brr(
    ker_ck: u32,
    baud: u32,
    oversampling: config::Oversampling,
) -> Result<u32, config::InvalidConfig> {
    use self::config::Oversampling;

    if baud == 0 {
        return Err(config::InvalidConfig);
    }
    let div = match oversampling {
        Oversampling::By16 => (ker_ck as u64 + (baud / 2) as u64) / baud as u64,
        Oversampling::By8 => {
            (2 * ker_ck as u64 + (baud / 2) as u64) / baud as u64
        }
    };
    if !(0x10..=0xFFFF).contains(&div) {
        return Err(config::InvalidConfig);
    }
    let div = div as u32;
    Ok(match oversampling {
        Oversampling::By16 => div,
        Oversampling::By8 => (div & !0xF) | ((div & 0xF) >> 1),
    })
}

/// Serial abstraction
pub struct Serial<USART, W: WordBits = u8> {
    inner: Inner<USART, W>,
}

pub struct Inner<USART, W: WordBits = u8> {
    usart: USART,
    ker_ck: Hertz,
    _word: PhantomData<W>,
}

impl<USART, W: WordBits> Deref for Serial<USART, W> {
    type Target = Inner<USART, W>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<USART, W: WordBits> DerefMut for Serial<USART, W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

pub trait SerialExt<USART: Instance, W: WordBits = u8>: Sized {
    fn serial<P: Pins<USART>>(
        self,
        _pins: P,
        config: impl Into<config::Config>,
        rec: USART::Rec,
        clocks: &CoreClocks,
    ) -> Result<Serial<USART, W>, config::InvalidConfig>;

    fn serial_unchecked(
        self,
        config: impl Into<config::Config>,
        rec: USART::Rec,
        clocks: &CoreClocks,
        synchronous: bool,
    ) -> Result<Serial<USART, W>, config::InvalidConfig>;
}

impl<USART: Instance, W: WordBits> SerialExt<USART, W> for USART {
    fn serial<P: Pins<USART>>(
        self,
        _pins: P,
        config: impl Into<config::Config>,
        rec: USART::Rec,
        clocks: &CoreClocks,
    ) -> Result<Serial<USART, W>, config::InvalidConfig> {
        Serial::new(self, config, rec, clocks, P::SYNCHRONOUS)
    }

    fn serial_unchecked(
        self,
        config: impl Into<config::Config>,
        rec: <USART as Instance>::Rec,
        clocks: &CoreClocks,
        synchronous: bool,
    ) -> Result<Serial<USART, W>, config::InvalidConfig> {
        Serial::new(self, config, rec, clocks, synchronous)
    }
}

impl<USART: Instance, W: WordBits> Serial<USART, W> {
    fn new(
        usart: USART,
        config: impl Into<config::Config>,
        rec: USART::Rec,
        clocks: &CoreClocks,
        synchronous: bool,
    ) -> Result<Self, config::InvalidConfig> {
        let config = config.into();

        // Ensure that word size in config matches the word size type, W
        if config.word_size == WordSize::DataBits9 && W::BITS < 9 {
            return Err(config::InvalidConfig);
        }
        if config.word_size != WordSize::DataBits9 && W::BITS > 8 {
            return Err(config::InvalidConfig);
        }

        // If synchronous mode is supported, check that it is not
        // enabled alongside half duplex mode
        if config.half_duplex & synchronous {
            return Err(config::InvalidConfig);
        }

        let ker_ck = USART::clock(clocks).ok_or(config::InvalidConfig)?;

        // Enable clock for USART and reset
        rec.enable().reset();

        let mut serial = Serial {
            inner: Inner::new(usart, ker_ck),
        };
        serial.usart.cr1.set(0);
        serial.configure(&config, synchronous)?;

        Ok(serial)
    }

    /// Runs the serial port configuration process
    ///
    /// The serial port must be disabled when called.
    fn configure(
        &mut self,
        config: &config::Config,
        synchronous: bool,
    ) -> Result<(), config::InvalidConfig> {
        use self::config::*;

        let ker_ck = self.ker_ck;
        let brr = brr(ker_ck.raw(), config.baudrate.raw(), config.oversampling)?;
        let over8 = config.oversampling == Oversampling::By8;

        #[cfg(feature = "log")]
        debug!(
            "USART: Kernel clock: {}; Over8: {}; BRR: {:#X}; Baudrate: {}",
            ker_ck, over8, brr, config.baudrate
        );

        // Kernel clock is not divided, BRR covers the whole range
        self.usart.presc.write(PRESC::PRESCALER.val(0));
        self.usart.brr.set(brr);

        let rxftcfg = match config.rx_fifo_threshold {
            FifoThreshold::Eighth => 0b000,
            FifoThreshold::Quarter => 0b001,
            FifoThreshold::Half => 0b010,
            FifoThreshold::ThreeQuarter => 0b011,
            FifoThreshold::SevenEighth => 0b100,
            FifoThreshold::Full => 0b101,
            // Empty is not a valid configuration
            FifoThreshold::Empty => return Err(config::InvalidConfig),
        };
        let txftcfg = match config.tx_fifo_threshold {
            FifoThreshold::Eighth => 0b000,
            FifoThreshold::Quarter => 0b001,
            FifoThreshold::Half => 0b010,
            FifoThreshold::ThreeQuarter => 0b011,
            FifoThreshold::SevenEighth => 0b100,
            FifoThreshold::Empty => 0b101,
            // Full is not a valid configuration
            FifoThreshold::Full => return Err(config::InvalidConfig),
        };

        // Reset registers to disable advanced USART features
        self.usart.cr3.write(
            CR3::RXFTCFG.val(rxftcfg)
                + CR3::TXFTCFG.val(txftcfg)
                + CR3::HDSEL.val(config.half_duplex as u32),
        );

        let mut cr2 = match config.stop_bits {
            StopBits::Stop0p5 => CR2::STOP::Stop0p5,
            StopBits::Stop1 => CR2::STOP::Stop1,
            StopBits::Stop1p5 => CR2::STOP::Stop1p5,
            StopBits::Stop2 => CR2::STOP::Stop2,
        } + CR2::MSBFIRST.val((config.bit_order == BitOrder::MsbFirst) as u32)
            + CR2::SWAP.val(config.swap_txrx as u32)
            + CR2::RXINV.val(config.invert_rx as u32)
            + CR2::TXINV.val(config.invert_tx as u32);
        if synchronous {
            cr2 = cr2
                + CR2::CLKEN::SET
                + CR2::LBCL.val(config.last_bit_clock_pulse as u32)
                + CR2::CPOL.val(
                    (config.clock_polarity == ClockPolarity::IdleHigh) as u32,
                )
                + CR2::CPHA
                    .val((config.clock_phase == ClockPhase::Second) as u32);
        }
        self.usart.cr2.write(cr2);

        let (m1, m0) = match config.word_size {
            WordSize::DataBits7 => (1, 0),
            WordSize::DataBits8 => (0, 0),
            WordSize::DataBits9 => (0, 1),
        };

        // Enable transmission and receiving and configure frame
        // Retain enabled events
        self.usart.cr1.modify(
            CR1::FIFOEN::SET
                + CR1::OVER8.val(over8 as u32)
                + CR1::UE::SET
                + CR1::TE::SET
                + CR1::RE::SET
                + CR1::M1.val(m1)
                + CR1::M0.val(m0)
                + CR1::PCE.val((config.parity != Parity::ParityNone) as u32)
                + match config.parity {
                    Parity::ParityOdd => CR1::PS::Odd,
                    _ => CR1::PS::Even,
                },
        );

        Ok(())
    }

    /// Releases the USART peripheral
    pub fn free(self) -> USART {
        // Wait until both TXFIFO and shift register are empty
        while !self.usart.isr.is_set(ISR::TC) {}

        self.inner.usart
    }

    /// Returns a reference to the inner peripheral
    pub fn inner(&self) -> &USART {
        &self.usart
    }

    /// Returns a mutable reference to the inner peripheral
    pub fn inner_mut(&mut self) -> &mut USART {
        &mut self.usart
    }
}

impl<USART, W: WordBits> Inner<USART, W> {
    fn new(usart: USART, ker_ck: Hertz) -> Self {
        Inner {
            usart,
            ker_ck,
            _word: PhantomData,
        }
    }
}

macro_rules! check_status_error {
    ($isr:expr) => {
        if $isr.is_set(ISR::PE) {
            Err(Error::Parity)
        } else if $isr.is_set(ISR::FE) {
            Err(Error::Framing)
        } else if $isr.is_set(ISR::NE) {
            Err(Error::Noise)
        } else if $isr.is_set(ISR::ORE) {
            Err(Error::Overrun)
        } else {
            Ok(())
        }
    };
}

impl<USART: Instance, W: WordBits> Inner<USART, W> {
    /// Starts listening for an interrupt event
    pub fn listen(&mut self, event: Event) {
        match event {
            Event::RxNotEmpty => self.usart.cr1.modify(CR1::RXNEIE::SET),
            Event::TxNotFull => self.usart.cr1.modify(CR1::TXEIE::SET),
            Event::Idle => self.usart.cr1.modify(CR1::IDLEIE::SET),
            Event::TxFifoThreshold => self.usart.cr3.modify(CR3::TXFTIE::SET),
            Event::RxFifoThreshold => self.usart.cr3.modify(CR3::RXFTIE::SET),
        }
    }

    /// Stop listening for an interrupt event
    pub fn unlisten(&mut self, event: Event) {
        match event {
            Event::RxNotEmpty => self.usart.cr1.modify(CR1::RXNEIE::CLEAR),
            Event::TxNotFull => self.usart.cr1.modify(CR1::TXEIE::CLEAR),
            Event::Idle => self.usart.cr1.modify(CR1::IDLEIE::CLEAR),
            Event::TxFifoThreshold => {
                self.usart.cr3.modify(CR3::TXFTIE::CLEAR)
            }
            Event::RxFifoThreshold => {
                self.usart.cr3.modify(CR3::RXFTIE::CLEAR)
            }
        }
        let _ = self.usart.cr1.get();
        let _ = self.usart.cr1.get(); // Delay 2 peripheral clocks
    }

    /// Return true if the line idle status is set
    ///
    /// The line idle status bit is set when the peripheral detects the receive line is idle.
    /// The bit is cleared by software, by calling `clear_idle()`.
    pub fn is_idle(&self) -> bool {
        self.usart.isr.is_set(ISR::IDLE)
    }

    /// Clear the line idle status bit
    pub fn clear_idle(&mut self) {
        self.usart.icr.write(ICR::IDLECF::SET);
        let _ = self.usart.isr.get();
        let _ = self.usart.isr.get(); // Delay 2 peripheral clocks
    }

    /// Return true if the line busy status is set
    ///
    /// The busy status bit is set when there is communication active on the receive line,
    /// and reset at the end of reception.
    pub fn is_busy(&self) -> bool {
        self.usart.isr.is_set(ISR::BUSY)
    }

    /// Baud rate currently programmed, derived from PRESC, BRR and OVER8
    pub fn get_baudrate(&self) -> Bps {
        let presc = self.usart.presc.read(PRESC::PRESCALER) as usize;
        let ker_ck =
            self.ker_ck.raw() / PRESCALERS[presc.min(PRESCALERS.len() - 1)];
        let brr = self.usart.brr.get() & 0xFFFF;
        let baud = if self.usart.cr1.is_set(CR1::OVER8) {
            let div = (brr & !0xF) | ((brr & 0x7) << 1);
            (2 * ker_ck as u64 / div.max(1) as u64) as u32
        } else {
            ker_ck / brr.max(1)
        };
        Bps::from_raw(baud)
    }

    /// Enable the transmitter and receiver, waiting for both to acknowledge.
    ///
    /// Returns `Err(Timeout)` if TEACK and REACK are not both set within
    /// `timeout`; the peripheral is left enabled.
    pub fn enable<M: Monotonic + ?Sized>(
        &mut self,
        mono: &M,
        timeout: MilliSeconds,
    ) -> Result<(), Timeout> {
        self.usart
            .cr1
            .modify(CR1::UE::SET + CR1::TE::SET + CR1::RE::SET);
        wait_until(mono, timeout, || {
            self.usart.isr.is_set(ISR::TEACK) && self.usart.isr.is_set(ISR::REACK)
        })
    }

    /// Disable the transmitter and receiver, waiting for both to release,
    /// then disable the peripheral.
    ///
    /// Returns `Err(Timeout)` if TEACK or REACK is still set after
    /// `timeout`; UE is left set in that case.
    pub fn disable<M: Monotonic + ?Sized>(
        &mut self,
        mono: &M,
        timeout: MilliSeconds,
    ) -> Result<(), Timeout> {
        self.usart.cr1.modify(CR1::TE::CLEAR + CR1::RE::CLEAR);
        wait_until(mono, timeout, || {
            !self.usart.isr.is_set(ISR::TEACK)
                && !self.usart.isr.is_set(ISR::REACK)
        })?;
        self.usart.cr1.modify(CR1::UE::CLEAR);
        Ok(())
    }

    /// Return true if the tx FIFO can accept data
    fn is_tx_not_full(&self) -> bool {
        self.usart.isr.is_set(ISR::TXFNF)
    }

    /// Return true if the rx register is not empty (and can be read)
    fn is_data_ready(&mut self) -> Result<bool, Error> {
        let isr = self.usart.isr.extract();

        match check_status_error!(isr) {
            Ok(()) => {}
            Err(error) => {
                self.clear_error_flag(error);
                return Err(error);
            }
        };

        Ok(isr.is_set(ISR::RXFNE))
    }

    fn read_data(&mut self) -> W {
        // NOTE(read_volatile) see `write_volatile` below
        unsafe { ptr::read_volatile(&self.usart.rdr as *const _ as *const W) }
    }

    fn write_data(&mut self, word: W) {
        // NOTE(unsafe) atomic write to stateless register
        // NOTE(write_volatile) 8- or 16-bit write to the data register
        unsafe {
            let tdr = &self.usart.tdr as *const _ as *const UnsafeCell<W>;
            ptr::write_volatile(UnsafeCell::raw_get(tdr), word);
        }
    }

    fn clear_error_flag(&mut self, error: Error) {
        match error {
            Error::Framing => self.usart.icr.write(ICR::FECF::SET),
            Error::Noise => self.usart.icr.write(ICR::NECF::SET),
            Error::Overrun => self.usart.icr.write(ICR::ORECF::SET),
            Error::Parity => self.usart.icr.write(ICR::PECF::SET),
        };
    }

    fn read_if_ready(&mut self, word: &mut W) -> Result<bool, Error> {
        if self.is_data_ready()? {
            *word = self.read_data();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn write_if_ready(&mut self, word: W) -> Result<bool, Error> {
        if self.is_tx_not_full() {
            self.write_data(word);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn is_transmit_complete(&mut self) -> bool {
        self.usart.isr.is_set(ISR::TC)
    }

    fn read_words(&mut self, words: &mut [W]) -> Result<usize, Error> {
        for (i, w) in words.iter_mut().enumerate() {
            if !self.read_if_ready(w)? {
                return Ok(i);
            }
        }
        Ok(words.len())
    }

    fn write_words(&mut self, words: &[W]) -> Result<usize, Error> {
        for (i, w) in words.iter().enumerate() {
            if !self.write_if_ready(*w)? {
                return Ok(i);
            }
        }
        Ok(words.len())
    }
}

/*
 *  HAL Implementations
 */

impl<USART, W: WordBits> io::ErrorType for Serial<USART, W> {
    type Error = Error;
}

impl<USART: Instance> io::Read for Serial<USART, u8> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        let count = loop {
            let count = self.read_words(buf)?;
            if count > 0 {
                break count;
            }
        };
        Ok(count)
    }
}

impl<USART: Instance> io::ReadReady for Serial<USART, u8> {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        self.is_data_ready()
    }
}

impl<USART: Instance> io::Write for Serial<USART, u8> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        let count = loop {
            let count = self.write_words(buf)?;
            if count > 0 {
                break count;
            }
        };
        Ok(count)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while !self.is_transmit_complete() {}
        Ok(())
    }
}

impl<USART: Instance> io::WriteReady for Serial<USART, u8> {
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.is_tx_not_full())
    }
}

impl<USART: Instance> core::fmt::Write for Serial<USART, u8> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        io::Write::write_all(self, s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::config::{Config, InvalidConfig, Oversampling};
    use super::*;
    use crate::gpio::GpioExt;
    use crate::rcc::{RccExt, UsartClkSel};
    use crate::stm32::{sim, GPIOA, RCC, USART1, USART2};
    use crate::time::tests::SteppingClock;
    use crate::time::U32Ext;
    use embedded_io::{Read, Write};

    const RCC_CR: usize = 0x00;
    const RCC_CFGR: usize = 0x08;
    const CR1_OFFSET: usize = 0x00;
    const BRR_OFFSET: usize = 0x0C;
    const ISR_OFFSET: usize = 0x1C;
    const RDR_OFFSET: usize = 0x24;
    const TDR_OFFSET: usize = 0x28;

    #[test]
    fn brr_sixteen_times_oversampling() {
        assert_eq!(brr(16_000_000, 115_200, Oversampling::By16), Ok(0x8B));
        assert_eq!(brr(16_000_000, 9_600, Oversampling::By16), Ok(1667));
        assert_eq!(brr(48_000_000, 1_000_000, Oversampling::By16), Ok(48));
    }

    #[test]
    fn brr_eight_times_oversampling_repacks_fraction() {
        // 2 * 16 MHz / 115200 = 277.8 -> 278 = 0x116
        assert_eq!(brr(16_000_000, 115_200, Oversampling::By8), Ok(0x113));
        // 2 * 32 MHz / 4 Mbaud = 16, nothing to repack
        assert_eq!(brr(32_000_000, 4_000_000, Oversampling::By8), Ok(0x10));
    }

    #[test]
    fn brr_out_of_range_is_rejected() {
        // Divider below 16
        assert_eq!(
            brr(16_000_000, 2_000_000, Oversampling::By16),
            Err(InvalidConfig)
        );
        // Divider above 0xFFFF
        assert_eq!(brr(56_000_000, 300, Oversampling::By16), Err(InvalidConfig));
        assert_eq!(brr(16_000_000, 0, Oversampling::By16), Err(InvalidConfig));
    }

    /// Bring up HSI16 as sys_ck, as freeze does out of reset
    fn hsi16_clocks() -> crate::rcc::Ccdr {
        sim::poke(RCC::ADDRESS, RCC_CR, 1 << 10);
        sim::poke(RCC::ADDRESS, RCC_CFGR, 0b001 << 3);
        unsafe { RCC::steal() }.constrain().freeze()
    }

    #[test]
    fn hsi16_to_usart2_at_115200() {
        let ccdr = hsi16_clocks();
        assert_eq!(ccdr.clocks.pclk().raw(), 16_000_000);

        let gpioa = unsafe { GPIOA::steal() }.split(ccdr.peripheral.GPIOA);
        let tx = gpioa.pa2.into_alternate::<7>();
        let rx = gpioa.pa3.into_alternate::<7>();

        let serial: Serial<USART2> = unsafe { USART2::steal() }
            .serial((tx, rx), 115_200.bps(), ccdr.peripheral.USART2, &ccdr.clocks)
            .unwrap();

        assert_eq!(sim::peek(USART2::ADDRESS, BRR_OFFSET), 0x8B);
        let cr1 = sim::peek(USART2::ADDRESS, CR1_OFFSET);
        // FIFOEN, TE, RE, UE and no OVER8
        assert_eq!(cr1, (1 << 29) | (1 << 3) | (1 << 2) | 1);
        assert_eq!(serial.get_baudrate().raw(), 16_000_000 / 0x8B);
    }

    #[test]
    fn kernel_clock_follows_mux() {
        let ccdr = hsi16_clocks();
        let rec = ccdr.peripheral.USART1.kernel_clk_mux(UsartClkSel::Hsi16);
        let serial: Serial<USART1> = unsafe { USART1::steal() }
            .serial_unchecked(
                Config::new(1_000_000.bps()).oversampling(Oversampling::By8),
                rec,
                &ccdr.clocks,
                false,
            )
            .unwrap();

        // 2 * 16 MHz / 1 Mbaud = 32 = 0x20
        assert_eq!(sim::peek(USART1::ADDRESS, BRR_OFFSET), 0x20);
        assert!(sim::peek(USART1::ADDRESS, CR1_OFFSET) & (1 << 15) != 0);
        assert_eq!(serial.get_baudrate().raw(), 1_000_000);
    }

    #[test]
    fn stopped_kernel_clock_is_rejected() {
        let ccdr = hsi16_clocks();
        let rec = ccdr.peripheral.USART1.kernel_clk_mux(UsartClkSel::Lse);
        let result: Result<Serial<USART1>, _> = unsafe { USART1::steal() }
            .serial_unchecked(115_200.bps(), rec, &ccdr.clocks, false);
        assert!(matches!(result, Err(InvalidConfig)));
    }

    #[test]
    fn nine_bit_words_need_u16() {
        let ccdr = hsi16_clocks();
        let config =
            Config::default().data_width(super::config::WordSize::DataBits9);
        let result: Result<Serial<USART2>, _> = unsafe { USART2::steal() }
            .serial_unchecked(config, ccdr.peripheral.USART2, &ccdr.clocks, false);
        assert!(matches!(result, Err(InvalidConfig)));
    }

    #[test]
    fn enable_waits_for_acknowledge() {
        let ccdr = hsi16_clocks();
        let mut serial: Serial<USART2> = unsafe { USART2::steal() }
            .serial_unchecked(
                115_200.bps(),
                ccdr.peripheral.USART2,
                &ccdr.clocks,
                false,
            )
            .unwrap();
        let clock = SteppingClock::new(1);

        assert_eq!(
            serial.enable(&clock, MilliSeconds::millis(5)),
            Err(Timeout)
        );
        sim::poke(USART2::ADDRESS, ISR_OFFSET, (1 << 21) | (1 << 22));
        assert_eq!(serial.enable(&clock, MilliSeconds::millis(5)), Ok(()));

        // Acknowledge bits never drop in the simulation
        assert_eq!(
            serial.disable(&clock, MilliSeconds::millis(5)),
            Err(Timeout)
        );
        assert!(sim::peek(USART2::ADDRESS, CR1_OFFSET) & 1 != 0);
        sim::poke(USART2::ADDRESS, ISR_OFFSET, 0);
        assert_eq!(serial.disable(&clock, MilliSeconds::millis(5)), Ok(()));
        assert_eq!(sim::peek(USART2::ADDRESS, CR1_OFFSET) & 0b1101, 0);
    }

    #[test]
    fn data_moves_through_fifo_flags() {
        let ccdr = hsi16_clocks();
        let mut serial: Serial<USART2> = unsafe { USART2::steal() }
            .serial_unchecked(
                115_200.bps(),
                ccdr.peripheral.USART2,
                &ccdr.clocks,
                false,
            )
            .unwrap();

        // TXFNF
        sim::poke(USART2::ADDRESS, ISR_OFFSET, 1 << 7);
        assert_eq!(serial.write(b"A"), Ok(1));
        assert_eq!(sim::peek(USART2::ADDRESS, TDR_OFFSET), b'A' as u32);

        // RXFNE
        sim::poke(USART2::ADDRESS, RDR_OFFSET, b'z' as u32);
        sim::poke(USART2::ADDRESS, ISR_OFFSET, 1 << 5);
        let mut buf = [0u8; 1];
        assert_eq!(serial.read(&mut buf), Ok(1));
        assert_eq!(&buf, b"z");

        // Overrun is reported and cleared
        sim::poke(USART2::ADDRESS, ISR_OFFSET, 1 << 3);
        assert_eq!(serial.read(&mut buf), Err(Error::Overrun));
    }

    #[test]
    fn listen_sets_interrupt_enables() {
        let ccdr = hsi16_clocks();
        let mut serial: Serial<USART2> = unsafe { USART2::steal() }
            .serial_unchecked(
                115_200.bps(),
                ccdr.peripheral.USART2,
                &ccdr.clocks,
                false,
            )
            .unwrap();
        serial.listen(Event::RxNotEmpty);
        serial.listen(Event::Idle);
        let cr1 = sim::peek(USART2::ADDRESS, CR1_OFFSET);
        assert_eq!(cr1 & ((1 << 5) | (1 << 4)), (1 << 5) | (1 << 4));
        serial.unlisten(Event::RxNotEmpty);
        assert_eq!(sim::peek(USART2::ADDRESS, CR1_OFFSET) & (1 << 5), 0);
    }
}
