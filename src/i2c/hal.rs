use embedded_hal::i2c;

use super::*;

impl i2c::Error for Error {
    fn kind(&self) -> i2c::ErrorKind {
        match self {
            Error::Bus => i2c::ErrorKind::Bus,
            Error::Arbitration => i2c::ErrorKind::ArbitrationLoss,
            // NACKF does not tell address from data
            Error::NotAcknowledge => {
                i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Unknown)
            }
        }
    }
}

impl<I2C> i2c::ErrorType for I2c<I2C> {
    type Error = Error;
}

trait OperationExt {
    fn direction(&self) -> Direction;
    fn length(&self) -> usize;
}

impl OperationExt for i2c::Operation<'_> {
    fn direction(&self) -> Direction {
        match self {
            Self::Read(_) => Direction::Read,
            Self::Write(_) => Direction::Write,
        }
    }

    fn length(&self) -> usize {
        match self {
            Self::Read(b) => b.len(),
            Self::Write(b) => b.len(),
        }
    }
}

impl<I2C: Instance> I2c<I2C> {
    fn process_operation(
        &mut self,
        stop: Stop,
        op: &mut i2c::Operation<'_>,
    ) -> Result<(), Error> {
        self.wait_for_start_sequence_complete()?;

        match op {
            i2c::Operation::Read(buffer) => self.read_all(buffer)?,
            i2c::Operation::Write(data) => self.write_all(data)?,
        }

        match stop {
            Stop::RepeatStart => self.wait_for_transmit_complete(),
            Stop::Reload => self.wait_for_reload_ready(),
            Stop::Automatic => self.wait_for_stop(),
        }
    }

    fn transaction(
        &mut self,
        address: u16,
        address_mode: AddressMode,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Error> {
        let mut reload = false;
        for i in 0..operations.len() {
            // The next operation decides how this one ends
            let op = &operations[i];
            let is_last_op = i == operations.len() - 1;
            let stop = if is_last_op {
                Stop::Automatic
            } else {
                let next_op = &operations[i + 1];
                if core::mem::discriminant(op)
                    == core::mem::discriminant(next_op)
                {
                    // Same direction: continue without a repeat start
                    Stop::Reload
                } else {
                    Stop::RepeatStart
                }
            };

            if i == 0 {
                self.start(
                    address,
                    address_mode,
                    op.length(),
                    op.direction(),
                    stop,
                );
            } else if reload {
                self.reload(op.length(), op.direction(), stop)
            } else {
                self.repeat_start(
                    address,
                    address_mode,
                    op.length(),
                    op.direction(),
                    stop,
                );
            }
            reload = stop == Stop::Reload;

            let result = self.process_operation(stop, &mut operations[i]);

            if let Err(error) = result {
                // A NACK ends the transfer with an automatic STOP; wait for
                // it so the next transaction starts on an idle bus
                if error == Error::NotAcknowledge {
                    while !self.i2c.isr.is_set(ISR::STOPF) {}
                    self.i2c.icr.write(ICR::STOPCF::SET);
                }
                return Err(error);
            }
        }

        Ok(())
    }
}

impl<I2C: Instance> i2c::I2c<i2c::SevenBitAddress> for I2c<I2C> {
    fn transaction(
        &mut self,
        address: i2c::SevenBitAddress,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        I2c::transaction(
            self,
            address as u16,
            AddressMode::AddressMode7bit,
            operations,
        )
    }
}

impl<I2C: Instance> i2c::I2c<i2c::TenBitAddress> for I2c<I2C> {
    fn transaction(
        &mut self,
        address: i2c::TenBitAddress,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        I2c::transaction(
            self,
            address,
            AddressMode::AddressMode10bit,
            operations,
        )
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal::i2c::I2c as _;

    use super::*;
    use crate::rcc::RccExt;
    use crate::stm32::{sim, I2C2, RCC};

    const CR2_OFFSET: usize = 0x04;
    const ISR_OFFSET: usize = 0x18;
    const ICR_OFFSET: usize = 0x1C;

    fn i2c2() -> I2c<I2C2> {
        sim::poke(RCC::ADDRESS, 0x00, 1 << 10);
        sim::poke(RCC::ADDRESS, 0x08, 0b001 << 3);
        let ccdr = unsafe { RCC::steal() }.constrain().freeze();
        unsafe { I2C2::steal() }.i2c_unchecked(
            Mode::Standard,
            ccdr.peripheral.I2C2,
            &ccdr.clocks,
        )
    }

    #[test]
    fn address_nack_is_reported() {
        let mut i2c = i2c2();
        // TXE, NACKF and the STOPF that follows it
        sim::poke(I2C2::ADDRESS, ISR_OFFSET, 1 | (1 << 4) | (1 << 5));

        assert_eq!(
            i2c.write(0x18u8, &[0x11, 0x22]),
            Err(Error::NotAcknowledge)
        );

        let cr2 = sim::peek(I2C2::ADDRESS, CR2_OFFSET);
        // SADD, write, NBYTES 2, START and AUTOEND
        assert_eq!(cr2, (0x18 << 1) | (2 << 16) | (1 << 13) | (1 << 25));
        // STOPCF is the last flag cleared
        assert_eq!(sim::peek(I2C2::ADDRESS, ICR_OFFSET), 1 << 5);
    }

    #[test]
    fn bus_errors_map_to_error_kinds() {
        use embedded_hal::i2c::{Error as _, ErrorKind};

        let mut i2c = i2c2();
        sim::poke(I2C2::ADDRESS, ISR_OFFSET, 1 << 8);
        let err = i2c.read(0x50u8, &mut [0u8; 1]).unwrap_err();
        assert_eq!(err, Error::Bus);
        assert_eq!(err.kind(), ErrorKind::Bus);
        assert_eq!(sim::peek(I2C2::ADDRESS, ICR_OFFSET), 1 << 8);

        sim::poke(I2C2::ADDRESS, ISR_OFFSET, 1 << 9);
        let err = i2c.write_read(0x50u8, &[0], &mut [0u8; 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArbitrationLoss);
    }

    #[test]
    fn ten_bit_read_sets_address_mode() {
        let mut i2c = i2c2();
        sim::poke(I2C2::ADDRESS, ISR_OFFSET, 1 << 8);
        let _ = i2c::I2c::<i2c::TenBitAddress>::read(
            &mut i2c,
            0x2A5,
            &mut [0u8; 3],
        );

        let cr2 = sim::peek(I2C2::ADDRESS, CR2_OFFSET);
        // 10-bit SADD unshifted, read, ADD10
        assert_eq!(cr2 & 0x3FF, 0x2A5);
        assert_ne!(cr2 & (1 << 10), 0);
        assert_ne!(cr2 & (1 << 11), 0);
        assert_eq!((cr2 >> 16) & 0xFF, 3);
    }
}
