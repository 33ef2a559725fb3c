use core::marker::PhantomData;

use crate::gpio::{self, Alternate, OpenDrain};
use crate::rcc::{rec, CoreClocks, I2cClkSel};
use crate::stm32::{i2c, I2C1, I2C2};
use crate::time::Hertz;

use super::{Instance, PinScl, PinSda};

macro_rules! pins {
    ($($I2CX:ty: SCL: [$($SCL:ty),*] SDA: [$($SDA:ty),*])+) => {
        $(
            $(
                impl PinScl<$I2CX> for $SCL { }
            )*
            $(
                impl PinSda<$I2CX> for $SDA { }
            )*
        )+
    }
}

// Implemented by all I2C instances
macro_rules! i2c {
    ($I2CX:ident: $I2cX:ident, $($clk:tt)+) => {
        impl Instance for $I2CX {
            type Rec = rec::$I2cX;

            fn ptr() -> *const i2c::RegisterBlock {
                <$I2CX>::ptr()
            }

            fn clock(clocks: &CoreClocks) -> Option<Hertz> {
                i2c!(@clock $I2CX, clocks, $($clk)+)
            }

            fn rec() -> Self::Rec {
                rec::$I2cX { _marker: PhantomData }
            }
        }

        impl crate::Sealed for $I2CX {}
    };
    // Kernel clock selected in CCIPR, 0b11 is reserved
    (@clock $I2CX:ident, $clocks:ident, mux) => {
        match <$I2CX as Instance>::rec().get_kernel_clk_mux() {
            Some(I2cClkSel::Pclk) => Some($clocks.pclk()),
            Some(I2cClkSel::Sysclk) => Some($clocks.sys_ck()),
            Some(I2cClkSel::Hsi16) => $clocks.hsi16_ck(),
            None => None,
        }
    };
    (@clock $I2CX:ident, $clocks:ident, pclk) => {
        Some($clocks.pclk())
    };
}

pins! {
    I2C1:
        SCL: [
            gpio::PA9<Alternate<4, OpenDrain>>,
            gpio::PB6<Alternate<4, OpenDrain>>,
            gpio::PB8<Alternate<4, OpenDrain>>
        ]

        SDA: [
            gpio::PA10<Alternate<4, OpenDrain>>,
            gpio::PB7<Alternate<4, OpenDrain>>,
            gpio::PB9<Alternate<4, OpenDrain>>
        ]

    I2C2:
        SCL: [
            gpio::PA11<Alternate<6, OpenDrain>>,
            gpio::PB10<Alternate<4, OpenDrain>>,
            gpio::PB13<Alternate<6, OpenDrain>>
        ]

        SDA: [
            gpio::PA12<Alternate<6, OpenDrain>>,
            gpio::PB11<Alternate<4, OpenDrain>>,
            gpio::PB14<Alternate<6, OpenDrain>>
        ]
}

i2c! { I2C1: I2c1, mux }
i2c! { I2C2: I2c2, pclk }

#[cfg(feature = "u0x3")]
mod u0x3 {
    use crate::stm32::I2C3;

    use super::*;

    pins! {
        I2C3:
            SCL: [
                gpio::PA7<Alternate<4, OpenDrain>>,
                gpio::PB3<Alternate<4, OpenDrain>>,
                gpio::PC0<Alternate<4, OpenDrain>>
            ]

            SDA: [
                gpio::PB4<Alternate<4, OpenDrain>>,
                gpio::PC1<Alternate<4, OpenDrain>>
            ]
    }

    i2c! { I2C3: I2c3, mux }
}
