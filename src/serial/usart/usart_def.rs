use core::marker::PhantomData;

use crate::gpio::{self, Alternate};
use crate::rcc::{rec, CoreClocks, UsartClkSel};
use crate::stm32::{usart, USART1, USART2};
use crate::time::Hertz;

use super::{Instance, InstanceClock, NoCk, NoRx, NoTx, PinCk, PinRx, PinTx};

macro_rules! usart_pins {
    ($($USARTX:ty: TX: [$($TX:ty),*] RX: [$($RX:ty),*] CK: [$($CK:ty),*])+) => {
        $(
            $(
                impl PinTx<$USARTX> for $TX {}
            )*
            $(
                impl PinRx<$USARTX> for $RX {}
            )*
            $(
                impl PinCk<$USARTX> for $CK {}
            )*
        )+
    }
}

macro_rules! instance_clock {
    // Kernel clock selected in CCIPR
    ($USARTX:ident: mux) => {
        impl InstanceClock for $USARTX {
            fn clock(clocks: &CoreClocks) -> Option<Hertz> {
                match <$USARTX as Instance>::rec().get_kernel_clk_mux() {
                    UsartClkSel::Pclk => Some(clocks.pclk()),
                    UsartClkSel::Sysclk => Some(clocks.sys_ck()),
                    UsartClkSel::Hsi16 => clocks.hsi16_ck(),
                    UsartClkSel::Lse => clocks.lse_ck(),
                }
            }
        }
    };
    // Kernel clock fixed to pclk
    ($USARTX:ident: pclk) => {
        impl InstanceClock for $USARTX {
            fn clock(clocks: &CoreClocks) -> Option<Hertz> {
                Some(clocks.pclk())
            }
        }
    };
}

// Implemented by all USART instances
macro_rules! instances {
    ($($USARTX:ident),+) => { paste::item! {
        $(
            impl Instance for $USARTX {
                type Rec = rec::[<$USARTX:camel>];

                fn ptr() -> *const usart::RegisterBlock {
                    <$USARTX>::ptr()
                }

                fn rec() -> Self::Rec {
                    rec::[< $USARTX:camel >] { _marker: PhantomData }
                }
            }

            impl crate::Sealed for $USARTX {}
        )+
    }};
}

instances!(USART1, USART2);

instance_clock!(USART1: mux);
instance_clock!(USART2: mux);

usart_pins! {
    USART1:
        TX: [
            NoTx,
            gpio::PA9<Alternate<7>>,
            gpio::PB6<Alternate<7>>
        ]
        RX: [
            NoRx,
            gpio::PA10<Alternate<7>>,
            gpio::PB7<Alternate<7>>
        ]
        CK: [
            NoCk,
            gpio::PA8<Alternate<7>>
        ]
    USART2:
        TX: [
            NoTx,
            gpio::PA2<Alternate<7>>,
            gpio::PA14<Alternate<7>>,
            gpio::PD5<Alternate<7>>
        ]
        RX: [
            NoRx,
            gpio::PA3<Alternate<7>>,
            gpio::PA15<Alternate<7>>,
            gpio::PD6<Alternate<7>>
        ]
        CK: [
            NoCk,
            gpio::PA4<Alternate<7>>,
            gpio::PD4<Alternate<7>>
        ]
}

#[cfg(feature = "u0x3")]
mod u0x3 {
    use crate::stm32::{USART3, USART4};

    use super::*;

    instances!(USART3, USART4);

    instance_clock!(USART3: pclk);
    instance_clock!(USART4: pclk);

    usart_pins! {
        USART3:
            TX: [
                NoTx,
                gpio::PB10<Alternate<7>>,
                gpio::PC4<Alternate<7>>,
                gpio::PD8<Alternate<7>>
            ]
            RX: [
                NoRx,
                gpio::PB11<Alternate<7>>,
                gpio::PC5<Alternate<7>>,
                gpio::PD9<Alternate<7>>
            ]
            CK: [
                NoCk,
                gpio::PB12<Alternate<7>>
            ]
        USART4:
            TX: [
                NoTx,
                gpio::PA0<Alternate<8>>,
                gpio::PC10<Alternate<8>>
            ]
            RX: [
                NoRx,
                gpio::PA1<Alternate<8>>,
                gpio::PC11<Alternate<8>>
            ]
            CK: [
                NoCk,
                gpio::PC12<Alternate<8>>
            ]
    }
}
