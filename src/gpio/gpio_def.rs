use super::Gpio;

macro_rules! gpio {
    ($GPIOX:ident, $gpiox:ident, $Rec:ident, $port_id:expr, [
        $($PXi:ident: ($pxi:ident, $i:expr, [$($A:literal),*] $(, $MODE:ty)?),)+
    ]) => {
        #[doc=concat!("Port ", $port_id)]
        pub mod $gpiox {
            use crate::stm32::$GPIOX;
            use crate::rcc::{rec, ResetEnable};

            /// GPIO parts
            pub struct Parts {
                $(
                    /// Pin
                    pub $pxi: $PXi $(<$MODE>)?,
                )+
            }

            impl crate::gpio::GpioExt for $GPIOX {
                type Parts = Parts;
                type Rec = rec::$Rec;

                fn split(self, prec: rec::$Rec) -> Parts {
                    prec.enable().reset();

                    Parts {
                        $(
                            $pxi: $PXi::new(),
                        )+
                    }
                }

                fn split_without_reset(self, prec: rec::$Rec) -> Parts {
                    prec.enable();

                    Parts {
                        $(
                            $pxi: $PXi::new(),
                        )+
                    }
                }
            }

            $(
                #[doc=concat!("P", $port_id, $i, " pin")]
                pub type $PXi<MODE = crate::gpio::Analog> = crate::gpio::Pin<$port_id, $i, MODE>;

                $(
                    impl<MODE> crate::gpio::marker::IntoAf<$A> for $PXi<MODE> { }
                )*
            )+

        }

        pub use $gpiox::{ $($PXi,)+ };
    }
}

#[cfg(any(feature = "gpio-u031", feature = "gpio-u0x3"))]
pub use u0::*;

#[cfg(any(feature = "gpio-u031", feature = "gpio-u0x3"))]
mod u0 {
    use super::Gpio;

    gpio!(GPIOA, gpioa, Gpioa, 'A', [
        PA0: (pa0, 0, [1, 2, 3, 6, 7, 8, 12, 14, 15]),
        PA1: (pa1, 1, [0, 1, 2, 3, 4, 6, 7, 8, 12, 14, 15]),
        PA2: (pa2, 2, [1, 2, 3, 5, 6, 7, 8, 12, 14, 15]),
        PA3: (pa3, 3, [1, 2, 3, 5, 6, 7, 8, 12, 14, 15]),
        PA4: (pa4, 4, [0, 1, 2, 3, 5, 6, 7, 8, 11, 12, 14, 15]),
        PA5: (pa5, 5, [0, 1, 2, 3, 5, 6, 7, 8, 11, 12, 14, 15]),
        PA6: (pa6, 6, [0, 1, 2, 3, 5, 6, 7, 8, 11, 12, 14, 15]),
        PA7: (pa7, 7, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PA8: (pa8, 8, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15]),
        PA9: (pa9, 9, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 14, 15]),
        PA10: (pa10, 10, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 14, 15]),
        PA11: (pa11, 11, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 14, 15]),
        PA12: (pa12, 12, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 14, 15]),
        PA13: (pa13, 13, [0, 1, 3, 6, 7, 8, 12, 15], crate::gpio::Debugger),
        PA14: (pa14, 14, [0, 1, 3, 6, 7, 8, 12, 15], crate::gpio::Debugger),
        PA15: (pa15, 15, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 12, 14, 15]),
    ]);

    gpio!(GPIOB, gpiob, Gpiob, 'B', [
        PB0: (pb0, 0, [0, 1, 2, 3, 5, 6, 8, 11, 12, 14, 15]),
        PB1: (pb1, 1, [0, 1, 2, 3, 5, 6, 8, 11, 12, 14, 15]),
        PB2: (pb2, 2, [0, 1, 3, 5, 6, 8, 12, 15]),
        PB3: (pb3, 3, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB4: (pb4, 4, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB5: (pb5, 5, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB6: (pb6, 6, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15]),
        PB7: (pb7, 7, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14, 15]),
        PB8: (pb8, 8, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 14, 15]),
        PB9: (pb9, 9, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 11, 12, 14, 15]),
        PB10: (pb10, 10, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB11: (pb11, 11, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB12: (pb12, 12, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB13: (pb13, 13, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB14: (pb14, 14, [0, 1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 14, 15]),
        PB15: (pb15, 15, [0, 1, 2, 3, 5, 6, 7, 8, 11, 12, 14, 15]),
    ]);

    gpio!(GPIOC, gpioc, Gpioc, 'C', [
        PC0: (pc0, 0, [0, 1, 2, 3, 4, 6, 8, 12, 14, 15]),
        PC1: (pc1, 1, [0, 1, 2, 3, 4, 6, 8, 12, 14, 15]),
        PC2: (pc2, 2, [0, 1, 2, 3, 5, 6, 8, 12, 15]),
        PC3: (pc3, 3, [0, 1, 2, 3, 5, 6, 8, 12, 15]),
        PC4: (pc4, 4, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PC5: (pc5, 5, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PC6: (pc6, 6, [0, 1, 2, 3, 5, 6, 8, 11, 12, 15]),
        PC7: (pc7, 7, [0, 1, 2, 3, 5, 6, 8, 11, 12, 15]),
        PC8: (pc8, 8, [0, 1, 2, 3, 5, 6, 8, 11, 12, 15]),
        PC9: (pc9, 9, [0, 1, 2, 3, 5, 6, 8, 10, 11, 12, 15]),
        PC10: (pc10, 10, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PC11: (pc11, 11, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PC12: (pc12, 12, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PC13: (pc13, 13, [0, 3, 15]),
        PC14: (pc14, 14, [15]),
        PC15: (pc15, 15, [15]),
    ]);

    gpio!(GPIOD, gpiod, Gpiod, 'D', [
        PD0: (pd0, 0, [0, 1, 2, 3, 6, 8, 12, 15]),
        PD1: (pd1, 1, [0, 1, 2, 3, 6, 8, 12, 15]),
        PD2: (pd2, 2, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PD3: (pd3, 3, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PD4: (pd4, 4, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PD5: (pd5, 5, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PD6: (pd6, 6, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PD8: (pd8, 8, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
        PD9: (pd9, 9, [0, 1, 2, 3, 6, 7, 8, 12, 15]),
    ]);

    #[cfg(feature = "gpio-u0x3")]
    gpio!(GPIOE, gpioe, Gpioe, 'E', [
        PE3: (pe3, 3, [0, 1, 2, 12, 15]),
        PE7: (pe7, 7, [0, 1, 2, 12, 15]),
        PE8: (pe8, 8, [0, 1, 2, 12, 15]),
        PE9: (pe9, 9, [0, 1, 2, 12, 15]),
    ]);

    gpio!(GPIOF, gpiof, Gpiof, 'F', [
        PF0: (pf0, 0, [0, 1, 2, 15]),
        PF1: (pf1, 1, [0, 1, 2, 15]),
        PF2: (pf2, 2, [0, 1, 15]),
        PF3: (pf3, 3, [0, 1, 2, 3, 12, 15]),
    ]);

    impl<const P: char> Gpio<P> {
        pub(crate) fn ptr() -> *const crate::stm32::gpio::RegisterBlock {
            match P {
                'A' => crate::stm32::GPIOA::ptr(),
                'B' => crate::stm32::GPIOB::ptr(),
                'C' => crate::stm32::GPIOC::ptr(),
                'D' => crate::stm32::GPIOD::ptr(),
                #[cfg(feature = "gpio-u0x3")]
                'E' => crate::stm32::GPIOE::ptr(),
                'F' => crate::stm32::GPIOF::ptr(),
                _ => panic!("Unknown GPIO port"),
            }
        }
    }
}
