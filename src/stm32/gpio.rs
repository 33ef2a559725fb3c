//! General-purpose I/O ports (RM0503 section 7.4)
//!
//! Every port has the same layout. Per-pin fields are addressed at run time
//! through [`pin_field`], as the pin number is a const generic of the HAL
//! pin types.

use tock_registers::fields::FieldValue;
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs, RegisterLongName};

register_structs! {
    pub RegisterBlock {
        (0x000 => pub moder: ReadWrite<u32, MODER::Register>),
        (0x004 => pub otyper: ReadWrite<u32, OTYPER::Register>),
        (0x008 => pub ospeedr: ReadWrite<u32, OSPEEDR::Register>),
        (0x00C => pub pupdr: ReadWrite<u32, PUPDR::Register>),
        (0x010 => pub idr: ReadOnly<u32>),
        (0x014 => pub odr: ReadWrite<u32>),
        (0x018 => pub bsrr: WriteOnly<u32>),
        (0x01C => pub lckr: ReadWrite<u32>),
        (0x020 => pub afrl: ReadWrite<u32, AFR::Register>),
        (0x024 => pub afrh: ReadWrite<u32, AFR::Register>),
        (0x028 => pub brr: WriteOnly<u32>),
        (0x02C => @END),
    }
}

register_bitfields![u32,
    pub MODER [
        /// Mode of pin 0, the other pins follow at two bits per pin
        MODE0 OFFSET(0) NUMBITS(2) [
            Input = 0b00,
            Output = 0b01,
            Alternate = 0b10,
            Analog = 0b11
        ]
    ],
    pub OTYPER [
        OT0 OFFSET(0) NUMBITS(1) [
            PushPull = 0,
            OpenDrain = 1
        ]
    ],
    pub OSPEEDR [
        OSPEED0 OFFSET(0) NUMBITS(2) []
    ],
    pub PUPDR [
        PUPD0 OFFSET(0) NUMBITS(2) [
            Floating = 0b00,
            PullUp = 0b01,
            PullDown = 0b10
        ]
    ],
    pub AFR [
        AFSEL0 OFFSET(0) NUMBITS(4) []
    ]
];

/// Field value for pin `n` of a register holding `width` bits per pin
#[inline(always)]
pub const fn pin_field<R: RegisterLongName>(
    n: u8,
    width: usize,
    value: u32,
) -> FieldValue<u32, R> {
    FieldValue::<u32, R>::new((1 << width) - 1, n as usize * width, value)
}
