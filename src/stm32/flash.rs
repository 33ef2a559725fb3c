//! Embedded flash memory interface (RM0503 section 3.7)

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        (0x000 => pub acr: ReadWrite<u32, ACR::Register>),
        (0x004 => @END),
    }
}

register_bitfields![u32,
    pub ACR [
        LATENCY OFFSET(0) NUMBITS(3) [],
        PRFTEN OFFSET(8) NUMBITS(1) [],
        ICEN OFFSET(9) NUMBITS(1) [],
        ICRST OFFSET(11) NUMBITS(1) [],
        EMPTY OFFSET(16) NUMBITS(1) [],
        DBG_SWEN OFFSET(18) NUMBITS(1) []
    ]
];
