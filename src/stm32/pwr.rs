//! Power control (RM0503 section 6.4)

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        (0x000 => pub cr1: ReadWrite<u32, CR1::Register>),
        (0x004 => @END),
    }
}

register_bitfields![u32,
    pub CR1 [
        LPMS OFFSET(0) NUMBITS(3) [],
        FPD_STOP OFFSET(3) NUMBITS(1) [],
        FPD_LPRUN OFFSET(4) NUMBITS(1) [],
        FPD_LPSLP OFFSET(5) NUMBITS(1) [],
        /// Disable backup domain write protection
        DBP OFFSET(8) NUMBITS(1) [],
        VOS OFFSET(9) NUMBITS(2) [],
        LPR OFFSET(14) NUMBITS(1) []
    ]
];
