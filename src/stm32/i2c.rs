//! Inter-integrated circuit interface (RM0503 section 32.9)

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        (0x000 => pub cr1: ReadWrite<u32, CR1::Register>),
        (0x004 => pub cr2: ReadWrite<u32, CR2::Register>),
        (0x008 => pub oar1: ReadWrite<u32, OAR1::Register>),
        (0x00C => pub oar2: ReadWrite<u32>),
        (0x010 => pub timingr: ReadWrite<u32, TIMINGR::Register>),
        (0x014 => pub timeoutr: ReadWrite<u32>),
        (0x018 => pub isr: ReadWrite<u32, ISR::Register>),
        (0x01C => pub icr: WriteOnly<u32, ICR::Register>),
        (0x020 => pub pecr: ReadOnly<u32>),
        (0x024 => pub rxdr: ReadOnly<u32>),
        (0x028 => pub txdr: ReadWrite<u32>),
        (0x02C => @END),
    }
}

register_bitfields![u32,
    pub CR1 [
        PE OFFSET(0) NUMBITS(1) [],
        TXIE OFFSET(1) NUMBITS(1) [],
        RXIE OFFSET(2) NUMBITS(1) [],
        ADDRIE OFFSET(3) NUMBITS(1) [],
        NACKIE OFFSET(4) NUMBITS(1) [],
        STOPIE OFFSET(5) NUMBITS(1) [],
        TCIE OFFSET(6) NUMBITS(1) [],
        ERRIE OFFSET(7) NUMBITS(1) [],
        DNF OFFSET(8) NUMBITS(4) [],
        ANFOFF OFFSET(12) NUMBITS(1) [],
        TXDMAEN OFFSET(14) NUMBITS(1) [],
        RXDMAEN OFFSET(15) NUMBITS(1) [],
        SBC OFFSET(16) NUMBITS(1) [],
        NOSTRETCH OFFSET(17) NUMBITS(1) []
    ],
    pub CR2 [
        SADD OFFSET(0) NUMBITS(10) [],
        RD_WRN OFFSET(10) NUMBITS(1) [
            Write = 0,
            Read = 1
        ],
        ADD10 OFFSET(11) NUMBITS(1) [],
        HEAD10R OFFSET(12) NUMBITS(1) [],
        START OFFSET(13) NUMBITS(1) [],
        STOP OFFSET(14) NUMBITS(1) [],
        NACK OFFSET(15) NUMBITS(1) [],
        NBYTES OFFSET(16) NUMBITS(8) [],
        RELOAD OFFSET(24) NUMBITS(1) [],
        AUTOEND OFFSET(25) NUMBITS(1) []
    ],
    pub OAR1 [
        OA1 OFFSET(0) NUMBITS(10) [],
        OA1MODE OFFSET(10) NUMBITS(1) [],
        OA1EN OFFSET(15) NUMBITS(1) []
    ],
    pub TIMINGR [
        SCLL OFFSET(0) NUMBITS(8) [],
        SCLH OFFSET(8) NUMBITS(8) [],
        SDADEL OFFSET(16) NUMBITS(4) [],
        SCLDEL OFFSET(20) NUMBITS(4) [],
        PRESC OFFSET(28) NUMBITS(4) []
    ],
    pub ISR [
        TXE OFFSET(0) NUMBITS(1) [],
        TXIS OFFSET(1) NUMBITS(1) [],
        RXNE OFFSET(2) NUMBITS(1) [],
        ADDR OFFSET(3) NUMBITS(1) [],
        NACKF OFFSET(4) NUMBITS(1) [],
        STOPF OFFSET(5) NUMBITS(1) [],
        TC OFFSET(6) NUMBITS(1) [],
        TCR OFFSET(7) NUMBITS(1) [],
        BERR OFFSET(8) NUMBITS(1) [],
        ARLO OFFSET(9) NUMBITS(1) [],
        OVR OFFSET(10) NUMBITS(1) [],
        PECERR OFFSET(11) NUMBITS(1) [],
        TIMEOUT OFFSET(12) NUMBITS(1) [],
        ALERT OFFSET(13) NUMBITS(1) [],
        BUSY OFFSET(15) NUMBITS(1) [],
        DIR OFFSET(16) NUMBITS(1) [],
        ADDCODE OFFSET(17) NUMBITS(7) []
    ],
    pub ICR [
        ADDRCF OFFSET(3) NUMBITS(1) [],
        NACKCF OFFSET(4) NUMBITS(1) [],
        STOPCF OFFSET(5) NUMBITS(1) [],
        BERRCF OFFSET(8) NUMBITS(1) [],
        ARLOCF OFFSET(9) NUMBITS(1) [],
        OVRCF OFFSET(10) NUMBITS(1) [],
        PECCF OFFSET(11) NUMBITS(1) [],
        TIMOUTCF OFFSET(12) NUMBITS(1) [],
        ALERTCF OFFSET(13) NUMBITS(1) []
    ]
];
