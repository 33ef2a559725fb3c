//! Universal synchronous/asynchronous receiver transmitter (RM0503 section 33.8)

use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        (0x000 => pub cr1: ReadWrite<u32, CR1::Register>),
        (0x004 => pub cr2: ReadWrite<u32, CR2::Register>),
        (0x008 => pub cr3: ReadWrite<u32, CR3::Register>),
        (0x00C => pub brr: ReadWrite<u32>),
        (0x010 => pub gtpr: ReadWrite<u32>),
        (0x014 => pub rtor: ReadWrite<u32>),
        (0x018 => pub rqr: WriteOnly<u32, RQR::Register>),
        (0x01C => pub isr: ReadOnly<u32, ISR::Register>),
        (0x020 => pub icr: WriteOnly<u32, ICR::Register>),
        (0x024 => pub rdr: ReadOnly<u32>),
        (0x028 => pub tdr: ReadWrite<u32>),
        (0x02C => pub presc: ReadWrite<u32, PRESC::Register>),
        (0x030 => @END),
    }
}

register_bitfields![u32,
    pub CR1 [
        UE OFFSET(0) NUMBITS(1) [],
        UESM OFFSET(1) NUMBITS(1) [],
        RE OFFSET(2) NUMBITS(1) [],
        TE OFFSET(3) NUMBITS(1) [],
        IDLEIE OFFSET(4) NUMBITS(1) [],
        RXNEIE OFFSET(5) NUMBITS(1) [],
        TCIE OFFSET(6) NUMBITS(1) [],
        TXEIE OFFSET(7) NUMBITS(1) [],
        PEIE OFFSET(8) NUMBITS(1) [],
        PS OFFSET(9) NUMBITS(1) [
            Even = 0,
            Odd = 1
        ],
        PCE OFFSET(10) NUMBITS(1) [],
        WAKE OFFSET(11) NUMBITS(1) [],
        M0 OFFSET(12) NUMBITS(1) [],
        MME OFFSET(13) NUMBITS(1) [],
        CMIE OFFSET(14) NUMBITS(1) [],
        OVER8 OFFSET(15) NUMBITS(1) [],
        RTOIE OFFSET(26) NUMBITS(1) [],
        EOBIE OFFSET(27) NUMBITS(1) [],
        M1 OFFSET(28) NUMBITS(1) [],
        FIFOEN OFFSET(29) NUMBITS(1) [],
        TXFEIE OFFSET(30) NUMBITS(1) [],
        RXFFIE OFFSET(31) NUMBITS(1) []
    ],
    pub CR2 [
        LBDL OFFSET(5) NUMBITS(1) [],
        LBDIE OFFSET(6) NUMBITS(1) [],
        LBCL OFFSET(8) NUMBITS(1) [],
        CPHA OFFSET(9) NUMBITS(1) [],
        CPOL OFFSET(10) NUMBITS(1) [],
        CLKEN OFFSET(11) NUMBITS(1) [],
        STOP OFFSET(12) NUMBITS(2) [
            Stop1 = 0b00,
            Stop0p5 = 0b01,
            Stop2 = 0b10,
            Stop1p5 = 0b11
        ],
        LINEN OFFSET(14) NUMBITS(1) [],
        SWAP OFFSET(15) NUMBITS(1) [],
        RXINV OFFSET(16) NUMBITS(1) [],
        TXINV OFFSET(17) NUMBITS(1) [],
        DATAINV OFFSET(18) NUMBITS(1) [],
        MSBFIRST OFFSET(19) NUMBITS(1) []
    ],
    pub CR3 [
        EIE OFFSET(0) NUMBITS(1) [],
        HDSEL OFFSET(3) NUMBITS(1) [],
        DMAR OFFSET(6) NUMBITS(1) [],
        DMAT OFFSET(7) NUMBITS(1) [],
        RTSE OFFSET(8) NUMBITS(1) [],
        CTSE OFFSET(9) NUMBITS(1) [],
        CTSIE OFFSET(10) NUMBITS(1) [],
        OVRDIS OFFSET(12) NUMBITS(1) [],
        DEM OFFSET(14) NUMBITS(1) [],
        TXFTIE OFFSET(23) NUMBITS(1) [],
        RXFTCFG OFFSET(25) NUMBITS(3) [],
        RXFTIE OFFSET(28) NUMBITS(1) [],
        TXFTCFG OFFSET(29) NUMBITS(3) []
    ],
    pub RQR [
        ABRRQ OFFSET(0) NUMBITS(1) [],
        SBKRQ OFFSET(1) NUMBITS(1) [],
        MMRQ OFFSET(2) NUMBITS(1) [],
        RXFRQ OFFSET(3) NUMBITS(1) [],
        TXFRQ OFFSET(4) NUMBITS(1) []
    ],
    pub ISR [
        PE OFFSET(0) NUMBITS(1) [],
        FE OFFSET(1) NUMBITS(1) [],
        NE OFFSET(2) NUMBITS(1) [],
        ORE OFFSET(3) NUMBITS(1) [],
        IDLE OFFSET(4) NUMBITS(1) [],
        RXFNE OFFSET(5) NUMBITS(1) [],
        TC OFFSET(6) NUMBITS(1) [],
        TXFNF OFFSET(7) NUMBITS(1) [],
        LBDF OFFSET(8) NUMBITS(1) [],
        CTSIF OFFSET(9) NUMBITS(1) [],
        CTS OFFSET(10) NUMBITS(1) [],
        RTOF OFFSET(11) NUMBITS(1) [],
        BUSY OFFSET(16) NUMBITS(1) [],
        TEACK OFFSET(21) NUMBITS(1) [],
        REACK OFFSET(22) NUMBITS(1) [],
        TXFE OFFSET(23) NUMBITS(1) [],
        RXFF OFFSET(24) NUMBITS(1) [],
        RXFT OFFSET(26) NUMBITS(1) [],
        TXFT OFFSET(27) NUMBITS(1) []
    ],
    pub ICR [
        PECF OFFSET(0) NUMBITS(1) [],
        FECF OFFSET(1) NUMBITS(1) [],
        NECF OFFSET(2) NUMBITS(1) [],
        ORECF OFFSET(3) NUMBITS(1) [],
        IDLECF OFFSET(4) NUMBITS(1) [],
        TXFECF OFFSET(5) NUMBITS(1) [],
        TCCF OFFSET(6) NUMBITS(1) [],
        LBDCF OFFSET(8) NUMBITS(1) [],
        CTSCF OFFSET(9) NUMBITS(1) [],
        RTOCF OFFSET(11) NUMBITS(1) []
    ],
    pub PRESC [
        PRESCALER OFFSET(0) NUMBITS(4) []
    ]
];
