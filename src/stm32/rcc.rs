//! Reset and clock control (RM0503 section 5.4)

use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        (0x000 => pub cr: ReadWrite<u32, CR::Register>),
        (0x004 => pub icscr: ReadWrite<u32, ICSCR::Register>),
        (0x008 => pub cfgr: ReadWrite<u32, CFGR::Register>),
        (0x00C => pub pllcfgr: ReadWrite<u32, PLLCFGR::Register>),
        (0x010 => _reserved0),
        (0x018 => pub cier: ReadWrite<u32, INT::Register>),
        (0x01C => pub cifr: ReadOnly<u32, INT::Register>),
        (0x020 => pub cicr: ReadWrite<u32, INT::Register>),
        (0x024 => _reserved1),
        (0x028 => pub ahbrstr: ReadWrite<u32, AHB::Register>),
        (0x02C => pub ioprstr: ReadWrite<u32, IOP::Register>),
        (0x030 => _reserved2),
        (0x038 => pub apbrstr1: ReadWrite<u32, APB1::Register>),
        (0x03C => _reserved3),
        (0x040 => pub apbrstr2: ReadWrite<u32, APB2::Register>),
        (0x044 => _reserved4),
        (0x048 => pub ahbenr: ReadWrite<u32, AHB::Register>),
        (0x04C => pub iopenr: ReadWrite<u32, IOP::Register>),
        (0x050 => _reserved5),
        (0x058 => pub apbenr1: ReadWrite<u32, APB1::Register>),
        (0x05C => _reserved6),
        (0x060 => pub apbenr2: ReadWrite<u32, APB2::Register>),
        (0x064 => _reserved7),
        (0x068 => pub ahbsmenr: ReadWrite<u32, AHB::Register>),
        (0x06C => pub iopsmenr: ReadWrite<u32, IOP::Register>),
        (0x070 => _reserved8),
        (0x078 => pub apbsmenr1: ReadWrite<u32, APB1::Register>),
        (0x07C => _reserved9),
        (0x080 => pub apbsmenr2: ReadWrite<u32, APB2::Register>),
        (0x084 => _reserved10),
        (0x088 => pub ccipr: ReadWrite<u32, CCIPR::Register>),
        (0x08C => _reserved11),
        (0x090 => pub bdcr: ReadWrite<u32, BDCR::Register>),
        (0x094 => pub csr: ReadWrite<u32, CSR::Register>),
        (0x098 => pub crrcr: ReadWrite<u32, CRRCR::Register>),
        (0x09C => @END),
    }
}

register_bitfields![u32,
    pub CR [
        MSION OFFSET(0) NUMBITS(1) [],
        MSIRDY OFFSET(1) NUMBITS(1) [],
        MSIPLLEN OFFSET(2) NUMBITS(1) [],
        /// MSI range taken from CR.MSIRANGE (set) or CSR.MSISRANGE (clear)
        MSIRGSEL OFFSET(3) NUMBITS(1) [],
        MSIRANGE OFFSET(4) NUMBITS(4) [],
        HSION OFFSET(8) NUMBITS(1) [],
        HSIKERON OFFSET(9) NUMBITS(1) [],
        HSIRDY OFFSET(10) NUMBITS(1) [],
        HSIASFS OFFSET(11) NUMBITS(1) [],
        HSEON OFFSET(16) NUMBITS(1) [],
        HSERDY OFFSET(17) NUMBITS(1) [],
        HSEBYP OFFSET(18) NUMBITS(1) [],
        CSSON OFFSET(19) NUMBITS(1) [],
        PLLON OFFSET(24) NUMBITS(1) [],
        PLLRDY OFFSET(25) NUMBITS(1) []
    ],
    pub ICSCR [
        MSICAL OFFSET(0) NUMBITS(8) [],
        MSITRIM OFFSET(8) NUMBITS(8) [],
        HSICAL OFFSET(16) NUMBITS(8) [],
        HSITRIM OFFSET(24) NUMBITS(7) []
    ],
    pub CFGR [
        SW OFFSET(0) NUMBITS(3) [
            Msi = 0b000,
            Hsi16 = 0b001,
            Hse = 0b010,
            PllR = 0b011,
            Lsi = 0b100,
            Lse = 0b101
        ],
        SWS OFFSET(3) NUMBITS(3) [
            Msi = 0b000,
            Hsi16 = 0b001,
            Hse = 0b010,
            PllR = 0b011,
            Lsi = 0b100,
            Lse = 0b101
        ],
        HPRE OFFSET(8) NUMBITS(4) [],
        PPRE OFFSET(12) NUMBITS(3) [],
        MCOSEL OFFSET(24) NUMBITS(4) [],
        MCOPRE OFFSET(28) NUMBITS(3) []
    ],
    pub PLLCFGR [
        PLLSRC OFFSET(0) NUMBITS(2) [
            Off = 0b00,
            Msi = 0b01,
            Hsi16 = 0b10,
            Hse = 0b11
        ],
        PLLM OFFSET(4) NUMBITS(3) [],
        PLLN OFFSET(8) NUMBITS(7) [],
        PLLPEN OFFSET(16) NUMBITS(1) [],
        PLLP OFFSET(17) NUMBITS(5) [],
        PLLQEN OFFSET(24) NUMBITS(1) [],
        PLLQ OFFSET(25) NUMBITS(3) [],
        PLLREN OFFSET(28) NUMBITS(1) [],
        PLLR OFFSET(29) NUMBITS(3) []
    ],
    pub INT [
        LSIRDY OFFSET(0) NUMBITS(1) [],
        LSERDY OFFSET(1) NUMBITS(1) [],
        MSIRDY OFFSET(2) NUMBITS(1) [],
        HSIRDY OFFSET(3) NUMBITS(1) [],
        HSERDY OFFSET(4) NUMBITS(1) [],
        PLLRDY OFFSET(5) NUMBITS(1) [],
        HSI48RDY OFFSET(10) NUMBITS(1) []
    ],
    pub AHB [
        DMA1 OFFSET(0) NUMBITS(1) [],
        DMA2 OFFSET(1) NUMBITS(1) [],
        FLASH OFFSET(8) NUMBITS(1) [],
        CRC OFFSET(12) NUMBITS(1) [],
        AES OFFSET(16) NUMBITS(1) [],
        RNG OFFSET(18) NUMBITS(1) [],
        TSC OFFSET(24) NUMBITS(1) []
    ],
    pub IOP [
        GPIOA OFFSET(0) NUMBITS(1) [],
        GPIOB OFFSET(1) NUMBITS(1) [],
        GPIOC OFFSET(2) NUMBITS(1) [],
        GPIOD OFFSET(3) NUMBITS(1) [],
        GPIOE OFFSET(4) NUMBITS(1) [],
        GPIOF OFFSET(5) NUMBITS(1) []
    ],
    pub APB1 [
        TIM2 OFFSET(0) NUMBITS(1) [],
        TIM3 OFFSET(1) NUMBITS(1) [],
        TIM6 OFFSET(4) NUMBITS(1) [],
        TIM7 OFFSET(5) NUMBITS(1) [],
        LPUART2 OFFSET(7) NUMBITS(1) [],
        LCD OFFSET(9) NUMBITS(1) [],
        RTCAPB OFFSET(10) NUMBITS(1) [],
        WWDG OFFSET(11) NUMBITS(1) [],
        LPUART3 OFFSET(12) NUMBITS(1) [],
        USB OFFSET(13) NUMBITS(1) [],
        SPI2 OFFSET(14) NUMBITS(1) [],
        SPI3 OFFSET(15) NUMBITS(1) [],
        CRS OFFSET(16) NUMBITS(1) [],
        USART2 OFFSET(17) NUMBITS(1) [],
        USART3 OFFSET(18) NUMBITS(1) [],
        USART4 OFFSET(19) NUMBITS(1) [],
        LPUART1 OFFSET(20) NUMBITS(1) [],
        I2C1 OFFSET(21) NUMBITS(1) [],
        I2C2 OFFSET(22) NUMBITS(1) [],
        I2C3 OFFSET(23) NUMBITS(1) [],
        OPAMP OFFSET(24) NUMBITS(1) [],
        I2C4 OFFSET(25) NUMBITS(1) [],
        LPTIM3 OFFSET(26) NUMBITS(1) [],
        PWR OFFSET(28) NUMBITS(1) [],
        DAC1 OFFSET(29) NUMBITS(1) [],
        LPTIM2 OFFSET(30) NUMBITS(1) [],
        LPTIM1 OFFSET(31) NUMBITS(1) []
    ],
    pub APB2 [
        SYSCFG OFFSET(0) NUMBITS(1) [],
        TIM1 OFFSET(11) NUMBITS(1) [],
        SPI1 OFFSET(12) NUMBITS(1) [],
        USART1 OFFSET(14) NUMBITS(1) [],
        TIM15 OFFSET(16) NUMBITS(1) [],
        TIM16 OFFSET(17) NUMBITS(1) [],
        ADC OFFSET(20) NUMBITS(1) []
    ],
    pub CCIPR [
        USART1SEL OFFSET(0) NUMBITS(2) [],
        USART2SEL OFFSET(2) NUMBITS(2) [],
        LPUART3SEL OFFSET(6) NUMBITS(2) [],
        LPUART2SEL OFFSET(8) NUMBITS(2) [],
        LPUART1SEL OFFSET(10) NUMBITS(2) [],
        I2C1SEL OFFSET(12) NUMBITS(2) [],
        I2C3SEL OFFSET(16) NUMBITS(2) [],
        LPTIM1SEL OFFSET(18) NUMBITS(2) [],
        LPTIM2SEL OFFSET(20) NUMBITS(2) [],
        LPTIM3SEL OFFSET(22) NUMBITS(2) [],
        TIM1SEL OFFSET(24) NUMBITS(1) [],
        TIM15SEL OFFSET(25) NUMBITS(1) [],
        CLK48SEL OFFSET(26) NUMBITS(2) [],
        ADCSEL OFFSET(28) NUMBITS(2) []
    ],
    pub BDCR [
        LSEON OFFSET(0) NUMBITS(1) [],
        LSERDY OFFSET(1) NUMBITS(1) [],
        LSEBYP OFFSET(2) NUMBITS(1) [],
        LSEDRV OFFSET(3) NUMBITS(2) [
            Low = 0b00,
            MediumLow = 0b01,
            MediumHigh = 0b10,
            High = 0b11
        ],
        LSECSSON OFFSET(5) NUMBITS(1) [],
        LSECSSD OFFSET(6) NUMBITS(1) [],
        LSESYSEN OFFSET(7) NUMBITS(1) [],
        RTCSEL OFFSET(8) NUMBITS(2) [],
        LSESYSRDY OFFSET(11) NUMBITS(1) [],
        RTCEN OFFSET(15) NUMBITS(1) [],
        BDRST OFFSET(16) NUMBITS(1) [],
        LSCOEN OFFSET(24) NUMBITS(1) [],
        LSCOSEL OFFSET(25) NUMBITS(1) []
    ],
    pub CSR [
        LSION OFFSET(0) NUMBITS(1) [],
        LSIRDY OFFSET(1) NUMBITS(1) [],
        LSIPREDIV OFFSET(4) NUMBITS(1) [],
        MSISRANGE OFFSET(8) NUMBITS(4) [],
        RMVF OFFSET(23) NUMBITS(1) []
    ],
    pub CRRCR [
        HSI48ON OFFSET(0) NUMBITS(1) [],
        HSI48RDY OFFSET(1) NUMBITS(1) [],
        HSI48CAL OFFSET(7) NUMBITS(9) []
    ]
];
