//! Extended interrupt and event controller (RM0503 section 18.6)

use tock_registers::registers::ReadWrite;
use tock_registers::register_structs;

register_structs! {
    pub RegisterBlock {
        (0x000 => pub rtsr1: ReadWrite<u32>),
        (0x004 => pub ftsr1: ReadWrite<u32>),
        (0x008 => pub swier1: ReadWrite<u32>),
        (0x00C => pub rpr1: ReadWrite<u32>),
        (0x010 => pub fpr1: ReadWrite<u32>),
        (0x014 => _reserved0),
        (0x060 => pub exticr: [ReadWrite<u32>; 4]),
        (0x070 => _reserved1),
        (0x080 => pub imr1: ReadWrite<u32>),
        (0x084 => pub emr1: ReadWrite<u32>),
        (0x088 => @END),
    }
}
