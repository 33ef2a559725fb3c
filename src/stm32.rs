//! Device peripherals
//!
//! Register blocks of the STM32U0 peripherals used by this crate, declared
//! with `tock-registers`. Each peripheral is an owned zero-sized handle which
//! dereferences to its register block, so the HAL modules can take ownership
//! of a peripheral the same way they would with an svd2rust PAC.
//!
//! ```rust
//! let dp = stm32::Peripherals::take().unwrap();
//! let rcc = dp.RCC.constrain();
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::sync::atomic::{AtomicBool, Ordering};

pub mod exti;
pub mod flash;
pub mod gpio;
pub mod i2c;
pub mod pwr;
pub mod rcc;
pub mod usart;

pub use cortex_m::peripheral::SYST;

/// Turns a peripheral base address into a pointer to its register block.
///
/// All register accesses of this crate go through a pointer handed out
/// here.
#[inline(always)]
pub(crate) fn block<T>(address: usize) -> *const T {
    #[cfg(not(test))]
    {
        address as *const T
    }
    #[cfg(test)]
    {
        sim::map(address) as *const T
    }
}

macro_rules! peripherals {
    ($($(#[$meta:meta])* $PER:ident: $RB:ty = $address:expr,)+) => {
        $(
            $(#[$meta])*
            #[doc = concat!(stringify!($PER), " peripheral")]
            pub struct $PER {
                _marker: PhantomData<*const ()>,
            }

            $(#[$meta])*
            unsafe impl Send for $PER {}

            $(#[$meta])*
            impl $PER {
                /// Base address of the register block
                pub const ADDRESS: usize = $address;

                /// Pointer to the register block
                #[inline(always)]
                pub fn ptr() -> *const $RB {
                    block(Self::ADDRESS)
                }

                /// Steal an instance of this peripheral
                ///
                /// # Safety
                ///
                /// Ensure that the new instance of the peripheral cannot be
                /// used in a way that may race with any existing instances.
                #[inline(always)]
                pub unsafe fn steal() -> Self {
                    Self { _marker: PhantomData }
                }
            }

            $(#[$meta])*
            impl Deref for $PER {
                type Target = $RB;

                #[inline(always)]
                fn deref(&self) -> &Self::Target {
                    unsafe { &*Self::ptr() }
                }
            }

            $(#[$meta])*
            impl fmt::Debug for $PER {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.debug_struct(stringify!($PER)).finish()
                }
            }
        )+

        /// All the device peripherals
        #[allow(non_snake_case)]
        pub struct Peripherals {
            $(
                $(#[$meta])*
                #[allow(missing_docs)]
                pub $PER: $PER,
            )+
        }

        impl Peripherals {
            /// Returns all the peripherals *once*
            #[inline]
            pub fn take() -> Option<Self> {
                critical_section::with(|_| {
                    if TAKEN.load(Ordering::Relaxed) {
                        None
                    } else {
                        Some(unsafe { Peripherals::steal() })
                    }
                })
            }

            /// Unchecked version of `Peripherals::take`
            ///
            /// # Safety
            ///
            /// Each of the returned peripherals must be used at most once.
            #[inline]
            pub unsafe fn steal() -> Self {
                TAKEN.store(true, Ordering::Relaxed);
                Peripherals {
                    $(
                        $(#[$meta])*
                        $PER: $PER::steal(),
                    )+
                }
            }
        }
    };
}

static TAKEN: AtomicBool = AtomicBool::new(false);

peripherals! {
    RCC: rcc::RegisterBlock = 0x4002_1000,
    FLASH: flash::RegisterBlock = 0x4002_2000,
    PWR: pwr::RegisterBlock = 0x4000_7000,
    EXTI: exti::RegisterBlock = 0x4002_1800,
    GPIOA: gpio::RegisterBlock = 0x5000_0000,
    GPIOB: gpio::RegisterBlock = 0x5000_0400,
    GPIOC: gpio::RegisterBlock = 0x5000_0800,
    GPIOD: gpio::RegisterBlock = 0x5000_0C00,
    #[cfg(feature = "gpio-u0x3")]
    GPIOE: gpio::RegisterBlock = 0x5000_1000,
    GPIOF: gpio::RegisterBlock = 0x5000_1400,
    USART1: usart::RegisterBlock = 0x4001_3800,
    USART2: usart::RegisterBlock = 0x4000_4400,
    #[cfg(feature = "u0x3")]
    USART3: usart::RegisterBlock = 0x4000_4800,
    #[cfg(feature = "u0x3")]
    USART4: usart::RegisterBlock = 0x4000_4C00,
    I2C1: i2c::RegisterBlock = 0x4000_5400,
    I2C2: i2c::RegisterBlock = 0x4000_5800,
    #[cfg(feature = "u0x3")]
    I2C3: i2c::RegisterBlock = 0x4000_8800,
}

/// Simulated register memory for host tests.
///
/// Every peripheral base address maps to its own zeroed block of registers,
/// private to the test thread. Status bits which hardware would set are
/// written with [`poke`].
#[cfg(test)]
pub(crate) mod sim {
    use std::boxed::Box;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const BLOCK_WORDS: usize = 256;

    thread_local! {
        static MEMORY: RefCell<HashMap<usize, usize>> = RefCell::new(HashMap::new());
    }

    pub(crate) fn map(address: usize) -> *mut u32 {
        MEMORY.with(|memory| {
            *memory.borrow_mut().entry(address).or_insert_with(|| {
                Box::leak(Box::new([0u32; BLOCK_WORDS])).as_mut_ptr() as usize
            })
        }) as *mut u32
    }

    fn word(address: usize, offset: usize) -> *mut u32 {
        assert!(offset % 4 == 0 && offset / 4 < BLOCK_WORDS);
        unsafe { map(address).add(offset / 4) }
    }

    /// Overwrite a register as hardware would
    pub(crate) fn poke(address: usize, offset: usize, value: u32) {
        unsafe { word(address, offset).write_volatile(value) }
    }

    /// Set bits in a register as hardware would
    pub(crate) fn set_bits(address: usize, offset: usize, mask: u32) {
        poke(address, offset, peek(address, offset) | mask)
    }

    pub(crate) fn peek(address: usize, offset: usize) -> u32 {
        unsafe { word(address, offset).read_volatile() }
    }
}
