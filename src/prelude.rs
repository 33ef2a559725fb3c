//! Prelude

pub use crate::delay::DelayExt as _stm32u0xx_hal_delay_DelayExt;
pub use crate::gpio::ExtiPin as _stm32u0xx_hal_gpio_ExtiPin;
pub use crate::gpio::GpioExt as _stm32u0xx_hal_gpio_GpioExt;
pub use crate::i2c::I2cExt as _stm32u0xx_hal_i2c_I2cExt;
pub use crate::rcc::RccExt as _stm32u0xx_hal_rcc_RccExt;
pub use crate::serial::SerialExt as _stm32u0xx_hal_serial_SerialExt;
pub use crate::time::U32Ext as _stm32u0xx_hal_time_U32Ext;

pub use fugit::{ExtU32 as _, RateExtU32 as _};
