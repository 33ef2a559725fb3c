#![cfg_attr(not(test), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(non_camel_case_types)]

#[cfg(not(feature = "device-selected"))]
compile_error!(
    "This crate requires one of the following device features enabled:
        stm32u031
        stm32u073
        stm32u083
"
);

#[cfg(all(feature = "gpio-u031", feature = "gpio-u0x3"))]
compile_error!("Cannot select both gpio-u031 and gpio-u0x3");

#[cfg(feature = "device-selected")]
pub mod stm32;

#[cfg(feature = "device-selected")]
pub use crate::stm32 as pac;
#[cfg(feature = "device-selected")]
pub use crate::stm32 as device;

#[cfg(feature = "device-selected")]
pub mod prelude;

#[cfg(feature = "device-selected")]
#[macro_use]
mod macros;

#[cfg(feature = "device-selected")]
pub mod time;

#[cfg(feature = "device-selected")]
pub mod rcc;

#[cfg(feature = "device-selected")]
pub mod gpio;

#[cfg(feature = "device-selected")]
pub mod serial;

#[cfg(feature = "device-selected")]
pub mod i2c;

#[cfg(feature = "device-selected")]
pub mod delay;

#[cfg(feature = "device-selected")]
pub mod systick;

#[cfg(feature = "device-selected")]
pub mod stdglue;

#[cfg(feature = "device-selected")]
mod sealed {
    pub trait Sealed {}
}

#[cfg(feature = "device-selected")]
pub(crate) use sealed::Sealed;

/// Get the name of the type without the module prefix(es)
fn stripped_type_name<T>() -> &'static str {
    let s = core::any::type_name::<T>();
    s.rsplit("::").next().unwrap_or(s)
}
