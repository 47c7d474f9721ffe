//! # rp-hw: Hardware collaborators for ReelPrint
//!
//! Concrete implementations of the `rp-game` collaborator traits:
//!
//! - [`KeyboardButton`]: one press per line on stdin
//! - [`EdgeDetector`] + `GpioButton` / `GpioLed` (feature `gpio`)
//! - [`ObexPrinter`]: fire-and-forget `obexftp` push to a Bluetooth printer
//! - [`ClipPlayer`]: WAV clips mixed with fades; output stream behind
//!   feature `audio`
//!
//! Nothing here blocks the control loop: reads and child processes run on
//! their own threads and results come back over channels.

pub mod audio;
pub mod button;
#[cfg(feature = "gpio")]
pub mod gpio;
pub mod keyboard;
pub mod printer;

pub use audio::*;
pub use button::*;
#[cfg(feature = "gpio")]
pub use gpio::*;
pub use keyboard::*;
pub use printer::*;
