//! Tools for driving Matrix Orbital compatible LCDs over serial.
//!
//! For the basic task of showing what MPD is playing, you likely want to use the high-level API
//! in the [`mpdlcd`] crate instead.
//!
//! However, you can use the [`configure_port`] function to configure a serial port appropriately
//! if you're doing custom lower-level communication.
//!
//! # Examples
//!
//! ```no_run
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #
//! let mut port = serial::open("/dev/ttyACM0")?;
//! mpdlcd_serial::configure_port(&mut port, Duration::from_secs(1))?;
//! // Now ready for communication with the display (8N1 9600 baud).
//! #
//! # Ok(()) }
//! ```
//!
//! [`mpdlcd`]: ../mpdlcd/index.html
#![deny(
    missing_copy_implementations,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![warn(
    missing_docs,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

mod errors;
mod serial_port;
mod serial_lcd_bus;

pub use self::errors::SerialError;
pub use self::serial_port::{configure_port, BAUD_RATE, DEFAULT_TIMEOUT};
pub use self::serial_lcd_bus::SerialLcdBus;
