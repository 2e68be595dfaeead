//! Tools for testing mpdlcd without a display or a music server.
//!
//! For the basic task of showing what MPD is playing, you likely want to use the high-level API
//! in the [`mpdlcd`] crate instead.
//!
//! This crate isn't directly related to driving a real display, but provides stand-ins for both
//! ends of the pipeline. [`VirtualLcd`] is a mock display that renders commands into an in-memory
//! character grid, and [`MockMpdServer`] is a loopback MPD server whose player state can be
//! changed from a test.
//!
//! # Examples
//!
//! ```
//! use mpdlcd_core::{Command, Data, Geometry, LcdBus, NamedColor};
//! use mpdlcd_testing::{Backlight, VirtualLcd};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! #
//! let mut lcd = VirtualLcd::new(Geometry::default());
//! lcd.send(Command::BacklightRgb(NamedColor::Green.rgb()))?;
//! lcd.send(Command::BacklightOn(mpdlcd_core::Minutes(0)))?;
//! lcd.send(Command::WriteText(Data::new(&b"Hello"[..])))?;
//!
//! assert_eq!(Backlight::On(NamedColor::Green.rgb()), lcd.backlight());
//! assert_eq!("Hello           ", lcd.row(0));
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

mod mock_mpd;
mod virtual_lcd;

pub use self::mock_mpd::{MockMpdServer, MOCK_VERSION};
pub use self::virtual_lcd::{Backlight, VirtualLcd};
