//! Core types for driving Matrix Orbital compatible character LCDs.
//!
//! For the basic task of showing what MPD is playing, you likely want the high-level API
//! in the [`mpdlcd`] crate instead.
//!
//! However, `mpdlcd_core` is useful for crates that want to speak the display protocol at a
//! lower level, or who want to provide their own [`LcdBus`] implementations.
//!
//! Tested with the Adafruit USB/serial RGB backpack on a 16 × 2 module. Should work with other
//! displays that understand the Matrix Orbital command set, but no guarantees.
//!
//! # Examples
//!
//! ```
//! use mpdlcd_core::{Command, Frame, Geometry, Marquee, NamedColor};
//!
//! // Commands are the logical operations; frames are the bytes on the wire.
//! let bytes = Frame::from(Command::BacklightRgb(NamedColor::Green.rgb())).to_bytes();
//! assert_eq!(vec![0xFE, 0xD0, 0x40, 0xFF, 0x40], bytes);
//!
//! // A marquee scrolls long text through the width of the screen.
//! let geometry = Geometry::default();
//! let mut marquee = Marquee::new("Monkees: Daydream Believer", usize::from(geometry.cols));
//! marquee.advance();
//! assert_eq!(b"Monkees: Daydrea".to_vec(), marquee.visible());
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

mod color;
mod command;
mod frame;
mod geometry;
mod lcd_bus;
pub mod marquee;

pub use self::color::{NamedColor, Rgb, UnknownColorError};
pub use self::command::{Command, Minutes};
pub use self::frame::{Data, Frame, FrameError, Opcode, COMMAND_INTRODUCER};
pub use self::geometry::Geometry;
pub use self::lcd_bus::LcdBus;
pub use self::marquee::Marquee;
