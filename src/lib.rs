//! Shows what MPD is playing on a Matrix Orbital compatible character LCD.
//!
//! The top row carries a scrolling marquee with the artist and title, the bottom row a clock,
//! and the backlight color follows the play state: green while playing, amber while paused,
//! and dark when stopped. Everything is driven from a single cooperative loop that polls the
//! player every few seconds and scrolls the title in between.
//!
//! Tested with the Adafruit USB/serial RGB backpack on a 16 × 2 module. Should work with other
//! displays that understand the Matrix Orbital command set, but no guarantees.
//!
//! # Examples
//!
//! ```no_run
//! use mpdlcd::{Config, Display, Monitor, MpdClient, Poller, StopToken};
//! use mpdlcd::serial::SerialLcdBus;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! #
//! let config = Config::default();
//!
//! // Open the display and start a session, which clears the screen.
//! let port = serial::open(&config.device)?;
//! let bus = SerialLcdBus::try_new(port)?;
//! let mut display = Display::new(bus, config.geometry)?;
//!
//! // Follow MPD, giving up after too many failures in a row.
//! let client = MpdClient::new(config.endpoint()).with_password(config.mpd_password.clone());
//! let mut poller = Poller::with_threshold(client, config.error_threshold);
//!
//! // Run until something triggers the stop token.
//! let stop = StopToken::new();
//! Monitor::new(&mut display, &mut poller, config.cadence).run(&stop)?;
//! #
//! # Ok(()) }
//! ```
//!
//! # Sub-crates
//!
//! Lower-level components are provided for more specialized use-cases.
//!
//! - [`mpdlcd-core`] \(re-exported as `core`\) contains the command protocol and the marquee engine,
//!   and is useful if you want to implement a custom [`LcdBus`].
//! - [`mpdlcd-serial`] \(re-exported as `serial`\) configures the serial port and provides
//!   [`SerialLcdBus`].
//! - [`mpdlcd-testing`] contains a virtual display and a mock MPD server for tests.
//!
//! [`mpdlcd-core`]: ../mpdlcd_core/index.html
//! [`mpdlcd-serial`]: ../mpdlcd_serial/index.html
//! [`mpdlcd-testing`]: ../mpdlcd_testing/index.html
//! [`LcdBus`]: trait.LcdBus.html
//! [`SerialLcdBus`]: struct.SerialLcdBus.html
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

pub use mpdlcd_core as core;
pub use mpdlcd_serial as serial;

mod config;
mod display;
mod driver;
mod exit;
mod monitor;
mod mpd;
mod playback;
mod poller;

pub use self::config::{Cadence, Config, DEFAULT_DEVICE};
pub use self::display::{Display, DisplayError, CLOCK_FORMAT};
pub use self::driver::{DriverError, LcdDriver};
pub use self::exit::ExitStatus;
pub use self::monitor::{Monitor, MonitorError, StopToken, STOPPED_BANNER};
pub use self::mpd::{Endpoint, Fields, MpdClient, MpdError, StatusSource, DEFAULT_PORT, DEFAULT_SOCKET};
pub use self::playback::{render_title, PlaybackSnapshot, PlaybackState, PollDelta};
pub use self::poller::{ConnectionState, ErrorBudget, Poller, PollerError, DEFAULT_ERROR_THRESHOLD};

pub use crate::core::{Geometry, LcdBus, Minutes, NamedColor, Rgb};
pub use crate::serial::SerialLcdBus;
