use log::debug;
use serial_core::prelude::*;

use mpdlcd_core::{Command, Frame, LcdBus};

use crate::errors::SerialError;
use crate::serial_port::{self, DEFAULT_TIMEOUT};

/// An implementation of `LcdBus` that drives a display over serial.
///
/// Commands are logged using the [`log`] crate for debugging purposes. Consuming binaries
/// typically use the [`env_logger`] crate and can be run with the `RUST_LOG=debug` environment variable
/// to watch the commands go by.
///
/// # Examples
///
/// ```no_run
/// use mpdlcd_core::{Command, LcdBus};
/// use mpdlcd_serial::SerialLcdBus;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// #
/// let port = serial::open("/dev/ttyACM0")?;
/// let mut bus = SerialLcdBus::try_new(port)?;
/// bus.send(Command::ClearScreen)?;
/// #
/// # Ok(()) }
/// ```
///
/// [`log`]: https://crates.io/crates/log
/// [`env_logger`]: https://crates.io/crates/env_logger
#[derive(Debug, Eq, PartialEq, Hash)]
pub struct SerialLcdBus<P: SerialPort> {
    port: P,
}

impl<P: SerialPort> SerialLcdBus<P> {
    /// Creates a new `SerialLcdBus` that communicates over the specified serial port.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::Configuration`] if the serial port cannot be configured.
    pub fn try_new(mut port: P) -> Result<Self, SerialError> {
        serial_port::configure_port(&mut port, DEFAULT_TIMEOUT)?;
        Ok(SerialLcdBus { port })
    }

    /// Returns a reference to the underlying serial port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Writes a single command to the port.
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::Write`] if the frame could not be written.
    pub fn write_command(&mut self, command: Command<'_>) -> Result<(), SerialError> {
        debug!("LCD command: {}", command);
        Frame::from(command).write(&mut self.port)?;
        Ok(())
    }
}

impl<P: SerialPort> LcdBus for SerialLcdBus<P> {
    /// Encodes the command and writes it to the serial port.
    fn send(&mut self, command: Command<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.write_command(command)?)
    }
}
