use std::time::Duration;

use serial_core as serial;
use serial_core::prelude::*;

use crate::errors::SerialError;

/// The baud rate the display backpack listens at out of the box.
pub const BAUD_RATE: serial::BaudRate = serial::Baud9600;

/// How long a write may block before the port gives up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configures the given serial port appropriately for use with the display.
///
/// Specifically, the backpack requires 8N1 format at 9600 baud with no flow control.
/// Also sets the provided timeout value.
///
/// # Errors
///
/// Returns [`SerialError::Configuration`] if the underlying serial port reports an error.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let mut port = serial::open("/dev/ttyACM0")?;
/// mpdlcd_serial::configure_port(&mut port, Duration::from_secs(1))?;
/// // Now ready for communication with the display (8N1 9600 baud).
/// #
/// # Ok(()) }
/// ```
pub fn configure_port<P: SerialPort>(port: &mut P, timeout: Duration) -> Result<(), SerialError> {
    port.reconfigure(&|settings| {
        settings.set_baud_rate(BAUD_RATE)?;
        settings.set_char_size(serial::Bits8);
        settings.set_parity(serial::ParityNone);
        settings.set_stop_bits(serial::Stop1);
        settings.set_flow_control(serial::FlowNone);
        Ok(())
    })
    .map_err(|source| SerialError::Configuration {
        message: "line settings rejected",
        source,
    })?;
    port.set_timeout(timeout).map_err(|source| SerialError::Configuration {
        message: "timeout rejected",
        source,
    })?;
    Ok(())
}
