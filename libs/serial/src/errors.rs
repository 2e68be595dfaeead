use thiserror::Error;

use mpdlcd_core::FrameError;

/// Errors related to the serial transport.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SerialError {
    /// The serial port could not be configured.
    #[error("Couldn't configure serial port: {}", message)]
    Configuration {
        /// Which setting failed.
        message: &'static str,

        /// The underlying serial error.
        #[source]
        source: serial_core::Error,
    },

    /// A command could not be written to the port.
    #[error("Failed writing to the display")]
    Write {
        /// The underlying frame error.
        #[from]
        source: FrameError,
    },
}
