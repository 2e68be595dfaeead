use std::fmt::{self, Debug, Formatter};

use crate::Command;

/// Abstraction over a transport that delivers [`Command`]s to a display.
///
/// Typically `SerialLcdBus` from [`mpdlcd-serial`] or `VirtualLcd` from [`mpdlcd-testing`]
/// are sufficient, and you do not need to implement this yourself.
///
/// The protocol is write-only: the display never answers, so a successful return only means
/// the bytes were handed to the transport.
///
/// # Examples
///
/// Implementing a custom bus:
///
/// ```
/// use mpdlcd_core::{Command, Frame, LcdBus};
///
/// struct ByteCollector {
///     bytes: Vec<u8>,
/// }
///
/// impl LcdBus for ByteCollector {
///     fn send(&mut self, command: Command<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         Frame::from(command).write(&mut self.bytes)?;
///         Ok(())
///     }
/// }
///
/// let mut bus = ByteCollector { bytes: vec![] };
/// bus.send(Command::ClearScreen).unwrap();
/// assert_eq!(vec![0xFE, 0x58], bus.bytes);
/// ```
///
/// [`mpdlcd-serial`]: ../mpdlcd_serial/index.html
/// [`mpdlcd-testing`]: ../mpdlcd_testing/index.html
pub trait LcdBus {
    /// Delivers a single command to the display.
    fn send(&mut self, command: Command<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

// Provide a Debug representation so types that contain trait objects can derive Debug.
impl Debug for dyn LcdBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<LcdBus trait>")
    }
}

impl<B: LcdBus + ?Sized> LcdBus for Box<B> {
    fn send(&mut self, command: Command<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).send(command)
    }
}
