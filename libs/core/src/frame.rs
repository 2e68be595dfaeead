use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::io::Write;

use derive_more::{Display, UpperHex};
use thiserror::Error;

/// The byte that marks the start of a command frame.
///
/// Any other byte received by the display is treated as a character to print at the cursor.
pub const COMMAND_INTRODUCER: u8 = 0xFE;

/// Errors related to writing [`Frame`]s of data.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FrameError {
    /// Failed writing a [`Frame`] to the transport.
    #[error("Failed writing a frame of data")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Text data contained the command introducer byte, which the display would misinterpret.
    #[error(
        "Text [{}] contains the command introducer 0x{:02X} at position {}",
        String::from_utf8_lossy(data),
        COMMAND_INTRODUCER,
        position
    )]
    IntroducerInText {
        /// The offending text.
        data: Vec<u8>,

        /// Index of the first introducer byte.
        position: usize,
    },
}

/// A low-level representation of the bytes sent to a Matrix Orbital compatible display.
///
/// The protocol has no framing beyond a single introducer byte: a command is `0xFE`,
/// an opcode, then a fixed number of parameter bytes that depends on the opcode.
/// Everything else is text. `Frame` handles turning either form into raw bytes; it makes
/// no attempt to ascribe meaning to the opcode (that's [`Command`]'s job).
///
/// # Examples
///
/// ```
/// use mpdlcd_core::{Data, Frame, Opcode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let frame = Frame::Command(Opcode(0xD1), Data::new(vec![16, 2]));
/// assert_eq!(vec![0xFE, 0xD1, 16, 2], frame.to_bytes());
///
/// let text = Frame::Text(Data::new(&b"Hi"[..]));
/// assert_eq!(b"Hi".to_vec(), text.to_bytes());
/// #
/// # Ok(()) }
/// ```
///
/// # Format Details
///
/// ```text
/// ┌──────┬────────┬─────────┬ ┄ ┬─────────┐
/// │ 0xFE │ Opcode │ Param 0 │...│ Param N │     command
/// └──────┴────────┴─────────┴ ┄ ┴─────────┘
/// ┌────────┬ ┄ ┬────────┐
/// │ Char 0 │...│ Char N │                       text
/// └────────┴ ┄ ┴────────┘
/// ```
///
/// [`Command`]: enum.Command.html
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Frame<'a> {
    /// An introducer, an opcode, and its parameter bytes.
    Command(Opcode, Data<'a>),

    /// Characters to print starting at the current cursor position.
    Text(Data<'a>),
}

/// A command [`Frame`]'s opcode.
///
/// Carries no implicit meaning, but is interpreted by [`Command`].
///
/// [`Command`]: enum.Command.html
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, UpperHex)]
pub struct Opcode(pub u8);

impl<'a> Frame<'a> {
    /// Converts the frame to its wire format.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mpdlcd_core::{Data, Frame, Opcode};
    /// let frame = Frame::Command(Opcode(0x58), Data::new(vec![]));
    /// assert_eq!(vec![0xFE, 0x58], frame.to_bytes());
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Frame::Command(opcode, data) => {
                let mut output = Vec::with_capacity(2 + data.0.len());
                output.push(COMMAND_INTRODUCER);
                output.push(opcode.0);
                output.extend_from_slice(&data.0);
                output
            }
            Frame::Text(data) => data.0.to_vec(),
        }
    }

    /// Writes the byte representation of the frame to a writer.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`FrameError::IntroducerInText`] if a text frame contains `0xFE`. Nothing is written.
    /// * [`FrameError::Io`] if the write fails.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mpdlcd_core::{Data, Frame, Opcode};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// #
    /// let mut output = Vec::new();
    /// Frame::Command(Opcode(0x46), Data::new(vec![])).write(&mut output)?;
    /// assert_eq!(vec![0xFE, 0x46], output);
    /// #
    /// # Ok(()) }
    /// ```
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FrameError> {
        if let Frame::Text(data) = self {
            if let Some(position) = data.0.iter().position(|&b| b == COMMAND_INTRODUCER) {
                return Err(FrameError::IntroducerInText {
                    data: data.0.to_vec(),
                    position,
                });
            }
        }
        writer.write_all(&self.to_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl Display for Frame<'_> {
    /// Formats the frame in a human-readable way.
    ///
    /// Useful for viewing traffic on the wire. Command bytes are in hex.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Command(opcode, data) => {
                write!(f, "Cmd {:02X}", opcode)?;
                if !data.0.is_empty() {
                    write!(f, " |")?;
                    for byte in data.0.iter() {
                        write!(f, " {:02X}", byte)?;
                    }
                }
                Ok(())
            }
            Frame::Text(data) => write!(f, "Text \"{}\"", String::from_utf8_lossy(&data.0)),
        }
    }
}

/// Owned or borrowed payload bytes of a [`Frame`].
///
/// # Examples
///
/// ```
/// use mpdlcd_core::Data;
///
/// let owned = Data::new(vec![1, 2, 3]);
/// let bytes = [1, 2, 3];
/// let borrowed = Data::new(&bytes[..]);
/// assert_eq!(owned, borrowed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Data<'a>(Cow<'a, [u8]>);

impl<'a> Data<'a> {
    /// Creates a new `Data` containing owned or borrowed bytes.
    pub fn new<T: Into<Cow<'a, [u8]>>>(data: T) -> Self {
        Data(data.into())
    }

    /// Returns a reference to the inner [`Cow`]`<[u8]>`.
    pub fn get(&self) -> &Cow<'a, [u8]> {
        &self.0
    }

    /// Converts into a `Data` that owns its bytes.
    pub fn into_owned(self) -> Data<'static> {
        Data(Cow::Owned(self.0.into_owned()))
    }
}

impl<'a> From<Vec<u8>> for Data<'a> {
    fn from(bytes: Vec<u8>) -> Self {
        Data::new(bytes)
    }
}

impl<'a> From<&'a [u8]> for Data<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Data::new(bytes)
    }
}
