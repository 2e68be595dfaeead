use std::fmt::{self, Display, Formatter};

use derive_more::Display;

use crate::{Data, Frame, Geometry, Opcode, Rgb};

/// High-level representation of an operation the display can perform.
///
/// Ascribes meaning to a [`Frame`] and converts into one for transmission.
/// This is the currency passed to an [`LcdBus`].
///
/// # Examples
///
/// ```
/// use mpdlcd_core::{Command, Frame, Geometry};
///
/// let frame = Frame::from(Command::SetSize(Geometry::new(2, 16)));
/// assert_eq!(vec![0xFE, 0xD1, 16, 2], frame.to_bytes());
///
/// let frame = Frame::from(Command::CursorTo { row: 2, col: 1 });
/// assert_eq!(vec![0xFE, 0x47, 1, 2], frame.to_bytes());
/// ```
///
/// [`LcdBus`]: trait.LcdBus.html
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command<'a> {
    /// Blanks the screen and homes the cursor.
    ClearScreen,

    /// Tells the device its character dimensions.
    SetSize(Geometry),

    /// Turns the backlight on.
    ///
    /// The device accepts a timeout in minutes, but the backpacks seen in practice ignore it.
    BacklightOn(Minutes),

    /// Turns the backlight off.
    BacklightOff,

    /// Sets the backlight color.
    BacklightRgb(Rgb),

    /// Moves the cursor to a 1-based row and column.
    ///
    /// Values are not checked against the display geometry; the device decides what
    /// to do with positions outside the screen.
    CursorTo {
        /// 1-based row.
        row: u8,

        /// 1-based column.
        col: u8,
    },

    /// Moves the cursor to the top left corner.
    Home,

    /// Stores the splash text shown at power on.
    ///
    /// Must be exactly as long as the screen capacity; see [`Command::boot_message`].
    SetBootMessage(Data<'a>),

    /// Prints characters at the cursor.
    WriteText(Data<'a>),
}

/// A backlight timeout in minutes, where 0 means stay on indefinitely.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub struct Minutes(pub u8);

const CLEAR_SCREEN: Opcode = Opcode(0x58);
const SET_SIZE: Opcode = Opcode(0xD1);
const BACKLIGHT_ON: Opcode = Opcode(0x42);
const BACKLIGHT_OFF: Opcode = Opcode(0x46);
const BACKLIGHT_RGB: Opcode = Opcode(0xD0);
const CURSOR_TO: Opcode = Opcode(0x47);
const HOME: Opcode = Opcode(0x48);
const SET_BOOT_MESSAGE: Opcode = Opcode(0x40);

impl Command<'_> {
    /// Builds a [`SetBootMessage`](Command::SetBootMessage) whose text is padded with spaces
    /// or truncated to fill the screen exactly, so the device always receives a fixed-length payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdlcd_core::{Command, Data, Geometry};
    ///
    /// let command = Command::boot_message("Hello", Geometry::new(1, 8));
    /// assert_eq!(Command::SetBootMessage(Data::new(&b"Hello   "[..])), command);
    /// ```
    pub fn boot_message(text: &str, geometry: Geometry) -> Command<'static> {
        Command::SetBootMessage(Data::new(fit(text.as_bytes(), geometry.capacity())))
    }

    /// Converts into a `Command` that owns all of its data.
    pub fn into_owned(self) -> Command<'static> {
        match self {
            Command::ClearScreen => Command::ClearScreen,
            Command::SetSize(geometry) => Command::SetSize(geometry),
            Command::BacklightOn(minutes) => Command::BacklightOn(minutes),
            Command::BacklightOff => Command::BacklightOff,
            Command::BacklightRgb(rgb) => Command::BacklightRgb(rgb),
            Command::CursorTo { row, col } => Command::CursorTo { row, col },
            Command::Home => Command::Home,
            Command::SetBootMessage(data) => Command::SetBootMessage(data.into_owned()),
            Command::WriteText(data) => Command::WriteText(data.into_owned()),
        }
    }
}

/// Pads `bytes` with spaces or truncates it to exactly `len` bytes.
fn fit(bytes: &[u8], len: usize) -> Vec<u8> {
    let mut fitted: Vec<u8> = bytes.iter().copied().take(len).collect();
    fitted.resize(len, b' ');
    fitted
}

impl Display for Command<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Command::ClearScreen => write!(f, "ClearScreen"),
            Command::SetSize(geometry) => write!(f, "SetSize [{}]", geometry),
            Command::BacklightOn(minutes) => write!(f, "BacklightOn [timeout {} min]", minutes),
            Command::BacklightOff => write!(f, "BacklightOff"),
            Command::BacklightRgb(rgb) => write!(f, "BacklightRgb [{}]", rgb),
            Command::CursorTo { row, col } => write!(f, "CursorTo [row {}, col {}]", row, col),
            Command::Home => write!(f, "Home"),
            Command::SetBootMessage(data) => write!(f, "SetBootMessage \"{}\"", String::from_utf8_lossy(data.get())),
            Command::WriteText(data) => write!(f, "WriteText \"{}\"", String::from_utf8_lossy(data.get())),
        }
    }
}

impl<'a> From<Command<'a>> for Frame<'a> {
    /// Converts a [`Command`] into its wire [`Frame`].
    fn from(command: Command<'a>) -> Self {
        match command {
            Command::ClearScreen => Frame::Command(CLEAR_SCREEN, Data::new(vec![])),
            Command::SetSize(geometry) => Frame::Command(SET_SIZE, Data::new(vec![geometry.cols, geometry.rows])),
            Command::BacklightOn(minutes) => Frame::Command(BACKLIGHT_ON, Data::new(vec![minutes.0])),
            Command::BacklightOff => Frame::Command(BACKLIGHT_OFF, Data::new(vec![])),
            Command::BacklightRgb(rgb) => Frame::Command(BACKLIGHT_RGB, Data::new(vec![rgb.r, rgb.g, rgb.b])),
            Command::CursorTo { row, col } => Frame::Command(CURSOR_TO, Data::new(vec![col, row])),
            Command::Home => Frame::Command(HOME, Data::new(vec![])),
            Command::SetBootMessage(data) => Frame::Command(SET_BOOT_MESSAGE, data),
            Command::WriteText(data) => Frame::Text(data),
        }
    }
}
