use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

/// A color name that is not in the [`NamedColor`] table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No backlight color named '{}'", name)]
pub struct UnknownColorError {
    /// The name that failed to resolve.
    pub name: String,
}

/// A backlight color as red, green, and blue intensities.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red intensity.
    pub r: u8,

    /// Green intensity.
    pub g: u8,

    /// Blue intensity.
    pub b: u8,
}

impl Rgb {
    /// Creates a new `Rgb` from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// The fixed set of backlight colors that can be selected by name.
///
/// Every variant maps to exactly one [`Rgb`] triple, tuned for the Adafruit RGB backpack.
///
/// # Examples
///
/// ```
/// use mpdlcd_core::{NamedColor, Rgb};
///
/// let color: NamedColor = "amber".parse().unwrap();
/// assert_eq!(NamedColor::Amber, color);
/// assert_eq!(Rgb::new(0xFF, 0x20, 0x00), color.rgb());
///
/// assert!("magenta".parse::<NamedColor>().is_err());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NamedColor {
    /// Cool blue.
    Blue,

    /// Amber, used while paused.
    Amber,

    /// Green, used while playing.
    Green,

    /// Full white.
    White,
}

impl NamedColor {
    /// All named colors.
    pub const ALL: [NamedColor; 4] = [NamedColor::Blue, NamedColor::Amber, NamedColor::Green, NamedColor::White];

    /// Returns the RGB triple for this color.
    pub fn rgb(self) -> Rgb {
        match self {
            NamedColor::Blue => Rgb::new(0x60, 0x60, 0xFF),
            NamedColor::Amber => Rgb::new(0xFF, 0x20, 0x00),
            NamedColor::Green => Rgb::new(0x40, 0xFF, 0x40),
            NamedColor::White => Rgb::new(0xFF, 0xFF, 0xFF),
        }
    }

    /// Returns the lowercase name of this color.
    pub fn name(self) -> &'static str {
        match self {
            NamedColor::Blue => "blue",
            NamedColor::Amber => "amber",
            NamedColor::Green => "green",
            NamedColor::White => "white",
        }
    }
}

impl FromStr for NamedColor {
    type Err = UnknownColorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        NamedColor::ALL
            .iter()
            .copied()
            .find(|color| color.name() == name)
            .ok_or_else(|| UnknownColorError { name: name.to_owned() })
    }
}

impl Display for NamedColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<NamedColor> for Rgb {
    fn from(color: NamedColor) -> Self {
        color.rgb()
    }
}
