use log::warn;
use thiserror::Error;

use crate::core::{Command, Data, Geometry, LcdBus, Minutes, NamedColor, Rgb};

/// Errors related to [`LcdDriver`]s.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    /// The bus failed to deliver a command to the display.
    #[error("Failed sending command to the display")]
    Transport {
        /// The underlying bus error.
        #[from]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Issues individual display operations over an [`LcdBus`].
///
/// Holds no state beyond the bus itself; each method sends exactly one command
/// (or none, for an unrecognized color name). Nothing is retried or buffered, so a
/// transport failure surfaces immediately as [`DriverError::Transport`].
///
/// # Examples
///
/// ```
/// use mpdlcd::{LcdDriver, Minutes, NamedColor};
/// use mpdlcd_testing::{Backlight, VirtualLcd};
/// use mpdlcd::core::Geometry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let mut driver = LcdDriver::new(VirtualLcd::new(Geometry::default()));
/// driver.backlight_named(NamedColor::Blue)?;
/// driver.backlight_on(Minutes(0))?;
/// driver.write_text("Hello")?;
///
/// assert_eq!(Backlight::On(NamedColor::Blue.rgb()), driver.bus().backlight());
/// assert_eq!("Hello           ", driver.bus().row(0));
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct LcdDriver<B: LcdBus> {
    bus: B,
}

impl<B: LcdBus> LcdDriver<B> {
    /// Creates a new `LcdDriver` that sends commands over `bus`.
    pub fn new(bus: B) -> Self {
        LcdDriver { bus }
    }

    /// Returns a reference to the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Returns a mutable reference to the underlying bus.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consumes the driver and returns the underlying bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Blanks the screen.
    pub fn clear_screen(&mut self) -> Result<(), DriverError> {
        self.send(Command::ClearScreen)
    }

    /// Tells the device its character dimensions.
    pub fn set_size(&mut self, geometry: Geometry) -> Result<(), DriverError> {
        self.send(Command::SetSize(geometry))
    }

    /// Turns the backlight on. The backpack ignores the timeout, but 0 conventionally means forever.
    pub fn backlight_on(&mut self, timeout: Minutes) -> Result<(), DriverError> {
        self.send(Command::BacklightOn(timeout))
    }

    /// Turns the backlight off.
    pub fn backlight_off(&mut self) -> Result<(), DriverError> {
        self.send(Command::BacklightOff)
    }

    /// Sets the backlight to an arbitrary color.
    pub fn backlight_rgb(&mut self, rgb: Rgb) -> Result<(), DriverError> {
        self.send(Command::BacklightRgb(rgb))
    }

    /// Sets the backlight to one of the predefined colors.
    pub fn backlight_named(&mut self, color: NamedColor) -> Result<(), DriverError> {
        self.backlight_rgb(color.rgb())
    }

    /// Sets the backlight to the color with the given name.
    ///
    /// An unrecognized name is logged and otherwise ignored; nothing is sent and `Ok` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mpdlcd::LcdDriver;
    /// # use mpdlcd::core::Geometry;
    /// # use mpdlcd_testing::VirtualLcd;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// #
    /// let mut driver = LcdDriver::new(VirtualLcd::new(Geometry::default()));
    /// driver.backlight_color("amber")?;
    /// driver.backlight_color("chartreuse")?;
    /// assert_eq!(1, driver.bus().commands().len());
    /// #
    /// # Ok(()) }
    /// ```
    pub fn backlight_color(&mut self, name: &str) -> Result<(), DriverError> {
        match name.parse::<NamedColor>() {
            Ok(color) => self.backlight_named(color),
            Err(e) => {
                warn!("{}", e);
                Ok(())
            }
        }
    }

    /// Moves the cursor to a 1-based position. Not checked against the display geometry.
    pub fn cursor_to(&mut self, row: u8, col: u8) -> Result<(), DriverError> {
        self.send(Command::CursorTo { row, col })
    }

    /// Moves the cursor to the top left corner.
    pub fn home(&mut self) -> Result<(), DriverError> {
        self.send(Command::Home)
    }

    /// Stores the power-on splash text, padded or truncated to fill `geometry`.
    pub fn set_boot_message(&mut self, text: &str, geometry: Geometry) -> Result<(), DriverError> {
        self.send(Command::boot_message(text, geometry))
    }

    /// Writes text at the cursor.
    pub fn write_text<T: AsRef<[u8]>>(&mut self, text: T) -> Result<(), DriverError> {
        self.send(Command::WriteText(Data::new(text.as_ref())))
    }

    fn send(&mut self, command: Command<'_>) -> Result<(), DriverError> {
        self.bus.send(command)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mpdlcd_testing::{Backlight, VirtualLcd};
    use test_case::test_case;

    fn driver() -> LcdDriver<VirtualLcd> {
        LcdDriver::new(VirtualLcd::new(Geometry::default()))
    }

    #[test_case("blue", NamedColor::Blue ; "blue")]
    #[test_case("amber", NamedColor::Amber ; "amber")]
    #[test_case("green", NamedColor::Green ; "green")]
    #[test_case("white", NamedColor::White ; "white")]
    fn named_colors(name: &str, color: NamedColor) {
        let mut driver = driver();
        driver.backlight_color(name).unwrap();
        assert_eq!(&[Command::BacklightRgb(color.rgb())], driver.bus().commands());
    }

    #[test_case("purple" ; "not a color")]
    #[test_case("Green" ; "case sensitive")]
    #[test_case("" ; "empty")]
    fn unknown_color_sends_nothing(name: &str) {
        let mut driver = driver();
        driver.backlight_color(name).unwrap();
        assert!(driver.bus().commands().is_empty());
    }

    #[test]
    fn backlight_on_and_off() {
        let mut driver = driver();
        driver.backlight_named(NamedColor::Green).unwrap();
        driver.backlight_on(Minutes(0)).unwrap();
        assert_eq!(Backlight::On(NamedColor::Green.rgb()), driver.bus().backlight());
        driver.backlight_off().unwrap();
        assert_eq!(Backlight::Off, driver.bus().backlight());
    }

    #[test]
    fn cursor_and_text() {
        let mut driver = driver();
        driver.cursor_to(2, 1).unwrap();
        driver.write_text(" 10/19/26 04:30").unwrap();
        driver.home().unwrap();
        driver.write_text("Top").unwrap();
        assert_eq!("Top             ", driver.bus().row(0));
        assert_eq!(" 10/19/26 04:30 ", driver.bus().row(1));
    }

    #[test]
    fn boot_message_fills_screen() {
        let mut driver = driver();
        driver.set_boot_message("mpdlcd", Geometry::default()).unwrap();
        assert_eq!(32, driver.bus().boot_message().len());
        assert!(driver.bus().boot_message().starts_with(b"mpdlcd  "));
    }

    #[test]
    fn transport_failure_propagates() {
        let mut driver = driver();
        driver.bus_mut().set_failing(true);
        let error = driver.clear_screen().unwrap_err();
        assert!(matches!(error, DriverError::Transport { .. }));
    }

    #[test]
    fn unknown_color_with_failing_bus_is_ok() {
        let mut driver = driver();
        driver.bus_mut().set_failing(true);
        assert!(driver.backlight_color("mauve").is_ok());
    }
}
