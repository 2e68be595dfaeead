use chrono::{Local, NaiveDateTime};
use log::debug;
use thiserror::Error;

use crate::core::{Geometry, LcdBus, Marquee, Minutes, NamedColor};
use crate::driver::{DriverError, LcdDriver};
use crate::playback::PlaybackState;

/// How the idle clock is rendered on the bottom row.
pub const CLOCK_FORMAT: &str = " %m/%d/%y %H:%M";

/// Errors related to a [`Display`] session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DisplayError {
    /// The driver failed to send a command.
    #[error("Display operation failed")]
    Driver {
        /// The underlying driver error.
        #[from]
        source: DriverError,
    },
}

/// A stateful session on a character LCD: a scrolling marquee on the top row and a clock
/// on the bottom row, with the backlight reflecting what the player is doing.
///
/// Remembers what it last wrote so that repeated updates with the same content cost nothing
/// on the wire.
///
/// # Examples
///
/// ```
/// use mpdlcd::{Display, PlaybackState};
/// use mpdlcd::core::Geometry;
/// use mpdlcd_testing::VirtualLcd;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let mut display = Display::new(VirtualLcd::new(Geometry::default()), Geometry::default())?;
/// display.set_state_backlight(PlaybackState::Playing)?;
/// display.set_marquee("The Monkees: Daydream Believer")?;
/// assert_eq!(" The Monkees: Da", display.bus().row(0));
///
/// display.advance_scroll()?;
/// assert_eq!("The Monkees: Day", display.bus().row(0));
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Display<B: LcdBus> {
    driver: LcdDriver<B>,
    geometry: Geometry,
    marquee: Option<Marquee>,
    clock: String,
}

impl<B: LcdBus> Display<B> {
    /// Starts a session by telling the device its geometry and clearing the screen.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Driver`] if either command fails.
    pub fn new(bus: B, geometry: Geometry) -> Result<Self, DisplayError> {
        let mut driver = LcdDriver::new(bus);
        driver.set_size(geometry)?;
        driver.clear_screen()?;
        Ok(Display {
            driver,
            geometry,
            marquee: None,
            clock: String::new(),
        })
    }

    /// Returns the session geometry.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Returns the current marquee text, or `""` if none is set.
    pub fn marquee_text(&self) -> &str {
        self.marquee.as_ref().map_or("", Marquee::text)
    }

    /// Returns the current scroll offset.
    pub fn scroll_offset(&self) -> usize {
        self.marquee.as_ref().map_or(0, Marquee::offset)
    }

    /// Returns the last clock text written.
    pub fn clock_text(&self) -> &str {
        &self.clock
    }

    /// Returns a reference to the underlying driver.
    pub fn driver(&self) -> &LcdDriver<B> {
        &self.driver
    }

    /// Returns a mutable reference to the underlying driver.
    pub fn driver_mut(&mut self) -> &mut LcdDriver<B> {
        &mut self.driver
    }

    /// Returns a reference to the underlying bus.
    pub fn bus(&self) -> &B {
        self.driver.bus()
    }

    /// Ends the session and returns the underlying bus without touching the screen.
    pub fn into_bus(self) -> B {
        self.driver.into_bus()
    }

    /// Shows `text` on the top row, starting at the beginning.
    ///
    /// Does nothing if `text` is already showing. Text narrower than the screen is written once
    /// and never moves. Anything wider becomes a marquee that [`advance_scroll`](Display::advance_scroll)
    /// moves along.
    pub fn set_marquee(&mut self, text: &str) -> Result<(), DisplayError> {
        if self.marquee_text() == text {
            return Ok(());
        }
        debug!("New marquee: {}", text);
        let marquee = Marquee::new(text, usize::from(self.geometry.cols));
        self.driver.home()?;
        self.driver.write_text(marquee.visible())?;
        self.marquee = Some(marquee);
        Ok(())
    }

    /// Scrolls the marquee one character to the left and returns the new offset.
    ///
    /// Returns 0 without writing anything if the marquee fits on screen. Otherwise a return
    /// of 0 means the text has come back around to its start.
    pub fn advance_scroll(&mut self) -> Result<usize, DisplayError> {
        let marquee = match self.marquee.as_mut() {
            Some(marquee) if marquee.scrolls() => marquee,
            _ => return Ok(0),
        };
        let offset = marquee.advance();
        let visible = marquee.visible();
        self.driver.home()?;
        self.driver.write_text(visible)?;
        Ok(offset)
    }

    /// Sets the backlight to reflect the play state: green while playing, amber while
    /// paused, and off otherwise.
    pub fn set_state_backlight(&mut self, state: PlaybackState) -> Result<(), DisplayError> {
        match state {
            PlaybackState::Playing => self.backlight(NamedColor::Green),
            PlaybackState::Paused => self.backlight(NamedColor::Amber),
            PlaybackState::Stopped | PlaybackState::Unknown => Ok(self.driver.backlight_off()?),
        }
    }

    /// Writes the current local date and time on the bottom row, if it changed.
    pub fn update_clock(&mut self) -> Result<(), DisplayError> {
        self.update_clock_at(Local::now().naive_local())
    }

    /// Writes `time` on the bottom row, if it differs from what is showing.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use mpdlcd::Display;
    /// use mpdlcd::core::Geometry;
    /// use mpdlcd_testing::VirtualLcd;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// #
    /// let mut display = Display::new(VirtualLcd::new(Geometry::default()), Geometry::default())?;
    /// let time = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(4, 30, 0).unwrap();
    /// display.update_clock_at(time)?;
    /// assert_eq!(" 10/19/26 04:30 ", display.bus().row(1));
    /// #
    /// # Ok(()) }
    /// ```
    pub fn update_clock_at(&mut self, time: NaiveDateTime) -> Result<(), DisplayError> {
        let clock = time.format(CLOCK_FORMAT).to_string();
        if clock == self.clock {
            return Ok(());
        }
        self.driver.cursor_to(self.geometry.rows, 1)?;
        self.driver.write_text(&clock)?;
        self.clock = clock;
        Ok(())
    }

    /// Forgets the marquee and clock and clears the screen.
    pub fn reset(&mut self) -> Result<(), DisplayError> {
        self.marquee = None;
        self.clock.clear();
        self.driver.clear_screen()?;
        Ok(())
    }

    /// Clears the screen and turns the backlight off, leaving the device dark.
    pub fn shut_down(&mut self) -> Result<(), DisplayError> {
        self.driver.clear_screen()?;
        self.driver.backlight_off()?;
        Ok(())
    }

    /// Stores the device's power-on splash text.
    pub fn set_boot_message(&mut self, text: &str) -> Result<(), DisplayError> {
        self.driver.set_boot_message(text, self.geometry)?;
        Ok(())
    }

    fn backlight(&mut self, color: NamedColor) -> Result<(), DisplayError> {
        self.driver.backlight_named(color)?;
        self.driver.backlight_on(Minutes(0))?;
        Ok(())
    }
}
