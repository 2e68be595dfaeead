use std::io;

use log::{debug, info};

use mpdlcd_core::{Command, Geometry, LcdBus, Minutes, Rgb};

/// Whether the backlight is lit, and in what color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Backlight {
    /// Dark.
    Off,

    /// Lit with the most recently selected color.
    On(Rgb),
}

/// Mock implementation of a character LCD attached to an [`LcdBus`].
///
/// Interprets each command the way the real backpack does: a character grid with a cursor,
/// a backlight that can be switched and recolored, and a stored boot message. Every command
/// is also recorded so tests can check exactly what was sent.
///
/// Text wraps to the next row at the right edge and back to the top after the last row.
///
/// # Examples
///
/// ```
/// use mpdlcd_core::{Command, Data, Geometry, LcdBus};
/// use mpdlcd_testing::VirtualLcd;
///
/// let mut lcd = VirtualLcd::new(Geometry::new(2, 8));
/// lcd.send(Command::CursorTo { row: 2, col: 3 }).unwrap();
/// lcd.send(Command::WriteText(Data::new(&b"hi"[..]))).unwrap();
/// assert_eq!("        ", lcd.row(0));
/// assert_eq!("  hi    ", lcd.row(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualLcd {
    geometry: Geometry,
    screen: Vec<Vec<u8>>,
    cursor: (usize, usize),
    lit: bool,
    color: Rgb,
    timeout: Minutes,
    boot_message: Vec<u8>,
    commands: Vec<Command<'static>>,
    failing: bool,
}

impl VirtualLcd {
    /// Creates a new blank `VirtualLcd` with the backlight off.
    pub fn new(geometry: Geometry) -> Self {
        VirtualLcd {
            geometry,
            screen: blank(geometry),
            cursor: (0, 0),
            lit: false,
            color: Rgb::new(0xFF, 0xFF, 0xFF),
            timeout: Minutes(0),
            boot_message: vec![],
            commands: vec![],
            failing: false,
        }
    }

    /// Returns the geometry most recently set by the host.
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Returns the characters currently shown on a 0-based row.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the screen.
    pub fn row(&self, index: usize) -> String {
        String::from_utf8_lossy(&self.screen[index]).into_owned()
    }

    /// Returns the raw bytes currently shown on a 0-based row.
    pub fn row_bytes(&self, index: usize) -> &[u8] {
        &self.screen[index]
    }

    /// Returns the 0-based (row, column) of the cursor.
    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    /// Returns the current backlight state.
    pub fn backlight(&self) -> Backlight {
        if self.lit {
            Backlight::On(self.color)
        } else {
            Backlight::Off
        }
    }

    /// Returns the backlight timeout most recently requested.
    pub fn backlight_timeout(&self) -> Minutes {
        self.timeout
    }

    /// Returns the stored boot message.
    pub fn boot_message(&self) -> &[u8] {
        &self.boot_message
    }

    /// Returns every command received so far, in order.
    pub fn commands(&self) -> &[Command<'static>] {
        &self.commands
    }

    /// Returns only the text payloads received so far, in order.
    pub fn text_writes(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                Command::WriteText(data) => Some(String::from_utf8_lossy(data.get()).into_owned()),
                _ => None,
            })
            .collect()
    }

    /// Forgets the recorded command history without touching the screen.
    pub fn clear_history(&mut self) {
        self.commands.clear();
    }

    /// Makes every subsequent [`send`](LcdBus::send) fail with an I/O error, as if the cable was pulled.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn write_text(&mut self, text: &[u8]) {
        let rows = self.screen.len();
        let cols = usize::from(self.geometry.cols);
        if rows == 0 || cols == 0 {
            return;
        }
        for &byte in text {
            let (row, col) = self.cursor;
            if row < rows && col < cols {
                self.screen[row][col] = byte;
            }
            self.cursor = if col + 1 >= cols { ((row + 1) % rows, 0) } else { (row, col + 1) };
        }
    }
}

impl LcdBus for VirtualLcd {
    /// Applies the command to the simulated screen.
    fn send(&mut self, command: Command<'_>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.failing {
            return Err(Box::new(io::Error::new(io::ErrorKind::BrokenPipe, "Virtual LCD unplugged")));
        }

        debug!("Virtual LCD: {}", command);
        match &command {
            Command::ClearScreen => {
                self.screen = blank(self.geometry);
                self.cursor = (0, 0);
            }
            Command::SetSize(geometry) => {
                info!("Virtual LCD resized to {}", geometry);
                self.geometry = *geometry;
                self.screen = blank(*geometry);
                self.cursor = (0, 0);
            }
            Command::BacklightOn(minutes) => {
                self.lit = true;
                self.timeout = *minutes;
            }
            Command::BacklightOff => self.lit = false,
            Command::BacklightRgb(rgb) => self.color = *rgb,
            Command::CursorTo { row, col } => {
                self.cursor = (usize::from(row.saturating_sub(1)), usize::from(col.saturating_sub(1)));
            }
            Command::Home => self.cursor = (0, 0),
            Command::SetBootMessage(data) => self.boot_message = data.get().to_vec(),
            Command::WriteText(data) => self.write_text(data.get()),
        }
        self.commands.push(command.into_owned());
        Ok(())
    }
}

fn blank(geometry: Geometry) -> Vec<Vec<u8>> {
    vec![vec![b' '; usize::from(geometry.cols)]; usize::from(geometry.rows)]
}

#[cfg(test)]
mod tests {
    use super::*;

    use mpdlcd_core::{Data, NamedColor};
    use test_case::test_case;

    fn text(s: &'static str) -> Command<'static> {
        Command::WriteText(Data::new(s.as_bytes()))
    }

    #[test]
    fn starts_blank_and_dark() {
        let lcd = VirtualLcd::new(Geometry::default());
        assert_eq!("                ", lcd.row(0));
        assert_eq!("                ", lcd.row(1));
        assert_eq!(Backlight::Off, lcd.backlight());
        assert!(lcd.commands().is_empty());
    }

    #[test]
    fn text_wraps_to_next_row() {
        let mut lcd = VirtualLcd::new(Geometry::new(2, 4));
        lcd.send(text("abcdef")).unwrap();
        assert_eq!("abcd", lcd.row(0));
        assert_eq!("ef  ", lcd.row(1));
        assert_eq!((1, 2), lcd.cursor());
    }

    #[test]
    fn text_wraps_to_top() {
        let mut lcd = VirtualLcd::new(Geometry::new(2, 2));
        lcd.send(text("abcde")).unwrap();
        assert_eq!("eb", lcd.row(0));
        assert_eq!("cd", lcd.row(1));
    }

    #[test]
    fn home_overwrites_first_row() {
        let mut lcd = VirtualLcd::new(Geometry::new(2, 4));
        lcd.send(text("abcd")).unwrap();
        lcd.send(Command::Home).unwrap();
        lcd.send(text("xy")).unwrap();
        assert_eq!("xycd", lcd.row(0));
    }

    #[test]
    fn clear_resets_screen_and_cursor() {
        let mut lcd = VirtualLcd::new(Geometry::new(2, 4));
        lcd.send(Command::CursorTo { row: 2, col: 2 }).unwrap();
        lcd.send(text("zz")).unwrap();
        lcd.send(Command::ClearScreen).unwrap();
        assert_eq!("    ", lcd.row(1));
        assert_eq!((0, 0), lcd.cursor());
    }

    #[test]
    fn set_size_reshapes_screen() {
        let mut lcd = VirtualLcd::new(Geometry::new(1, 1));
        lcd.send(Command::SetSize(Geometry::new(4, 20))).unwrap();
        assert_eq!(Geometry::new(4, 20), lcd.geometry());
        assert_eq!(20, lcd.row(3).len());
    }

    #[test_case(1, 1, (0, 0) ; "origin")]
    #[test_case(2, 1, (1, 0) ; "clock position")]
    #[test_case(0, 0, (0, 0) ; "zero saturates")]
    #[test_case(2, 16, (1, 15) ; "bottom right")]
    fn cursor_is_one_based(row: u8, col: u8, expected: (usize, usize)) {
        let mut lcd = VirtualLcd::new(Geometry::default());
        lcd.send(Command::CursorTo { row, col }).unwrap();
        assert_eq!(expected, lcd.cursor());
    }

    #[test]
    fn cursor_outside_screen_drops_text() {
        let mut lcd = VirtualLcd::new(Geometry::new(2, 4));
        lcd.send(Command::CursorTo { row: 9, col: 9 }).unwrap();
        lcd.send(text("x")).unwrap();
        assert_eq!("    ", lcd.row(0));
        assert_eq!("    ", lcd.row(1));
    }

    #[test]
    fn backlight_tracks_color() {
        let mut lcd = VirtualLcd::new(Geometry::default());
        lcd.send(Command::BacklightRgb(NamedColor::Amber.rgb())).unwrap();
        assert_eq!(Backlight::Off, lcd.backlight());

        lcd.send(Command::BacklightOn(Minutes(0))).unwrap();
        assert_eq!(Backlight::On(NamedColor::Amber.rgb()), lcd.backlight());

        lcd.send(Command::BacklightOff).unwrap();
        assert_eq!(Backlight::Off, lcd.backlight());
    }

    #[test]
    fn records_commands() {
        let mut lcd = VirtualLcd::new(Geometry::default());
        lcd.send(Command::ClearScreen).unwrap();
        lcd.send(text("one")).unwrap();
        lcd.send(text("two")).unwrap();
        assert_eq!(3, lcd.commands().len());
        assert_eq!(vec!["one", "two"], lcd.text_writes());

        lcd.clear_history();
        assert!(lcd.commands().is_empty());
        assert_eq!("onetwo          ", lcd.row(0));
    }

    #[test]
    fn failing_lcd_rejects_commands() {
        let mut lcd = VirtualLcd::new(Geometry::default());
        lcd.set_failing(true);
        assert!(lcd.send(Command::ClearScreen).is_err());
        assert!(lcd.commands().is_empty());
    }
}
