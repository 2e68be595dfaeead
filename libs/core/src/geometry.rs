use std::fmt::{self, Display, Formatter};

/// The character dimensions of a display.
///
/// Fixed for the lifetime of a session; it is sent to the device once when the session starts.
///
/// # Examples
///
/// ```
/// use mpdlcd_core::Geometry;
///
/// let geometry = Geometry::new(2, 16);
/// assert_eq!(32, geometry.capacity());
/// assert_eq!(Geometry::default(), geometry);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Number of text rows.
    pub rows: u8,

    /// Number of characters per row.
    pub cols: u8,
}

impl Geometry {
    /// Creates a new `Geometry` with the given number of rows and columns.
    pub fn new(rows: u8, cols: u8) -> Self {
        Geometry { rows, cols }
    }

    /// Returns the total number of characters the screen can show at once.
    pub fn capacity(&self) -> usize {
        usize::from(self.rows) * usize::from(self.cols)
    }
}

impl Default for Geometry {
    /// The common 2 × 16 character module.
    fn default() -> Self {
        Geometry::new(2, 16)
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} × {}", self.rows, self.cols)
    }
}
