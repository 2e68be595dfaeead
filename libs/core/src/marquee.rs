//! Scrolling long text through a window as wide as the screen.

/// Computes the visible portion of `text` at a scroll `offset` inside a window `width` bytes wide.
///
/// Text that fits is returned left-justified and padded with spaces, regardless of offset.
/// Longer text wraps around, so the tail of the string is followed directly by its head
/// and the window is always exactly `width` bytes.
///
/// # Examples
///
/// ```
/// use mpdlcd_core::marquee::window;
///
/// assert_eq!(b"Hi  ".to_vec(), window(b"Hi", 3, 4));
/// assert_eq!(b"abcd".to_vec(), window(b"abcdef", 0, 4));
/// assert_eq!(b"cdef".to_vec(), window(b"abcdef", 2, 4));
/// assert_eq!(b"efab".to_vec(), window(b"abcdef", 4, 4));
/// assert_eq!(b"abcd".to_vec(), window(b"abcdef", 6, 4));
/// ```
pub fn window(text: &[u8], offset: usize, width: usize) -> Vec<u8> {
    let len = text.len();
    if len <= width {
        let mut padded = text.to_vec();
        padded.resize(width, b' ');
        return padded;
    }

    let start = offset % len;
    if start == 0 {
        return text[..width].to_vec();
    }

    let last = start + width - 1;
    if last >= len {
        // Straddles the wraparound point.
        let mut visible = text[start..].to_vec();
        visible.extend_from_slice(&text[..width - (len - start)]);
        visible
    } else {
        text[start..start + width].to_vec()
    }
}

/// A line of text that scrolls leftward through a fixed-width window.
///
/// Text shorter than the window is shown as-is and never scrolls. Longer text (or text
/// exactly as wide as the window) gets a single leading space as a separator between
/// wrap cycles, and [`advance`](Marquee::advance) moves it one byte at a time.
///
/// The scroll offset always stays below the length of the scroll buffer.
///
/// # Examples
///
/// ```
/// use mpdlcd_core::Marquee;
///
/// let mut marquee = Marquee::new("The Porpoise Song", 16);
/// assert!(marquee.scrolls());
/// assert_eq!(b" The Porpoise So".to_vec(), marquee.visible());
///
/// assert_eq!(1, marquee.advance());
/// assert_eq!(b"The Porpoise Son".to_vec(), marquee.visible());
///
/// let still = Marquee::new("Stopped", 16);
/// assert!(!still.scrolls());
/// assert_eq!(b"Stopped         ".to_vec(), still.visible());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Marquee {
    text: String,
    buffer: Vec<u8>,
    offset: usize,
    width: usize,
}

impl Marquee {
    /// Creates a new `Marquee` showing `text` in a window `width` bytes wide, at offset 0.
    pub fn new<T: Into<String>>(text: T, width: usize) -> Self {
        let text = text.into();
        let mut buffer = text.as_bytes().to_vec();
        if buffer.len() >= width {
            buffer.insert(0, b' ');
        }
        Marquee {
            text,
            buffer,
            offset: 0,
            width,
        }
    }

    /// Returns the text as it was assigned, without the wrap separator.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the current scroll offset into the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the window width in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of bytes in one full scroll cycle.
    pub fn cycle_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the text is too wide to show at once.
    pub fn scrolls(&self) -> bool {
        self.buffer.len() > self.width
    }

    /// Moves the text one byte to the left and returns the new offset.
    ///
    /// Returns 0 without moving if the text does not scroll. Otherwise a return of 0
    /// means the scroll cycle just restarted.
    pub fn advance(&mut self) -> usize {
        if self.scrolls() {
            self.offset = (self.offset + 1) % self.buffer.len();
        }
        self.offset
    }

    /// Returns exactly [`width`](Marquee::width) bytes to display at the current offset.
    pub fn visible(&self) -> Vec<u8> {
        window(&self.buffer, self.offset, self.width)
    }
}
