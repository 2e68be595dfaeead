use std::fmt::{self, Display, Formatter};

/// What the player is doing, as reported in MPD's `state` field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// Playing a song.
    Playing,

    /// Paused partway through a song.
    Paused,

    /// Not playing anything.
    Stopped,

    /// Missing or unrecognized state.
    Unknown,
}

impl PlaybackState {
    /// Interprets a raw `state` value. Anything other than `play`, `pause` or `stop` is `Unknown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdlcd::PlaybackState;
    ///
    /// assert_eq!(PlaybackState::Paused, PlaybackState::from_mpd(Some("pause")));
    /// assert_eq!(PlaybackState::Unknown, PlaybackState::from_mpd(Some("rewinding")));
    /// assert_eq!(PlaybackState::Unknown, PlaybackState::from_mpd(None));
    /// ```
    pub fn from_mpd(value: Option<&str>) -> Self {
        match value {
            Some("play") => PlaybackState::Playing,
            Some("pause") => PlaybackState::Paused,
            Some("stop") => PlaybackState::Stopped,
            _ => PlaybackState::Unknown,
        }
    }

    /// Whether a song is loaded, i.e. playing or paused.
    pub fn is_active(self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}

impl Display for PlaybackState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Stopped => "stopped",
            PlaybackState::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// The last known state of the player.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaybackSnapshot {
    /// Play state.
    pub state: PlaybackState,

    /// Rendered song title, or `None` before the first successful poll.
    pub now_playing: Option<String>,
}

impl Default for PlaybackSnapshot {
    /// Nothing known yet, so the first real snapshot differs in every field.
    fn default() -> Self {
        PlaybackSnapshot {
            state: PlaybackState::Unknown,
            now_playing: None,
        }
    }
}

impl PlaybackSnapshot {
    /// Replaces this snapshot with `next` and returns the fields that changed.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdlcd::{PlaybackSnapshot, PlaybackState, PollDelta};
    ///
    /// let mut snapshot = PlaybackSnapshot {
    ///     state: PlaybackState::Playing,
    ///     now_playing: Some("A: T1".into()),
    /// };
    /// let delta = snapshot.update(PlaybackSnapshot {
    ///     state: PlaybackState::Playing,
    ///     now_playing: Some("A: T2".into()),
    /// });
    /// assert_eq!(PollDelta { state: None, song: Some("A: T2".into()) }, delta);
    /// ```
    pub fn update(&mut self, next: PlaybackSnapshot) -> PollDelta {
        let state = if next.state != self.state { Some(next.state) } else { None };
        let song = if next.now_playing != self.now_playing {
            next.now_playing.clone()
        } else {
            None
        };
        *self = next;
        PollDelta { state, song }
    }
}

/// The parts of the player state that changed since the previous poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PollDelta {
    /// The new play state, if it changed.
    pub state: Option<PlaybackState>,

    /// The new song title, if it changed. An empty string means nothing is playing.
    pub song: Option<String>,
}

impl PollDelta {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.song.is_none()
    }
}

/// Renders the marquee text for a song.
///
/// Only a playing or paused player has a title; otherwise this is empty. The artist is
/// included as a prefix when known, and a missing title shows as `?`.
///
/// # Examples
///
/// ```
/// use mpdlcd::{render_title, PlaybackState};
///
/// let playing = PlaybackState::Playing;
/// assert_eq!("Monkees: Daydream Believer", render_title(playing, Some("Monkees"), Some("Daydream Believer")));
/// assert_eq!("Daydream Believer", render_title(playing, None, Some("Daydream Believer")));
/// assert_eq!("Monkees: ?", render_title(playing, Some("Monkees"), None));
/// assert_eq!("", render_title(PlaybackState::Stopped, Some("Monkees"), Some("Daydream Believer")));
/// ```
pub fn render_title(state: PlaybackState, artist: Option<&str>, title: Option<&str>) -> String {
    if !state.is_active() {
        return String::new();
    }
    let title = title.unwrap_or("?");
    match artist {
        Some(artist) => format!("{}: {}", artist, title),
        None => title.to_string(),
    }
}
