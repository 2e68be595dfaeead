use log::{error, info, warn};
use thiserror::Error;

use crate::mpd::{Fields, StatusSource};
use crate::playback::{render_title, PlaybackSnapshot, PlaybackState, PollDelta};

/// How many failures in a row are tolerated before the link is considered broken.
pub const DEFAULT_ERROR_THRESHOLD: u32 = 20;

/// Errors related to polling a [`StatusSource`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PollerError {
    /// The initial connection attempt failed.
    #[error("Couldn't connect to the player")]
    Connect {
        /// The underlying source error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The connection was lost and couldn't be reestablished.
    #[error("Reconnecting to the player failed")]
    Reconnect {
        /// The underlying source error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Status or song information couldn't be fetched.
    #[error("Couldn't get status and song from the player")]
    Fetch {
        /// The underlying source error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Too many consecutive failures; the poller has given up.
    #[error("Giving up after {} consecutive failures", failures)]
    BudgetExhausted {
        /// Number of failures in a row.
        failures: u32,
    },
}

/// Counts consecutive failures against a fixed limit.
///
/// # Examples
///
/// ```
/// use mpdlcd::ErrorBudget;
///
/// let mut budget = ErrorBudget::new(2);
/// budget.record_failure();
/// assert!(!budget.is_exhausted());
/// budget.record_failure();
/// assert!(budget.is_exhausted());
/// budget.reset();
/// assert_eq!(0, budget.consecutive_failures());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ErrorBudget {
    consecutive_failures: u32,
    threshold: u32,
}

impl ErrorBudget {
    /// Creates a fresh budget that is spent after `threshold` failures in a row.
    pub fn new(threshold: u32) -> Self {
        ErrorBudget {
            consecutive_failures: 0,
            threshold,
        }
    }

    /// Counts one more failure and returns the running total.
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    /// Forgets all failures after a success.
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Returns the number of failures in a row so far.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Returns the limit.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether the limit has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.consecutive_failures >= self.threshold
    }
}

impl Default for ErrorBudget {
    fn default() -> Self {
        ErrorBudget::new(DEFAULT_ERROR_THRESHOLD)
    }
}

/// Connection status of a [`Poller`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No open connection.
    Disconnected,

    /// Connected and presumed healthy.
    Connected,

    /// The error budget is spent; polling will not be attempted again.
    Fatal,
}

/// Follows the player through a [`StatusSource`], reporting only what changed.
///
/// Connection trouble is handled internally: a poll that finds the connection broken closes
/// it, reconnects once and retries once. Each failed poll counts once against an [`ErrorBudget`];
/// any successful poll refills it. Once the budget is spent the poller is fatal and refuses to
/// do anything more, but it never ends the process itself.
///
/// # Examples
///
/// ```no_run
/// use mpdlcd::{Endpoint, MpdClient, Poller};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let client = MpdClient::new(Endpoint::default());
/// let mut poller = Poller::new(client);
/// poller.connect()?;
/// let delta = poller.poll()?;
/// if let Some(song) = delta.song {
///     println!("Now playing: {}", song);
/// }
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Poller<S: StatusSource> {
    source: S,
    connected: bool,
    snapshot: PlaybackSnapshot,
    budget: ErrorBudget,
}

impl<S: StatusSource> Poller<S> {
    /// Creates a new, disconnected `Poller` with the default error threshold.
    pub fn new(source: S) -> Self {
        Poller::with_threshold(source, DEFAULT_ERROR_THRESHOLD)
    }

    /// Creates a new, disconnected `Poller` that gives up after `threshold` consecutive failures.
    pub fn with_threshold(source: S, threshold: u32) -> Self {
        Poller {
            source,
            connected: false,
            snapshot: PlaybackSnapshot::default(),
            budget: ErrorBudget::new(threshold),
        }
    }

    /// Returns a reference to the status source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns a mutable reference to the status source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Returns the error budget.
    pub fn budget(&self) -> &ErrorBudget {
        &self.budget
    }

    /// Returns the last known player state.
    pub fn snapshot(&self) -> &PlaybackSnapshot {
        &self.snapshot
    }

    /// Returns the current connection status.
    pub fn state(&self) -> ConnectionState {
        if self.is_fatal() {
            ConnectionState::Fatal
        } else if self.connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Whether the error budget is spent.
    pub fn is_fatal(&self) -> bool {
        self.budget.is_exhausted()
    }

    /// Connects to the source. Does nothing if already connected.
    ///
    /// # Errors
    ///
    /// Returns [`PollerError::Connect`] if the source can't be reached. The failure counts
    /// against the error budget.
    pub fn connect(&mut self) -> Result<(), PollerError> {
        if self.connected {
            return Ok(());
        }
        self.open().map_err(|source| {
            let failures = self.budget.record_failure();
            warn!("Connecting to the player failed ({} in a row): {}", failures, source);
            PollerError::Connect { source }
        })
    }

    /// Fetches the player state and returns what changed since the previous successful poll.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`PollerError::BudgetExhausted`] once too many polls have failed in a row. Nothing is attempted.
    /// * [`PollerError::Reconnect`] if the connection was down and couldn't be reopened.
    /// * [`PollerError::Fetch`] if the data couldn't be fetched even after reconnecting.
    pub fn poll(&mut self) -> Result<PollDelta, PollerError> {
        if self.budget.is_exhausted() {
            return Err(PollerError::BudgetExhausted {
                failures: self.budget.consecutive_failures(),
            });
        }

        match self.try_poll() {
            Ok(next) => {
                self.budget.reset();
                let delta = self.snapshot.update(next);
                if let Some(state) = delta.state {
                    info!("Player is now {}", state);
                }
                Ok(delta)
            }
            Err(e) => {
                let failures = self.budget.record_failure();
                if self.budget.is_exhausted() {
                    error!("Poll failed {} times in a row, giving up: {}", failures, e);
                }
                Err(e)
            }
        }
    }

    /// Closes the connection, ignoring any errors.
    pub fn disconnect(&mut self) {
        self.source.disconnect();
        self.connected = false;
    }

    fn try_poll(&mut self) -> Result<PlaybackSnapshot, PollerError> {
        if self.connected {
            match self.fetch() {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) => {
                    warn!("Lost the player ({}), reconnecting", e);
                    self.disconnect();
                }
            }
        }

        self.open().map_err(|source| PollerError::Reconnect { source })?;
        self.fetch().map_err(|source| {
            self.disconnect();
            PollerError::Fetch { source }
        })
    }

    fn open(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.source.connect()?;
        self.connected = true;
        Ok(())
    }

    fn fetch(&mut self) -> Result<PlaybackSnapshot, Box<dyn std::error::Error + Send + Sync>> {
        let status = self.source.status()?;
        let song = self.source.current_song()?;
        Ok(snapshot_from(&status, &song))
    }
}

fn snapshot_from(status: &Fields, song: &Fields) -> PlaybackSnapshot {
    let state = PlaybackState::from_mpd(status.get("state").map(String::as_str));
    let title = render_title(
        state,
        song.get("artist").map(String::as_str),
        song.get("title").map(String::as_str),
    );
    PlaybackSnapshot {
        state,
        now_playing: Some(title),
    }
}
