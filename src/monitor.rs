use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use thiserror::Error;

use crate::config::Cadence;
use crate::core::LcdBus;
use crate::display::{Display, DisplayError};
use crate::mpd::StatusSource;
use crate::poller::{Poller, PollerError};

/// Shown on the marquee row when nothing is playing.
pub const STOPPED_BANNER: &str = "     Stopped";

// Longest a stop request can go unnoticed during a sleep.
const STOP_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Errors that end a [`Monitor`] run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MonitorError {
    /// Writing to the display failed.
    #[error("Display failed")]
    Display {
        /// The underlying display error.
        #[from]
        source: DisplayError,
    },

    /// The poller used up its error budget.
    #[error("Too many errors polling the player")]
    BudgetExhausted {
        /// The last poll error.
        #[source]
        source: PollerError,
    },
}

/// A cloneable flag asking a [`Monitor`] to stop at its next tick.
///
/// Safe to trigger from any thread, e.g. a signal handler.
///
/// # Examples
///
/// ```
/// use mpdlcd::StopToken;
///
/// let token = StopToken::new();
/// let handle = token.clone();
/// assert!(!token.is_stopped());
/// handle.stop();
/// assert!(token.is_stopped());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Creates a token that hasn't been stopped.
    pub fn new() -> Self {
        StopToken::default()
    }

    /// Requests a stop.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Stops this token when the process receives SIGINT or SIGTERM (Ctrl-C on Windows).
    ///
    /// Only one handler can be installed per process.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`ctrlc::Error`] if the handler couldn't be installed, including
    /// when one has already been installed.
    pub fn stop_on_termination(&self) -> Result<(), ctrlc::Error> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            info!("Termination signal received");
            token.stop();
        })
    }

    /// Sleeps for `duration` or until a stop is requested, whichever comes first.
    /// Returns whether a stop was requested.
    pub fn wait(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_stopped() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep((deadline - now).min(STOP_CHECK_INTERVAL));
        }
    }
}

/// Drives a [`Display`] from a [`Poller`] on a fixed cadence.
///
/// Every tick either polls the player (once per poll cycle) or scrolls the marquee. A poll
/// applies any change in play state to the backlight, any change of song to the marquee, and
/// refreshes the clock. Whenever the marquee comes back around to its start, scrolling pauses
/// for a linger cycle so the beginning of the title can be read.
///
/// # Examples
///
/// ```no_run
/// use mpdlcd::{Cadence, Display, Endpoint, Monitor, MpdClient, Poller, StopToken};
/// use mpdlcd::core::Geometry;
/// use mpdlcd::serial::SerialLcdBus;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let port = serial::open("/dev/ttyACM0")?;
/// let mut display = Display::new(SerialLcdBus::try_new(port)?, Geometry::default())?;
/// let mut poller = Poller::new(MpdClient::new(Endpoint::default()));
///
/// let stop = StopToken::new();
/// Monitor::new(&mut display, &mut poller, Cadence::default()).run(&stop)?;
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct Monitor<'a, B: LcdBus, S: StatusSource> {
    display: &'a mut Display<B>,
    poller: &'a mut Poller<S>,
    cadence: Cadence,
    startup_delay: Duration,
    cycle: u32,
    linger: u32,
}

impl<'a, B: LcdBus, S: StatusSource> Monitor<'a, B, S> {
    /// Creates a new `Monitor` whose first tick will poll.
    pub fn new(display: &'a mut Display<B>, poller: &'a mut Poller<S>, cadence: Cadence) -> Self {
        Monitor {
            display,
            poller,
            cadence,
            startup_delay: Duration::ZERO,
            cycle: cadence.poll_cycle.saturating_sub(1),
            linger: 0,
        }
    }

    /// Waits this long in [`run`](Monitor::run) before the first connection attempt.
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Returns the display being driven.
    pub fn display(&self) -> &Display<B> {
        self.display
    }

    /// Returns the poller being followed.
    pub fn poller(&self) -> &Poller<S> {
        self.poller
    }

    /// Returns the position within the poll cycle.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Returns the number of ticks scrolling remains paused.
    pub fn linger(&self) -> u32 {
        self.linger
    }

    /// Performs one tick of work without sleeping.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Display`] if the display fails, or [`MonitorError::BudgetExhausted`]
    /// if the poller has given up. Other poll failures are logged and retried on the next poll tick.
    pub fn tick(&mut self) -> Result<(), MonitorError> {
        self.cycle += 1;
        if self.cycle >= self.cadence.poll_cycle {
            self.cycle = 0;
            self.poll()?;
            self.display.update_clock()?;
        } else if self.linger == 0 {
            if self.display.advance_scroll()? == 0 {
                self.linger = self.cadence.linger_cycle;
            }
        } else {
            self.linger -= 1;
        }
        Ok(())
    }

    /// Runs until `stop` is triggered or an unrecoverable error occurs.
    ///
    /// Always leaves the display cleared and dark and the poller disconnected on the way out.
    pub fn run(&mut self, stop: &StopToken) -> Result<(), MonitorError> {
        info!("Monitor starting");
        if !self.startup_delay.is_zero() && stop.wait(self.startup_delay) {
            info!("Stopped before startup finished");
            self.clean_up();
            return Ok(());
        }

        if let Err(e) = self.poller.connect() {
            warn!("Initial connection failed, will keep trying: {}", e);
        }

        let result = loop {
            if stop.is_stopped() || stop.wait(self.cadence.tick) {
                info!("Stop requested");
                break Ok(());
            }
            if let Err(e) = self.tick() {
                error!("Monitor giving up: {}", e);
                break Err(e);
            }
        };

        self.clean_up();
        result
    }

    fn poll(&mut self) -> Result<(), MonitorError> {
        match self.poller.poll() {
            Ok(delta) => {
                if let Some(state) = delta.state {
                    self.display.set_state_backlight(state)?;
                }
                if let Some(song) = delta.song {
                    let text = if song.is_empty() { STOPPED_BANNER } else { song.as_str() };
                    self.display.set_marquee(text)?;
                }
            }
            Err(e) if self.poller.is_fatal() => return Err(MonitorError::BudgetExhausted { source: e }),
            Err(e) => warn!("Poll failed, will retry: {}", e),
        }
        Ok(())
    }

    fn clean_up(&mut self) {
        if let Err(e) = self.display.shut_down() {
            error!("Couldn't shut the display down: {}", e);
        }
        self.poller.disconnect();
        info!("Monitor stopped");
    }
}
