use std::path::PathBuf;
use std::time::Duration;

use crate::core::Geometry;
use crate::mpd::{Endpoint, DEFAULT_PORT, DEFAULT_SOCKET};
use crate::poller::DEFAULT_ERROR_THRESHOLD;

/// The serial device the display backpack usually shows up as.
pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";

/// Timing of the monitor loop, measured in ticks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cadence {
    /// Time between ticks; also the scroll speed.
    pub tick: Duration,

    /// The player is polled once every this many ticks.
    pub poll_cycle: u32,

    /// Ticks to hold still after the marquee comes back around to its start.
    pub linger_cycle: u32,
}

impl Default for Cadence {
    /// Three ticks a second, polling every ten seconds and lingering ten seconds per wrap.
    fn default() -> Self {
        Cadence {
            tick: Duration::from_millis(333),
            poll_cycle: 30,
            linger_cycle: 30,
        }
    }
}

/// Everything needed to start monitoring.
///
/// # Examples
///
/// ```
/// use mpdlcd::{Config, Endpoint};
///
/// let config = Config::with_device("/dev/ttyUSB0");
/// assert_eq!("/dev/ttyUSB0", config.device.to_str().unwrap());
/// assert_eq!(Endpoint::Unix("/var/run/mpd/socket".into()), config.endpoint());
/// assert_eq!(20, config.error_threshold);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Config {
    /// Serial device of the display.
    pub device: PathBuf,

    /// MPD host name, or an absolute path to its Unix socket.
    pub mpd_host: String,

    /// MPD TCP port. Ignored for Unix sockets.
    pub mpd_port: u16,

    /// MPD password, if the server requires one.
    pub mpd_password: Option<String>,

    /// Display dimensions.
    pub geometry: Geometry,

    /// Loop timing.
    pub cadence: Cadence,

    /// Consecutive failed polls tolerated before giving up.
    pub error_threshold: u32,

    /// Pause before the first connection attempt, giving MPD time to start at boot.
    pub startup_delay: Duration,
}

impl Config {
    /// Default configuration, but for the given serial device.
    pub fn with_device<P: Into<PathBuf>>(device: P) -> Self {
        Config {
            device: device.into(),
            ..Config::default()
        }
    }

    /// Returns where to find MPD.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::from_host_port(&self.mpd_host, self.mpd_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            device: PathBuf::from(DEFAULT_DEVICE),
            mpd_host: DEFAULT_SOCKET.to_string(),
            mpd_port: DEFAULT_PORT,
            mpd_password: None,
            geometry: Geometry::default(),
            cadence: Cadence::default(),
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            startup_delay: Duration::from_secs(6),
        }
    }
}
