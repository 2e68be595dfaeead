//! Shows what MPD is playing on a serial character LCD.
//!
//! Usage: `mpdlcd [DEVICE]`, where `DEVICE` defaults to `/dev/ttyACM0`. Set `RUST_LOG` to
//! change the log level (default `info`).
//!
//! SIGINT and SIGTERM stop the monitor at its next tick, which clears the display, turns the
//! backlight off and exits with status 0. Exit status 1 means the player was unreachable for
//! too long, 2 an unexpected error and 3 a panic.

use std::env;
use std::error::Error as _;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::process;

use log::{error, info, warn};
use thiserror::Error;

use mpdlcd::serial::SerialError;
use mpdlcd::{Config, Display, DisplayError, ExitStatus, Monitor, MonitorError, MpdClient, Poller, SerialLcdBus, StopToken};

#[derive(Debug, Error)]
enum AppError {
    #[error("Couldn't open serial device {}", device)]
    Open {
        device: String,
        #[source]
        source: serial::Error,
    },

    #[error("Couldn't configure the display port")]
    Port {
        #[from]
        source: SerialError,
    },

    #[error("Couldn't start the display session")]
    Display {
        #[from]
        source: DisplayError,
    },

    #[error("Monitor failed")]
    Monitor {
        #[from]
        source: MonitorError,
    },
}

impl AppError {
    fn exit_status(&self) -> ExitStatus {
        match self {
            AppError::Monitor { source } => ExitStatus::from(source),
            _ => ExitStatus::Unexpected,
        }
    }

    fn report(&self) -> String {
        let mut message = self.to_string();
        let mut cause = self.source();
        while let Some(error) = cause {
            message.push_str(": ");
            message.push_str(&error.to_string());
            cause = error.source();
        }
        message
    }
}

fn run(config: &Config, stop: &StopToken) -> Result<(), AppError> {
    let port = serial::open(&config.device).map_err(|source| AppError::Open {
        device: config.device.display().to_string(),
        source,
    })?;
    let bus = SerialLcdBus::try_new(port)?;
    let mut display = Display::new(bus, config.geometry)?;

    let client = MpdClient::new(config.endpoint()).with_password(config.mpd_password.clone());
    let mut poller = Poller::with_threshold(client, config.error_threshold);

    Monitor::new(&mut display, &mut poller, config.cadence)
        .with_startup_delay(config.startup_delay)
        .run(stop)?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("mpdlcd starts");

    let config = match env::args_os().nth(1) {
        Some(device) => {
            info!("Serial port: {}", Path::new(&device).display());
            Config::with_device(device)
        }
        None => Config::default(),
    };

    let stop = StopToken::new();
    if let Err(e) = stop.stop_on_termination() {
        warn!("Couldn't install the termination handler, signals will skip cleanup: {}", e);
    }
    let status = match panic::catch_unwind(AssertUnwindSafe(|| run(&config, &stop))) {
        Ok(Ok(())) => ExitStatus::Normal,
        Ok(Err(e)) => {
            error!("{}", e.report());
            e.exit_status()
        }
        Err(_) => ExitStatus::Abnormal,
    };

    if status == ExitStatus::Normal {
        info!("mpdlcd ends: {}", status);
    } else {
        error!("mpdlcd ends: {}", status);
    }
    process::exit(status.code());
}
