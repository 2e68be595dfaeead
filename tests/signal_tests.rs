#![cfg(unix)]

use std::process::{self, Command};
use std::time::Duration;

use mpdlcd::StopToken;

// Handlers are process-wide, so this file holds a single test.
#[test]
fn termination_signal_stops_token() {
    let stop = StopToken::new();
    stop.stop_on_termination().unwrap();
    assert!(!stop.is_stopped());

    let status = Command::new("kill")
        .arg("-TERM")
        .arg(process::id().to_string())
        .status()
        .unwrap();
    assert!(status.success());
    assert!(stop.wait(Duration::from_secs(5)));

    assert!(StopToken::new().stop_on_termination().is_err());
}
