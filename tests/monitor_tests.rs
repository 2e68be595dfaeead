use std::thread;
use std::time::Duration;

use mpdlcd::core::{Geometry, NamedColor};
use mpdlcd::{Cadence, Display, Endpoint, ExitStatus, Monitor, MonitorError, MpdClient, Poller, StopToken};
use mpdlcd_testing::{Backlight, MockMpdServer, VirtualLcd};

fn cadence(poll_cycle: u32, linger_cycle: u32) -> Cadence {
    Cadence {
        tick: Duration::ZERO,
        poll_cycle,
        linger_cycle,
    }
}

fn poller(server: &MockMpdServer, threshold: u32) -> Poller<MpdClient> {
    let client = MpdClient::new(Endpoint::from_host_port("127.0.0.1", server.port()));
    Poller::with_threshold(client, threshold)
}

fn display() -> Display<VirtualLcd> {
    Display::new(VirtualLcd::new(Geometry::default()), Geometry::default()).unwrap()
}

#[test]
fn follows_player() {
    let server = MockMpdServer::start().unwrap();
    server.set_state("play");
    server.set_song(Some("The Monkees"), Some("Daydream Believer"));

    let mut display = display();
    let mut poller = poller(&server, 20);
    let mut monitor = Monitor::new(&mut display, &mut poller, cadence(4, 0));

    monitor.tick().unwrap();
    assert_eq!(Backlight::On(NamedColor::Green.rgb()), monitor.display().bus().backlight());
    assert_eq!(" The Monkees: Da", monitor.display().bus().row(0));

    // Scroll ticks between polls.
    for _ in 0..3 {
        monitor.tick().unwrap();
    }
    assert_eq!("e Monkees: Daydr", monitor.display().bus().row(0));

    server.set_state("pause");
    monitor.tick().unwrap();
    assert_eq!(Backlight::On(NamedColor::Amber.rgb()), monitor.display().bus().backlight());
    assert_eq!("e Monkees: Daydr", monitor.display().bus().row(0));

    server.set_state("stop");
    server.clear_song();
    for _ in 0..4 {
        monitor.tick().unwrap();
    }
    assert_eq!(Backlight::Off, monitor.display().bus().backlight());
    assert_eq!("     Stopped    ", monitor.display().bus().row(0));
}

#[test]
fn poll_ticks_never_scroll() {
    let server = MockMpdServer::start().unwrap();
    server.set_state("play");
    server.set_song(None, Some("A very long stream title for the radio"));

    let mut display = display();
    let mut poller = poller(&server, 20);
    let mut monitor = Monitor::new(&mut display, &mut poller, cadence(1, 0));
    for _ in 0..5 {
        monitor.tick().unwrap();
        assert_eq!(0, monitor.display().scroll_offset());
    }
}

#[test]
fn transient_failure_is_retried() {
    let server = MockMpdServer::start().unwrap();
    server.set_state("play");
    server.set_song(Some("A"), Some("T"));

    let mut display = display();
    let mut poller = poller(&server, 20);
    let mut monitor = Monitor::new(&mut display, &mut poller, cadence(1, 0));
    monitor.tick().unwrap();

    server.set_refusing(true);
    monitor.tick().unwrap();
    assert_eq!(1, monitor.poller().budget().consecutive_failures());
    assert_eq!("A: T            ", monitor.display().bus().row(0));

    server.set_refusing(false);
    monitor.tick().unwrap();
    assert_eq!(0, monitor.poller().budget().consecutive_failures());
}

#[test]
fn lost_server_is_fatal() {
    let server = MockMpdServer::start().unwrap();
    server.set_refusing(true);

    let mut display = display();
    display.set_marquee("Left over").unwrap();
    let mut poller = poller(&server, 3);

    let result = Monitor::new(&mut display, &mut poller, cadence(1, 0)).run(&StopToken::new());
    let error = result.unwrap_err();
    assert!(matches!(error, MonitorError::BudgetExhausted { .. }));
    assert_eq!(ExitStatus::PollerFatal, ExitStatus::from(&error));

    assert_eq!(Backlight::Off, display.bus().backlight());
    assert_eq!("                ", display.bus().row(0));
    assert_eq!("                ", display.bus().row(1));
}

#[test]
fn stop_from_another_thread() {
    let server = MockMpdServer::start().unwrap();
    server.set_state("play");
    server.set_song(Some("A"), Some("T"));

    let mut display = display();
    let mut poller = poller(&server, 20);
    let stop = StopToken::new();
    let stopper = {
        let stop = stop.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(200));
            stop.stop();
        })
    };

    let cadence = Cadence {
        tick: Duration::from_millis(10),
        poll_cycle: 3,
        linger_cycle: 2,
    };
    Monitor::new(&mut display, &mut poller, cadence).run(&stop).unwrap();
    stopper.join().unwrap();

    assert!(server.commands().iter().any(|command| command == "status"));
    assert!(!poller.source().is_connected());
    assert_eq!(Backlight::Off, display.bus().backlight());
}
