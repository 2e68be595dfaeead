use std::collections::VecDeque;
use std::io;

use mpdlcd::{
    ConnectionState, Endpoint, Fields, MpdClient, PlaybackState, PollDelta, Poller, PollerError, StatusSource,
};
use mpdlcd_testing::MockMpdServer;

/// One scripted poll outcome.
#[derive(Debug, Clone)]
enum Step {
    Reply {
        state: &'static str,
        artist: Option<&'static str>,
        title: Option<&'static str>,
    },
    Fail,
}

fn play(artist: &'static str, title: &'static str) -> Step {
    Step::Reply {
        state: "play",
        artist: Some(artist),
        title: Some(title),
    }
}

/// Status source that replays a fixed script of replies and failures.
/// A failing step fails every request until the next step is reached.
#[derive(Debug)]
struct ScriptedSource {
    steps: VecDeque<Step>,
    current: Option<Step>,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>) -> Self {
        ScriptedSource {
            steps: steps.into(),
            current: None,
        }
    }

    fn advance(&mut self) {
        self.current = self.steps.pop_front();
    }

    fn refuse() -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(io::Error::new(io::ErrorKind::ConnectionReset, "Dummy reset"))
    }
}

impl StatusSource for ScriptedSource {
    fn connect(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self.current {
            Some(Step::Fail) => Err(ScriptedSource::refuse()),
            _ => Ok(()),
        }
    }

    fn disconnect(&mut self) {}

    fn status(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>> {
        match &self.current {
            Some(Step::Reply { state, .. }) => {
                let mut fields = Fields::new();
                let _ = fields.insert("state".into(), state.to_string());
                Ok(fields)
            }
            _ => Err(ScriptedSource::refuse()),
        }
    }

    fn current_song(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>> {
        match &self.current {
            Some(Step::Reply { artist, title, .. }) => {
                let mut fields = Fields::new();
                if let Some(artist) = artist {
                    let _ = fields.insert("artist".into(), artist.to_string());
                }
                if let Some(title) = title {
                    let _ = fields.insert("title".into(), title.to_string());
                }
                Ok(fields)
            }
            _ => Err(ScriptedSource::refuse()),
        }
    }
}

fn step(poller: &mut Poller<ScriptedSource>) -> Result<PollDelta, PollerError> {
    poller.source_mut().advance();
    poller.poll()
}

#[test]
fn deltas_follow_changes() {
    let source = ScriptedSource::new(vec![
        play("A", "T1"),
        play("A", "T1"),
        play("A", "T2"),
        Step::Reply {
            state: "pause",
            artist: Some("A"),
            title: Some("T2"),
        },
        Step::Reply {
            state: "stop",
            artist: None,
            title: None,
        },
    ]);
    let mut poller = Poller::new(source);

    let delta = step(&mut poller).unwrap();
    assert_eq!(Some(PlaybackState::Playing), delta.state);
    assert_eq!(Some("A: T1".to_string()), delta.song);

    assert!(step(&mut poller).unwrap().is_empty());

    let delta = step(&mut poller).unwrap();
    assert_eq!(None, delta.state);
    assert_eq!(Some("A: T2".to_string()), delta.song);

    let delta = step(&mut poller).unwrap();
    assert_eq!(Some(PlaybackState::Paused), delta.state);
    assert_eq!(None, delta.song);

    let delta = step(&mut poller).unwrap();
    assert_eq!(Some(PlaybackState::Stopped), delta.state);
    assert_eq!(Some(String::new()), delta.song);
}

#[test]
fn stream_without_artist() {
    let source = ScriptedSource::new(vec![Step::Reply {
        state: "play",
        artist: None,
        title: Some("Radio Paradise"),
    }]);
    let mut poller = Poller::new(source);
    assert_eq!(Some("Radio Paradise".to_string()), step(&mut poller).unwrap().song);
}

#[test]
fn exactly_threshold_failures_is_fatal() {
    let mut steps = vec![Step::Fail; 20];
    steps.push(play("A", "T"));
    let mut poller = Poller::new(ScriptedSource::new(steps));

    for failures in 1..20 {
        assert!(step(&mut poller).is_err());
        assert_eq!(failures, poller.budget().consecutive_failures());
        assert!(!poller.is_fatal());
    }
    assert!(step(&mut poller).is_err());
    assert!(poller.is_fatal());
    assert!(matches!(step(&mut poller), Err(PollerError::BudgetExhausted { failures: 20 })));
}

#[test]
fn one_short_then_success_resets() {
    let mut steps = vec![Step::Fail; 19];
    steps.push(play("A", "T"));
    let mut poller = Poller::new(ScriptedSource::new(steps));

    for _ in 0..19 {
        assert!(step(&mut poller).is_err());
    }
    assert!(step(&mut poller).is_ok());
    assert_eq!(0, poller.budget().consecutive_failures());
    assert!(!poller.is_fatal());
}

#[test]
fn snapshot_survives_failures() {
    let mut poller = Poller::new(ScriptedSource::new(vec![play("A", "T"), Step::Fail, play("A", "T")]));
    assert!(step(&mut poller).is_ok());
    assert!(step(&mut poller).is_err());
    assert!(step(&mut poller).unwrap().is_empty());
}

#[test]
fn follows_real_protocol() {
    let server = MockMpdServer::start().unwrap();
    server.set_state("play");
    server.set_song(Some("The Monkees"), Some("Porpoise Song"));

    let client = MpdClient::new(Endpoint::from_host_port("127.0.0.1", server.port()));
    let mut poller = Poller::new(client);
    poller.connect().unwrap();
    assert_eq!(ConnectionState::Connected, poller.state());

    let delta = poller.poll().unwrap();
    assert_eq!(Some(PlaybackState::Playing), delta.state);
    assert_eq!(Some("The Monkees: Porpoise Song".to_string()), delta.song);

    server.set_state("pause");
    let delta = poller.poll().unwrap();
    assert_eq!(Some(PlaybackState::Paused), delta.state);
    assert_eq!(None, delta.song);

    poller.disconnect();
    assert_eq!(ConnectionState::Disconnected, poller.state());
}

#[test]
fn recovers_after_server_drop() {
    let server = MockMpdServer::start().unwrap();
    let client = MpdClient::new(Endpoint::from_host_port("127.0.0.1", server.port()));
    let mut poller = Poller::new(client);
    assert!(poller.poll().is_ok());

    server.set_refusing(true);
    assert!(poller.poll().is_err());
    assert_eq!(1, poller.budget().consecutive_failures());

    server.set_refusing(false);
    assert!(poller.poll().is_ok());
    assert_eq!(0, poller.budget().consecutive_failures());
    assert_eq!(ConnectionState::Connected, poller.state());
}
