use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

/// Protocol version announced in the greeting line.
pub const MOCK_VERSION: &str = "0.23.5";

const IDLE_POLL: Duration = Duration::from_millis(20);

/// What the fake player reports to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
struct Player {
    state: Option<String>,
    artist: Option<String>,
    title: Option<String>,
    has_song: bool,
    password: Option<String>,
    refusing: bool,
}

#[derive(Debug, Default)]
struct Shared {
    player: Mutex<Player>,
    commands: Mutex<Vec<String>>,
    connections: AtomicUsize,
    shutdown: AtomicBool,
}

impl Shared {
    fn player(&self) -> MutexGuard<'_, Player> {
        self.player.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A tiny MPD server on the loopback interface that speaks just enough of the protocol
/// to exercise a status client.
///
/// Supports the `status`, `currentsong`, `password`, `ping` and `close` commands. Anything
/// else is answered with an `ACK`. The reported player state can be changed at any time
/// from the test thread, and the server can be told to start dropping clients to simulate
/// MPD going away.
///
/// The server shuts down when dropped.
///
/// # Examples
///
/// ```
/// use std::io::{BufRead, BufReader, Write};
/// use std::net::TcpStream;
/// use mpdlcd_testing::MockMpdServer;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let server = MockMpdServer::start()?;
/// server.set_state("play");
///
/// let mut stream = TcpStream::connect(server.address())?;
/// let mut reader = BufReader::new(stream.try_clone()?);
/// let mut line = String::new();
/// reader.read_line(&mut line)?;
/// assert!(line.starts_with("OK MPD "));
///
/// stream.write_all(b"status\n")?;
/// line.clear();
/// reader.read_line(&mut line)?;
/// assert_eq!("state: play\n", line);
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct MockMpdServer {
    address: SocketAddr,
    shared: Arc<Shared>,
    acceptor: Option<JoinHandle<()>>,
}

impl MockMpdServer {
    /// Binds an ephemeral port on 127.0.0.1 and starts serving in the background.
    ///
    /// The player starts stopped with no current song.
    pub fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let address = listener.local_addr()?;

        let shared = Arc::new(Shared::default());
        shared.player().state = Some("stop".into());

        let acceptor = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("mock-mpd".into())
                .spawn(move || accept_loop(&listener, &shared))?
        };

        info!("Mock MPD listening on {}", address);
        Ok(MockMpdServer {
            address,
            shared,
            acceptor: Some(acceptor),
        })
    }

    /// Returns the address clients should connect to.
    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Returns the port clients should connect to.
    pub fn port(&self) -> u16 {
        self.address.port()
    }

    /// Sets the raw `state:` value reported by `status`, e.g. `"play"`.
    pub fn set_state(&self, state: &str) {
        self.shared.player().state = Some(state.into());
    }

    /// Makes `status` omit the `state:` line entirely.
    pub fn clear_state(&self) {
        self.shared.player().state = None;
    }

    /// Sets the current song. Either tag may be missing.
    pub fn set_song(&self, artist: Option<&str>, title: Option<&str>) {
        let mut player = self.shared.player();
        player.has_song = true;
        player.artist = artist.map(Into::into);
        player.title = title.map(Into::into);
    }

    /// Removes the current song, so `currentsong` returns an empty response.
    pub fn clear_song(&self) {
        let mut player = self.shared.player();
        player.has_song = false;
        player.artist = None;
        player.title = None;
    }

    /// Requires clients to send `password` with this value before anything else is answered.
    pub fn set_password(&self, password: Option<&str>) {
        self.shared.player().password = password.map(Into::into);
    }

    /// While `true`, new clients are hung up on before the greeting and existing clients
    /// are dropped on their next command.
    pub fn set_refusing(&self, refusing: bool) {
        self.shared.player().refusing = refusing;
    }

    /// Returns the number of connections accepted so far, including refused ones.
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    /// Returns every command line received so far, across all connections.
    pub fn commands(&self) -> Vec<String> {
        self.shared
            .commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Drop for MockMpdServer {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        if let Some(acceptor) = self.acceptor.take() {
            if acceptor.join().is_err() {
                warn!("Mock MPD acceptor thread panicked");
            }
        }
        debug!("Mock MPD on {} shut down", self.address);
    }
}

fn accept_loop(listener: &TcpListener, shared: &Arc<Shared>) {
    let mut clients = Vec::new();
    while !shared.shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let _ = shared.connections.fetch_add(1, Ordering::SeqCst);
                debug!("Mock MPD accepted {}", peer);
                let shared = Arc::clone(shared);
                match thread::Builder::new()
                    .name("mock-mpd-client".into())
                    .spawn(move || serve(stream, &shared))
                {
                    Ok(handle) => clients.push(handle),
                    Err(e) => warn!("Mock MPD couldn't spawn client thread: {}", e),
                }
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(IDLE_POLL),
            Err(e) => {
                warn!("Mock MPD accept failed: {}", e);
                thread::sleep(IDLE_POLL);
            }
        }
    }
    for client in clients {
        let _ = client.join();
    }
}

fn serve(stream: TcpStream, shared: &Shared) {
    if let Err(e) = try_serve(stream, shared) {
        debug!("Mock MPD client ended: {}", e);
    }
}

fn try_serve(mut stream: TcpStream, shared: &Shared) -> io::Result<()> {
    stream.set_nonblocking(false)?;
    if shared.player().refusing {
        return stream.shutdown(Shutdown::Both);
    }

    stream.set_read_timeout(Some(IDLE_POLL))?;
    writeln!(stream, "OK MPD {}", MOCK_VERSION)?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut authorized = shared.player().password.is_none();
    let mut line = String::new();

    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            return Ok(());
        }

        // A timed-out read leaves any partial line in `line`, so keep accumulating.
        match reader.read_line(&mut line) {
            Ok(0) => return Ok(()),
            Ok(_) => {}
            Err(ref e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => continue,
            Err(e) => return Err(e),
        }
        if !line.ends_with('\n') {
            continue;
        }

        let command = line.trim_end().to_string();
        line.clear();
        debug!("Mock MPD received: {}", command);
        shared
            .commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command.clone());

        let player = shared.player().clone();
        if player.refusing {
            return stream.shutdown(Shutdown::Both);
        }

        let (name, argument) = match command.find(' ') {
            Some(index) => (&command[..index], command[index + 1..].trim()),
            None => (command.as_str(), ""),
        };

        let response = match name {
            "close" => return Ok(()),
            "password" => {
                let given = argument.trim_matches('"');
                if player.password.as_deref().map_or(true, |expected| expected == given) {
                    authorized = true;
                    "OK\n".to_string()
                } else {
                    "ACK [3@0] {password} incorrect password\n".to_string()
                }
            }
            _ if !authorized => format!("ACK [4@0] {{{}}} you don't have permission for \"{}\"\n", name, name),
            "ping" => "OK\n".to_string(),
            "status" => status_response(&player),
            "currentsong" => current_song_response(&player),
            _ => format!("ACK [5@0] {{}} unknown command \"{}\"\n", name),
        };
        stream.write_all(response.as_bytes())?;
        stream.flush()?;
    }
}

fn status_response(player: &Player) -> String {
    let mut response = String::new();
    if let Some(state) = &player.state {
        response.push_str(&format!("state: {}\n", state));
    }
    response.push_str("volume: 100\nrepeat: 0\nrandom: 0\nOK\n");
    response
}

fn current_song_response(player: &Player) -> String {
    let mut response = String::new();
    if player.has_song {
        response.push_str("file: music/track.flac\n");
        if let Some(artist) = &player.artist {
            response.push_str(&format!("Artist: {}\n", artist));
        }
        if let Some(title) = &player.title {
            response.push_str(&format!("Title: {}\n", title));
        }
    }
    response.push_str("OK\n");
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Client {
        stream: TcpStream,
        reader: BufReader<TcpStream>,
    }

    impl Client {
        fn connect(server: &MockMpdServer) -> Self {
            let stream = TcpStream::connect(server.address()).unwrap();
            stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
            let reader = BufReader::new(stream.try_clone().unwrap());
            Client { stream, reader }
        }

        fn line(&mut self) -> String {
            let mut line = String::new();
            let _ = self.reader.read_line(&mut line).unwrap();
            line
        }

        fn request(&mut self, command: &str) -> Vec<String> {
            self.stream.write_all(format!("{}\n", command).as_bytes()).unwrap();
            let mut lines = Vec::new();
            loop {
                let line = self.line();
                let done = line == "OK\n" || line.starts_with("ACK");
                lines.push(line);
                if done {
                    return lines;
                }
            }
        }
    }

    #[test]
    fn greets_and_reports_state() {
        let server = MockMpdServer::start().unwrap();
        let mut client = Client::connect(&server);
        assert_eq!(format!("OK MPD {}\n", MOCK_VERSION), client.line());

        let lines = client.request("status");
        assert_eq!("state: stop\n", lines[0]);
        assert_eq!("OK\n", lines[lines.len() - 1]);

        server.set_state("pause");
        assert_eq!("state: pause\n", client.request("status")[0]);
        assert_eq!(1, server.connections());
    }

    #[test]
    fn current_song() {
        let server = MockMpdServer::start().unwrap();
        let mut client = Client::connect(&server);
        let _ = client.line();

        assert_eq!(vec!["OK\n".to_string()], client.request("currentsong"));

        server.set_song(Some("Monkees"), None);
        let lines = client.request("currentsong");
        assert!(lines.contains(&"Artist: Monkees\n".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Title:")));
    }

    #[test]
    fn password_required() {
        let server = MockMpdServer::start().unwrap();
        server.set_password(Some("hunter2"));
        let mut client = Client::connect(&server);
        let _ = client.line();

        assert!(client.request("status")[0].starts_with("ACK [4@0]"));
        assert!(client.request("password \"wrong\"")[0].starts_with("ACK [3@0]"));
        assert_eq!(vec!["OK\n".to_string()], client.request("password \"hunter2\""));
        assert_eq!("state: stop\n", client.request("status")[0]);
    }

    #[test]
    fn unknown_command() {
        let server = MockMpdServer::start().unwrap();
        let mut client = Client::connect(&server);
        let _ = client.line();
        assert_eq!(
            vec!["ACK [5@0] {} unknown command \"frobnicate\"\n".to_string()],
            client.request("frobnicate")
        );
        assert_eq!(vec!["frobnicate".to_string()], server.commands());
    }

    #[test]
    fn refusing_hangs_up() {
        let server = MockMpdServer::start().unwrap();
        server.set_refusing(true);
        let mut client = Client::connect(&server);
        let mut line = String::new();
        let read = client.reader.read_line(&mut line);
        assert!(matches!(read, Ok(0)) || read.is_err());
    }
}
