use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::time::Duration;

use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use thiserror::Error;

/// Where MPD listens when nothing else is configured.
pub const DEFAULT_SOCKET: &str = "/var/run/mpd/socket";

/// MPD's standard TCP port.
pub const DEFAULT_PORT: u16 = 6600;

/// How long a single read or write to MPD may block.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The `key: value` pairs of one MPD response, with keys lowercased.
///
/// When a key repeats, the first value wins.
pub type Fields = HashMap<String, String>;

lazy_static! {
    static ref GREETING: Regex = Regex::new(r"^OK MPD (\d+\.\d+\.\d+)$").unwrap();
    static ref ACK: Regex = Regex::new(r"^ACK \[(\d+)@(\d+)\] \{([^}]*)\} (.*)$").unwrap();
}

/// Errors related to talking to MPD.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MpdError {
    /// A command was issued without an open connection.
    #[error("Not connected to MPD")]
    NotConnected,

    /// Reading from or writing to the socket failed.
    #[error("MPD connection failed")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// The server did not introduce itself as MPD.
    #[error("Unexpected greeting from server: {}", line)]
    Greeting {
        /// The first line the server sent.
        line: String,
    },

    /// MPD rejected a command.
    #[error("MPD error {} on command '{}': {}", code, command, message)]
    Ack {
        /// MPD's numeric error code.
        code: u32,

        /// Position of the failing command in a command list.
        index: u32,

        /// The command MPD blamed.
        command: String,

        /// Human-readable explanation.
        message: String,
    },

    /// A response line didn't fit the protocol.
    #[error("Malformed response line from MPD: {}", line)]
    Protocol {
        /// The offending line.
        line: String,
    },

    /// The server hung up.
    #[error("MPD closed the connection")]
    ConnectionClosed,
}

/// Where to find the MPD server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// A Unix domain socket.
    Unix(PathBuf),

    /// A TCP host and port.
    Tcp {
        /// Host name or address.
        host: String,

        /// Port number.
        port: u16,
    },
}

impl Endpoint {
    /// Interprets a host the way MPD clients conventionally do: an absolute path names a
    /// Unix socket and the port is ignored; anything else is a TCP host.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpdlcd::Endpoint;
    ///
    /// assert_eq!(Endpoint::Unix("/run/mpd/socket".into()), Endpoint::from_host_port("/run/mpd/socket", 6600));
    /// assert_eq!(
    ///     Endpoint::Tcp { host: "localhost".into(), port: 6601 },
    ///     Endpoint::from_host_port("localhost", 6601)
    /// );
    /// ```
    pub fn from_host_port(host: &str, port: u16) -> Self {
        if host.starts_with('/') {
            Endpoint::Unix(PathBuf::from(host))
        } else {
            Endpoint::Tcp {
                host: host.to_string(),
                port,
            }
        }
    }

    fn open(&self, timeout: Duration) -> io::Result<Stream> {
        match self {
            Endpoint::Tcp { host, port } => {
                let mut last_error = None;
                for address in (host.as_str(), *port).to_socket_addrs()? {
                    match TcpStream::connect_timeout(&address, timeout) {
                        Ok(stream) => return Ok(Stream::Tcp(stream)),
                        Err(e) => last_error = Some(e),
                    }
                }
                Err(last_error.unwrap_or_else(|| {
                    io::Error::new(io::ErrorKind::NotFound, format!("No addresses found for {}", host))
                }))
            }
            #[cfg(unix)]
            Endpoint::Unix(path) => Ok(Stream::Unix(UnixStream::connect(path)?)),
            #[cfg(not(unix))]
            Endpoint::Unix(path) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("Unix sockets are not available for {}", path.display()),
            )),
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Unix(PathBuf::from(DEFAULT_SOCKET))
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Unix(path) => write!(f, "{}", path.display()),
            Endpoint::Tcp { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

/// Abstraction over a connection to something that reports player status.
///
/// [`MpdClient`] is the real implementation; tests substitute scripted sources.
pub trait StatusSource {
    /// Opens a connection, replacing any existing one.
    fn connect(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Closes the connection, ignoring any errors.
    fn disconnect(&mut self);

    /// Fetches the player status. The `state` field holds the play state.
    fn status(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>>;

    /// Fetches the tags of the current song, which is empty if there is none.
    fn current_song(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>>;
}

// Provide a Debug representation so types that contain trait objects can derive Debug.
impl Debug for dyn StatusSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<StatusSource trait>")
    }
}

impl<S: StatusSource + ?Sized> StatusSource for Box<S> {
    fn connect(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).connect()
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }

    fn status(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>> {
        (**self).status()
    }

    fn current_song(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>> {
        (**self).current_song()
    }
}

#[derive(Debug)]
enum Stream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl Stream {
    fn configure(&self, timeout: Duration) -> io::Result<()> {
        match self {
            Stream::Tcp(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
            #[cfg(unix)]
            Stream::Unix(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))
            }
        }
    }

    fn try_clone(&self) -> io::Result<Self> {
        match self {
            Stream::Tcp(stream) => Ok(Stream::Tcp(stream.try_clone()?)),
            #[cfg(unix)]
            Stream::Unix(stream) => Ok(Stream::Unix(stream.try_clone()?)),
        }
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Stream::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Stream::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Stream::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Stream::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Stream::Unix(stream) => stream.flush(),
        }
    }
}

#[derive(Debug)]
struct Connection {
    reader: BufReader<Stream>,
    writer: Stream,
    version: String,
}

impl Connection {
    fn read_line(&mut self) -> Result<String, MpdError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(MpdError::ConnectionClosed);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn command(&mut self, command: &str) -> Result<Fields, MpdError> {
        self.writer.write_all(command.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        let mut fields = Fields::new();
        loop {
            let line = self.read_line()?;
            if line == "OK" {
                return Ok(fields);
            }
            if let Some(ack) = parse_ack(&line) {
                return Err(ack);
            }
            match line.split_once(": ") {
                Some((key, value)) => {
                    let _ = fields.entry(key.to_lowercase()).or_insert_with(|| value.to_string());
                }
                None => return Err(MpdError::Protocol { line }),
            }
        }
    }
}

fn parse_ack(line: &str) -> Option<MpdError> {
    let captures = ACK.captures(line)?;
    Some(MpdError::Ack {
        code: captures[1].parse().ok()?,
        index: captures[2].parse().ok()?,
        command: captures[3].to_string(),
        message: captures[4].to_string(),
    })
}

fn quote(argument: &str) -> String {
    let mut quoted = String::with_capacity(argument.len() + 2);
    quoted.push('"');
    for c in argument.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// A minimal blocking client for MPD's line protocol.
///
/// Speaks only what's needed to follow playback: `status`, `currentsong`, `password`, `ping`
/// and `close`. Any I/O failure drops the connection, so after an error [`is_connected`](MpdClient::is_connected)
/// tells whether a reconnect is needed. An `ACK` from the server leaves the connection open.
///
/// # Examples
///
/// ```no_run
/// use mpdlcd::{Endpoint, MpdClient};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// #
/// let mut client = MpdClient::new(Endpoint::from_host_port("localhost", 6600));
/// client.connect()?;
/// let status = client.status()?;
/// println!("MPD is {}", status.get("state").map_or("?", String::as_str));
/// client.close();
/// #
/// # Ok(()) }
/// ```
#[derive(Debug)]
pub struct MpdClient {
    endpoint: Endpoint,
    password: Option<String>,
    timeout: Duration,
    connection: Option<Connection>,
}

impl MpdClient {
    /// Creates a new, unconnected `MpdClient` for the given endpoint.
    pub fn new(endpoint: Endpoint) -> Self {
        MpdClient {
            endpoint,
            password: None,
            timeout: DEFAULT_TIMEOUT,
            connection: None,
        }
    }

    /// Sets the password sent after each connect.
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }

    /// Sets the socket read/write timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured endpoint.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the protocol version announced by the server, if connected.
    pub fn server_version(&self) -> Option<&str> {
        self.connection.as_ref().map(|connection| connection.version.as_str())
    }

    /// Opens a connection, reads the greeting, and authenticates if a password is set.
    ///
    /// Any existing connection is dropped first.
    ///
    /// # Errors
    ///
    /// Returns:
    /// * [`MpdError::Io`] if the server can't be reached.
    /// * [`MpdError::Greeting`] if the server isn't MPD.
    /// * [`MpdError::Ack`] if the password is rejected.
    pub fn connect(&mut self) -> Result<(), MpdError> {
        self.connection = None;

        let stream = self.endpoint.open(self.timeout)?;
        stream.configure(self.timeout)?;
        let writer = stream.try_clone()?;
        let mut connection = Connection {
            reader: BufReader::new(stream),
            writer,
            version: String::new(),
        };

        let greeting = connection.read_line()?;
        connection.version = match GREETING.captures(&greeting) {
            Some(captures) => captures[1].to_string(),
            None => return Err(MpdError::Greeting { line: greeting }),
        };

        if let Some(password) = &self.password {
            debug!("MPD command: password");
            let _ = connection.command(&format!("password {}", quote(password)))?;
        }

        info!("Connected to MPD {} at {}", connection.version, self.endpoint);
        self.connection = Some(connection);
        Ok(())
    }

    /// Sends a raw command and collects its response fields.
    ///
    /// # Errors
    ///
    /// Returns [`MpdError::NotConnected`] without a connection, [`MpdError::Ack`] if MPD
    /// rejects the command, or another variant if the connection failed (in which case it is closed).
    pub fn command(&mut self, command: &str) -> Result<Fields, MpdError> {
        let connection = self.connection.as_mut().ok_or(MpdError::NotConnected)?;
        debug!("MPD command: {}", command);
        let result = connection.command(command);
        if let Err(ref e) = result {
            if !matches!(e, MpdError::Ack { .. }) {
                debug!("Dropping MPD connection after error: {}", e);
                self.connection = None;
            }
        }
        result
    }

    /// Fetches the player status.
    pub fn status(&mut self) -> Result<Fields, MpdError> {
        self.command("status")
    }

    /// Fetches the tags of the current song.
    pub fn current_song(&mut self) -> Result<Fields, MpdError> {
        self.command("currentsong")
    }

    /// Checks that the server is still answering.
    pub fn ping(&mut self) -> Result<(), MpdError> {
        let _ = self.command("ping")?;
        Ok(())
    }

    /// Politely ends the session, ignoring any errors. Does nothing if not connected.
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            debug!("MPD command: close");
            let _ = connection.writer.write_all(b"close\n");
            let _ = connection.writer.flush();
            info!("Disconnected from MPD at {}", self.endpoint);
        }
    }
}

impl StatusSource for MpdClient {
    fn connect(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(MpdClient::connect(self)?)
    }

    fn disconnect(&mut self) {
        self.close();
    }

    fn status(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>> {
        Ok(MpdClient::status(self)?)
    }

    fn current_song(&mut self) -> Result<Fields, Box<dyn std::error::Error + Send + Sync>> {
        Ok(MpdClient::current_song(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_case::test_case;

    #[test_case("secret", "\"secret\"" ; "plain")]
    #[test_case("say \"hi\"", "\"say \\\"hi\\\"\"" ; "quotes")]
    #[test_case("back\\slash", "\"back\\\\slash\"" ; "backslash")]
    fn quoting(input: &str, expected: &str) {
        assert_eq!(expected, quote(input));
    }

    #[test]
    fn ack_parsed() {
        let error = parse_ack("ACK [50@0] {play} song doesn't exist: \"10240\"").unwrap();
        match error {
            MpdError::Ack {
                code,
                index,
                command,
                message,
            } => {
                assert_eq!(50, code);
                assert_eq!(0, index);
                assert_eq!("play", command);
                assert_eq!("song doesn't exist: \"10240\"", message);
            }
            other => panic!("Unexpected error {:?}", other),
        }
    }

    #[test]
    fn ack_with_empty_command() {
        assert!(matches!(
            parse_ack("ACK [5@0] {} unknown command \"x\""),
            Some(MpdError::Ack { code: 5, .. })
        ));
    }

    #[test_case("OK" ; "ok")]
    #[test_case("state: play" ; "field")]
    #[test_case("ACK oops" ; "malformed ack")]
    fn not_ack(line: &str) {
        assert!(parse_ack(line).is_none());
    }

    #[test]
    fn greeting_pattern() {
        assert!(GREETING.is_match("OK MPD 0.23.5"));
        assert!(!GREETING.is_match("OK MPD"));
        assert!(!GREETING.is_match("SSH-2.0-OpenSSH_9.6"));
    }

    #[test]
    fn endpoint_display() {
        assert_eq!("/var/run/mpd/socket", Endpoint::default().to_string());
        assert_eq!("localhost:6600", Endpoint::from_host_port("localhost", DEFAULT_PORT).to_string());
    }

    #[test]
    fn command_without_connection() {
        let mut client = MpdClient::new(Endpoint::default());
        assert!(matches!(client.status(), Err(MpdError::NotConnected)));
        assert!(client.server_version().is_none());
        client.close();
    }
}
