//! Connection Handler
//!
//! Handles individual client connections.
//!
//! ## Per-connection state machine
//! ```text
//! ACCEPTED → READING → (DECODING → DISPATCHING → ENCODING → WRITING)* → CLOSED
//! ```
//! CLOSED is reached on end-of-stream, `EXIT`, server shutdown, idle timeout,
//! an over-long line, or a transport fault.

use std::io::ErrorKind;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::config::Config;
use crate::error::{PatientDbError, Result};
use crate::protocol::{decode_command, encode_response, Command, Response};
use crate::service::PatientService;

/// Initial capacity of the read buffer
const READ_BUFFER_CAPACITY: usize = 4 * 1024;

/// Per-connection limits taken from [`Config`]
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    /// `None` waits forever for the next command
    pub idle_timeout: Option<Duration>,
    pub max_line_bytes: usize,
}

impl From<&Config> for ConnectionOptions {
    fn from(config: &Config) -> Self {
        Self {
            idle_timeout: match config.idle_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
            max_line_bytes: config.max_line_bytes,
        }
    }
}

/// Result of waiting for the next line
enum Frame {
    Line(Vec<u8>),
    Eof,
    TooLong,
}

/// Handles a single client connection
pub struct Connection {
    /// Read half, drained into `buffer`
    reader: OwnedReadHalf,

    /// Write half (buffered, flushed after every reply)
    writer: BufWriter<OwnedWriteHalf>,

    /// Bytes received but not yet consumed as a line
    buffer: BytesMut,

    /// Prefix of `buffer` already searched for `\n`
    scanned: usize,

    /// Shared domain service
    service: Arc<PatientService>,

    options: ConnectionOptions,

    /// Flips to `true` when the server shuts down
    shutdown: watch::Receiver<bool>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(
        stream: TcpStream,
        service: Arc<PatientService>,
        options: ConnectionOptions,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm, replies are small and latency-bound
        stream.set_nodelay(true)?;

        let (reader, writer) = stream.into_split();

        Ok(Self {
            reader,
            writer: BufWriter::new(writer),
            buffer: BytesMut::with_capacity(READ_BUFFER_CAPACITY),
            scanned: 0,
            service,
            options,
            shutdown,
            peer_addr,
        })
    }

    /// Handle the connection until it closes
    ///
    /// Reads one line at a time and writes exactly one reply per command,
    /// in order. Command-level failures become `ERROR|` replies and the loop
    /// continues; transport faults end the loop.
    pub async fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let line = match self.read_line().await {
                Ok(Frame::Line(line)) => line,
                Ok(Frame::Eof) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(Frame::TooLong) => {
                    tracing::warn!(
                        "Client {} sent a line over {} bytes, closing",
                        self.peer_addr,
                        self.options.max_line_bytes
                    );
                    let too_long = PatientDbError::MalformedCommand("Command too long".to_string());
                    let _ = self.send_response(&Response::error(&too_long)).await;
                    return Ok(());
                }
                Err(PatientDbError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection {:?} by client {}", e.kind(), self.peer_addr);
                    return Ok(());
                }
                Err(PatientDbError::Io(ref e)) if e.kind() == ErrorKind::TimedOut => {
                    tracing::debug!("Idle timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            };

            if *self.shutdown.borrow() {
                tracing::debug!("Server shutting down, closing {}", self.peer_addr);
                return Ok(());
            }

            let response = match std::str::from_utf8(&line) {
                Ok(text) => {
                    tracing::trace!("Received from {}: {:?}", self.peer_addr, text);
                    match decode_command(text) {
                        Ok(Command::Exit) => {
                            tracing::debug!("Client {} sent EXIT", self.peer_addr);
                            return Ok(());
                        }
                        Ok(command) => self.execute_command(command),
                        Err(e) => Response::error(&e),
                    }
                }
                Err(_) => Response::error(&PatientDbError::MalformedCommand(
                    "Invalid UTF-8 in command".to_string(),
                )),
            };

            if let Err(e) = self.send_response(&response).await {
                if let PatientDbError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command against the service, never letting a fault escape
    ///
    /// A panic inside the service is caught and reported to this client only.
    fn execute_command(&self, command: Command) -> Response {
        let service = &self.service;
        match panic::catch_unwind(AssertUnwindSafe(|| service.execute(command))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                if !e.is_client_facing() {
                    tracing::warn!("Command from {} failed: {}", self.peer_addr, e);
                }
                Response::error(&e)
            }
            Err(_) => {
                tracing::error!("Panic while executing command from {}", self.peer_addr);
                Response::error(&PatientDbError::Internal("command panicked".to_string()))
            }
        }
    }

    /// Wait for the next `\n`-terminated line (newline stripped)
    ///
    /// At end-of-stream a final unterminated line is still returned.
    ///
    /// The idle timeout bounds the whole line, not each read, so a client
    /// trickling bytes still times out.
    async fn read_line(&mut self) -> Result<Frame> {
        let deadline = self.options.idle_timeout.map(|limit| Instant::now() + limit);

        loop {
            if let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
                let pos = self.scanned + offset;
                self.scanned = 0;
                if pos > self.options.max_line_bytes {
                    return Ok(Frame::TooLong);
                }
                let mut line = self.buffer.split_to(pos + 1);
                line.truncate(pos);
                return Ok(Frame::Line(line.to_vec()));
            }
            self.scanned = self.buffer.len();

            if self.buffer.len() > self.options.max_line_bytes {
                return Ok(Frame::TooLong);
            }

            if self.fill_buffer(deadline).await? == 0 {
                self.scanned = 0;
                if self.buffer.is_empty() {
                    return Ok(Frame::Eof);
                }
                return Ok(Frame::Line(self.buffer.split().to_vec()));
            }
        }
    }

    /// Read more bytes from the socket, giving up at `deadline`
    async fn fill_buffer(&mut self, deadline: Option<Instant>) -> Result<usize> {
        let read = self.reader.read_buf(&mut self.buffer);
        let n = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, read)
                .await
                .map_err(|_| std::io::Error::new(ErrorKind::TimedOut, "idle timeout"))??,
            None => read.await?,
        };
        Ok(n)
    }

    /// Send one reply line
    async fn send_response(&mut self, response: &Response) -> Result<()> {
        let mut line = encode_response(response);
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}
