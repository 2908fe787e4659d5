//! Per-connection call loop
//!
//! Reads request frames, runs them through the dispatcher and writes one
//! reply frame per request, in order.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, VstorageError};
use crate::protocol::{read_request, write_reply, RemoteError, ReplyFrame, RequestFrame};
use crate::service::Dispatcher;

/// One accepted client, served on a worker thread
pub struct Connection {
    /// Buffered read half
    reader: BufReader<TcpStream>,

    /// Buffered write half, flushed after every reply
    writer: BufWriter<TcpStream>,

    /// Routes each call to its handler
    dispatcher: Arc<Dispatcher>,

    /// Largest request payload accepted
    max_frame_size: u32,

    /// Remote address, used in log lines
    peer_addr: String,
}

impl Connection {
    /// Wrap an accepted stream
    ///
    /// Call `set_timeouts` before `handle`.
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>, max_frame_size: u32) -> Result<Self> {
        let peer_addr = match stream.peer_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => "unknown".to_string(),
        };

        // Replies are small and latency-bound
        stream.set_nodelay(true)?;
        let reader = BufReader::new(stream.try_clone()?);

        Ok(Self {
            reader,
            writer: BufWriter::new(stream),
            dispatcher,
            max_frame_size,
            peer_addr,
        })
    }

    /// Apply read/write timeouts in milliseconds (0 leaves a side blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let to_timeout = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        self.reader.get_ref().set_read_timeout(to_timeout(read_ms))?;
        self.writer.get_ref().set_write_timeout(to_timeout(write_ms))?;
        Ok(())
    }

    /// Serve calls until the client goes away (blocking)
    ///
    /// A disconnect or idle timeout ends the loop with `Ok`; a broken frame or
    /// a failed write ends it with the error.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Serving {}", self.peer_addr);

        loop {
            let frame = match read_request(&mut self.reader, self.max_frame_size) {
                Ok(frame) => frame,
                Err(VstorageError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected ({:?})", self.peer_addr, e.kind());
                    return Ok(());
                }
                Err(VstorageError::Io(ref e)) if is_timeout(e.kind()) => {
                    tracing::debug!("Closing idle connection from {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Bad frame from {}: {}", self.peer_addr, e);
                    // The stream position is unknown now; reply once and close.
                    let _ = self.send_reply(ReplyFrame::error(&RemoteError::invalid_argument(
                        e.to_string(),
                    )));
                    return Err(e);
                }
            };

            tracing::trace!(
                "Received {} ({} bytes) from {}",
                frame.method,
                frame.payload.len(),
                self.peer_addr
            );

            let reply = self.execute(frame);

            if let Err(e) = self.send_reply(reply) {
                // The client went away before the reply could be sent
                if let VstorageError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before reply could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Reply to {} failed: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Dispatch one call and turn the outcome into a reply
    ///
    /// A response too large to frame becomes an `Internal` error reply.
    fn execute(&self, frame: RequestFrame) -> ReplyFrame {
        match self.dispatcher.dispatch(&frame.method, &frame.payload) {
            Ok(payload) if payload.len() > self.max_frame_size as usize => {
                tracing::warn!(
                    "{} response for {} is {} bytes (max {})",
                    frame.method,
                    self.peer_addr,
                    payload.len(),
                    self.max_frame_size
                );
                ReplyFrame::error(&RemoteError::internal(format!(
                    "response too large: {} bytes (max {})",
                    payload.len(),
                    self.max_frame_size
                )))
            }
            Ok(payload) => ReplyFrame::ok(payload),
            Err(e) => ReplyFrame::error(&e.into_remote()),
        }
    }

    /// Send a reply to the client
    fn send_reply(&mut self, reply: ReplyFrame) -> Result<()> {
        write_reply(&mut self.writer, &reply, self.max_frame_size)
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
    )
}

// Windows reports TimedOut where Unix reports WouldBlock
fn is_timeout(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}
