//! TCP client transport
//!
//! One connection, one call in flight at a time.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{Result, VstorageError};
use crate::protocol::{read_reply, write_request, RequestFrame, MAX_FRAME_SIZE};
use crate::service::Transport;

/// `Transport` over a framed TCP connection
pub struct TcpTransport {
    /// Reader and writer are locked together so replies pair with requests
    stream: Mutex<(BufReader<TcpStream>, BufWriter<TcpStream>)>,

    /// Largest reply payload accepted
    max_frame_size: u32,
}

impl TcpTransport {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| VstorageError::Network(format!("Failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            stream: Mutex::new((BufReader::new(read_stream), BufWriter::new(stream))),
            max_frame_size: MAX_FRAME_SIZE,
        })
    }

    /// Apply a read timeout to replies (milliseconds, 0 disables)
    pub fn set_read_timeout_ms(&self, ms: u64) -> Result<()> {
        let timeout = (ms > 0).then(|| Duration::from_millis(ms));
        self.stream.lock().0.get_ref().set_read_timeout(timeout)?;
        Ok(())
    }

    /// Largest request or reply payload this transport will move
    pub fn max_frame_size(mut self, size: u32) -> Self {
        self.max_frame_size = size;
        self
    }
}

impl Transport for TcpTransport {
    fn invoke(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
        let mut guard = self.stream.lock();
        let (reader, writer) = &mut *guard;

        write_request(
            writer,
            &RequestFrame::new(method, payload.to_vec()),
            self.max_frame_size,
        )?;
        let reply = read_reply(reader, self.max_frame_size)?;

        tracing::trace!("{} replied {}", method, reply.code);
        Ok(reply.into_result()?)
    }
}
