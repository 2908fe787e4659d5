//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::error::{Result, VstorageError};
use crate::service::Dispatcher;

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for the query service
///
/// ## Threads
/// - one acceptor (the thread calling `run`), polling a non-blocking listener
/// - `worker_threads` workers, each serving one connection at a time
/// - accepted connections wait in a bounded queue of `max_connections`
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
}

/// Cloneable handle that stops a running server
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

impl Server {
    /// Create a new server with the given config and dispatcher
    pub fn new(config: Config, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the listen address without serving yet
    ///
    /// Returns the bound address, which resolves port 0 to the real port.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            VstorageError::Network(format!("Failed to bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address the server is bound to, once `bind` or `run` was called
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = self
            .listener
            .take()
            .ok_or_else(|| VstorageError::Network("Listener not bound".to_string()))?;

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections.max(1));
        let workers = (0..self.config.worker_threads.max(1))
            .map(|id| self.spawn_worker(id, receiver.clone()))
            .collect::<Result<Vec<_>>>()?;
        drop(receiver);

        tracing::info!(
            "Listening on {} with {} workers",
            listener.local_addr()?,
            workers.len()
        );

        while !self.shutdown.load(Ordering::Acquire) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    match sender.try_send(stream) {
                        Ok(()) => tracing::trace!("Queued connection from {}", addr),
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!("Connection queue full, dropping {}", addr);
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            return Err(VstorageError::Network(
                                "All connection workers exited".to_string(),
                            ));
                        }
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    // Back off: failures such as EMFILE persist across retries
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutting down, waiting for workers");
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::warn!("Connection worker panicked");
            }
        }
        Ok(())
    }

    fn spawn_worker(&self, id: usize, receiver: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let config = self.config.clone();

        thread::Builder::new()
            .name(format!("vstorage-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    if let Err(e) = serve(stream, &dispatcher, &config) {
                        tracing::warn!("Connection ended with error: {}", e);
                    }
                }
            })
            .map_err(VstorageError::Io)
    }
}

fn serve(stream: TcpStream, dispatcher: &Arc<Dispatcher>, config: &Config) -> Result<()> {
    let mut connection = Connection::new(stream, Arc::clone(dispatcher), config.max_frame_size)?;
    connection.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
    connection.handle()
}
