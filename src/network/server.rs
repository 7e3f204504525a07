//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use parking_lot::Mutex;

use crate::config::Config;
use crate::device::Device;
use crate::error::{Result, ScullError};
use crate::protocol::{write_response, Response};
use crate::sync::Interrupt;

use super::{Connection, Session};

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A connection being served, as seen by shutdown
struct LiveSession {
    interrupt: Interrupt,
    stream: TcpStream,
}

/// TCP server for a scull device
///
/// ## Concurrency:
/// - Acceptor (`run`) hands sockets to `worker_threads` workers over a
///   crossbeam channel
/// - `live`: interrupt + socket of every served connection, so shutdown
///   can cancel lock waits and unblock socket reads
pub struct Server {
    config: Config,
    device: Arc<Device>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,

    /// Connections accepted and not yet finished (queued or served)
    active: Arc<AtomicUsize>,
    live: Arc<Mutex<HashMap<u64, LiveSession>>>,
    next_conn_id: AtomicU64,
}

impl Server {
    /// Bind the listen address
    pub fn bind(config: Config, device: Arc<Device>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            ScullError::Network(format!("cannot bind {}: {}", config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            device,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            live: Arc::new(Mutex::new(HashMap::new())),
            next_conn_id: AtomicU64::new(1),
        })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until [`Server::shutdown`] is called (blocking)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        let (tx, rx) = channel::unbounded::<(u64, TcpStream)>();
        let mut workers = Vec::with_capacity(self.config.worker_threads);
        for id in 0..self.config.worker_threads {
            workers.push(self.spawn_worker(id, rx.clone())?);
        }
        drop(rx);

        let mut result = Ok(());
        while !self.shutdown.load(Ordering::SeqCst) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping {}: cannot switch to blocking mode: {}", addr, e);
                        continue;
                    }

                    if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
                        tracing::warn!("Rejecting {}: connection limit reached", addr);
                        reject(stream);
                        continue;
                    }

                    self.active.fetch_add(1, Ordering::SeqCst);
                    let conn_id = self.next_conn_id.fetch_add(1, Ordering::SeqCst);
                    tracing::debug!(conn_id, "Accepted connection from {}", addr);

                    if tx.send((conn_id, stream)).is_err() {
                        self.active.fetch_sub(1, Ordering::SeqCst);
                        result = Err(ScullError::Network("worker pool is gone".to_string()));
                        break;
                    }
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        drop(tx);
        self.interrupt_live();
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        tracing::info!("Server stopped accepting");
        result
    }

    /// Signal the server to shutdown gracefully
    ///
    /// Stops the accept loop, cancels blocked device calls and closes the
    /// sockets of live connections.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.interrupt_live();
    }

    /// Number of connections accepted and not yet closed
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    fn interrupt_live(&self) {
        let live = self.live.lock();
        for session in live.values() {
            session.interrupt.raise();
            let _ = session.stream.shutdown(Shutdown::Both);
        }
    }

    fn spawn_worker(
        &self,
        id: usize,
        rx: Receiver<(u64, TcpStream)>,
    ) -> Result<thread::JoinHandle<()>> {
        let device = Arc::clone(&self.device);
        let active = Arc::clone(&self.active);
        let live = Arc::clone(&self.live);
        let shutdown = Arc::clone(&self.shutdown);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("scull-worker-{}", id))
            .spawn(move || {
                for (conn_id, stream) in rx.iter() {
                    let interrupt = Interrupt::new();
                    if let Ok(clone) = stream.try_clone() {
                        live.lock().insert(
                            conn_id,
                            LiveSession {
                                interrupt: interrupt.clone(),
                                stream: clone,
                            },
                        );
                    }

                    // registered before this check, so shutdown either sees us or we see it
                    if shutdown.load(Ordering::SeqCst) {
                        let _ = stream.shutdown(Shutdown::Both);
                    } else {
                        let session = Session::new(Arc::clone(&device), interrupt);
                        if let Err(e) = serve(stream, session, read_ms, write_ms) {
                            tracing::debug!(conn_id, "Connection ended with error: {}", e);
                        }
                    }

                    live.lock().remove(&conn_id);
                    active.fetch_sub(1, Ordering::SeqCst);
                }
                tracing::trace!(worker = id, "Worker exiting");
            })?;

        Ok(handle)
    }
}

fn serve(stream: TcpStream, session: Session, read_ms: u64, write_ms: u64) -> Result<()> {
    let mut connection = Connection::new(stream, session)?;
    connection.set_timeouts(read_ms, write_ms)?;
    connection.handle()
}

fn reject(mut stream: TcpStream) {
    let response = Response::error("too many connections");
    let _ = write_response(&mut stream, &response);
    let _ = stream.shutdown(Shutdown::Both);
}
