//! TCP Server
//!
//! Accepts connections and serves each one on its own thread.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;

use super::Connection;
use crate::config::Config;
use crate::error::{ConfTreeError, Result};
use crate::store::ConfigStore;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Sockets of connections currently being served, by connection id
type ActiveConnections = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// TCP server for the configuration protocol
pub struct Server {
    config: Config,
    store: ConfigStore,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind to `config.listen_addr`
    pub fn new(config: Config, store: ConfigStore) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            ConfTreeError::Connection(format!("cannot listen on {}: {}", config.listen_addr, e))
        })?;

        // Non-blocking accept so the loop can notice shutdown
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            store,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start the server (blocking until shutdown)
    ///
    /// Every accepted client gets its own handler thread for as long as it
    /// stays connected, so idle clients never hold up others.
    pub fn run(&self) -> Result<()> {
        let active: ActiveConnections = Arc::new(Mutex::new(HashMap::new()));
        let mut handlers: HashMap<u64, JoinHandle<()>> = HashMap::new();
        let (finished_tx, finished_rx) = channel::unbounded::<u64>();

        tracing::info!(
            "Serving on {} (up to {} connections)",
            self.local_addr()?,
            self.config.max_connections
        );

        let mut next_id = 0u64;
        let result = loop {
            for id in finished_rx.try_iter() {
                if let Some(handler) = handlers.remove(&id) {
                    if handler.join().is_err() {
                        tracing::error!("Handler for connection {} panicked", id);
                    }
                }
            }

            if self.shutdown.load(Ordering::Relaxed) {
                break Ok(());
            }

            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if handlers.len() >= self.config.max_connections {
                        tracing::warn!(
                            "Refusing connection from {}: {} clients already connected",
                            addr,
                            handlers.len()
                        );
                        continue;
                    }

                    let id = next_id;
                    next_id += 1;
                    match self.spawn_handler(id, stream, &active, finished_tx.clone()) {
                        Ok(handler) => {
                            tracing::debug!("Accepted connection {} from {}", id, addr);
                            handlers.insert(id, handler);
                        }
                        Err(e) => tracing::warn!("Dropping connection from {}: {}", addr, e),
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL_INTERVAL),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!("Accept failed: {}", e);
                    break Err(ConfTreeError::Io(e));
                }
            }
        };

        // Unblock handlers stuck reading from idle clients
        for stream in active.lock().values() {
            let _ = stream.shutdown(Shutdown::Both);
        }

        for (id, handler) in handlers {
            if handler.join().is_err() {
                tracing::error!("Handler for connection {} panicked", id);
            }
        }

        tracing::info!("Server stopped");
        result
    }

    /// Serve one client on its own thread
    ///
    /// The socket stays registered in `active` until the handler returns;
    /// the handler then reports its id on `finished`.
    fn spawn_handler(
        &self,
        id: u64,
        stream: TcpStream,
        active: &ActiveConnections,
        finished: Sender<u64>,
    ) -> Result<JoinHandle<()>> {
        stream.set_nonblocking(false)?;
        active.lock().insert(id, stream.try_clone()?);

        let store = self.store.clone();
        let write_timeout_ms = self.config.write_timeout_ms;
        let registry = Arc::clone(active);

        let spawned = thread::Builder::new()
            .name(format!("conftree-conn-{}", id))
            .spawn(move || {
                let served = Connection::new(stream, store).and_then(|mut connection| {
                    // No read timeout: clients may sit idle between edits
                    connection.set_timeouts(0, write_timeout_ms)?;
                    connection.handle()
                });

                if let Err(e) = served {
                    tracing::warn!("Connection {} ended with error: {}", id, e);
                }
                registry.lock().remove(&id);
                let _ = finished.send(id);
            });

        spawned.map_err(|e| {
            active.lock().remove(&id);
            ConfTreeError::Io(e)
        })
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Run on a background thread
    pub fn spawn(self) -> Result<ServerHandle> {
        let addr = self.local_addr()?;
        let shutdown = Arc::clone(&self.shutdown);

        let thread = thread::Builder::new()
            .name("conftree-acceptor".to_string())
            .spawn(move || self.run())?;

        Ok(ServerHandle {
            addr,
            shutdown,
            thread: Some(thread),
        })
    }
}

/// A server running on a background thread
///
/// Dropping the handle stops the server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<()>>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, close open connections and wait for the server
    pub fn stop(mut self) -> Result<()> {
        self.stop_inner()
    }

    fn stop_inner(&mut self) -> Result<()> {
        self.shutdown.store(true, Ordering::Relaxed);
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .unwrap_or_else(|_| {
                    Err(ConfTreeError::Io(std::io::Error::new(
                        ErrorKind::Other,
                        "server thread panicked",
                    )))
                }),
            None => Ok(()),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop_inner();
    }
}
