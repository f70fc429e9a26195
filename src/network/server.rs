//! TCP Server
//!
//! Accepts connections and spawns one task per connection.
//!
//! ## Lifecycle
//! ```text
//! STOPPED → LISTENING → STOPPED
//! ```
//! `run`/`serve` enter LISTENING; `shutdown` closes the listener and the
//! accept loop returns `Ok(())`. Connections already accepted are not
//! severed: each finishes its current command and closes on its next read.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use super::connection::{Connection, ConnectionOptions};
use crate::config::Config;
use crate::error::Result;
use crate::service::PatientService;

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// TCP server for patientdb
///
/// A server is single-use: once shut down it stays stopped.
pub struct Server {
    config: Config,
    service: Arc<PatientService>,
    shutdown: Arc<watch::Sender<bool>>,
}

/// Cloneable handle that stops a running [`Server`]
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

impl Server {
    /// Create a new server with the given config and service
    pub fn new(config: Config, service: Arc<PatientService>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            config,
            service,
            shutdown: Arc::new(shutdown),
        }
    }

    /// Bind the configured listen address
    pub async fn bind(&self) -> Result<TcpListener> {
        Ok(TcpListener::bind(&self.config.listen_addr).await?)
    }

    /// Bind and serve until shutdown
    pub async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve an already-bound listener until shutdown
    ///
    /// The accept loop only accepts and spawns; it never waits on a client.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        let options = ConnectionOptions::from(&self.config);
        let mut shutdown = self.shutdown.subscribe();

        tracing::info!("Listening on {}", local_addr);

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => self.spawn_connection(stream, options),
                    Err(e) => {
                        tracing::warn!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                _ = shutdown.changed() => {}
            }
        }

        drop(listener);
        tracing::info!("Stopped listening on {}", local_addr);
        Ok(())
    }

    /// Hand a connection to its own task
    fn spawn_connection(&self, stream: TcpStream, options: ConnectionOptions) {
        let service = Arc::clone(&self.service);
        let shutdown = self.shutdown.subscribe();

        tokio::spawn(async move {
            let mut connection = match Connection::new(stream, service, options, shutdown) {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!("Failed to set up connection: {}", e);
                    return;
                }
            };

            if let Err(e) = connection.handle().await {
                tracing::warn!("Connection {} closed: {}", connection.peer_addr(), e);
            }
        });
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Handle for stopping the server from another task
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    /// The shared domain service
    pub fn service(&self) -> &Arc<PatientService> {
        &self.service
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
