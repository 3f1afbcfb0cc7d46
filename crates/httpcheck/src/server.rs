//! Transient loopback server.
//!
//! A `TransientServer` is idle until [`TransientServer::start`] binds a fresh
//! listener on `127.0.0.1:0`, and goes back to idle on
//! [`TransientServer::stop`]. Nothing is reused between cycles, so the next
//! start always gets a new port.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::CheckError;

/// Serves one router on an ephemeral port for the duration of a check.
#[derive(Debug)]
pub struct TransientServer {
    router: Router,
    grace: Duration,
    state: State,
}

#[derive(Debug)]
enum State {
    Idle,
    Running(Running),
}

#[derive(Debug)]
struct Running {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TransientServer {
    /// Create an idle server for `router`.
    ///
    /// `grace` bounds how long [`stop`](Self::stop) waits for in-flight
    /// connections before aborting the serve task.
    #[must_use]
    pub const fn new(router: Router, grace: Duration) -> Self {
        Self {
            router,
            grace,
            state: State::Idle,
        }
    }

    /// Bind a new listener and start serving.
    ///
    /// Returns the bound address. Calling this on a running server returns
    /// the current address without rebinding.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Bind`] if no loopback port can be bound.
    pub async fn start(&mut self) -> Result<SocketAddr, CheckError> {
        if let State::Running(running) = &self.state {
            return Ok(running.addr);
        }

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .map_err(CheckError::Bind)?;
        let addr = listener.local_addr().map_err(CheckError::Bind)?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let router = self.router.clone();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        tracing::debug!(%addr, "test server started");
        self.state = State::Running(Running {
            addr,
            shutdown,
            handle,
        });
        Ok(addr)
    }

    /// The bound address, only while running.
    #[must_use]
    pub const fn address(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Running(running) => Some(running.addr),
            State::Idle => None,
        }
    }

    /// Whether the server is currently serving.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, State::Running(_))
    }

    /// Close the listener and return to idle.
    ///
    /// Stopping an idle server is a no-op.
    pub async fn stop(&mut self) {
        let State::Running(running) = std::mem::replace(&mut self.state, State::Idle) else {
            return;
        };
        let Running {
            addr,
            shutdown,
            mut handle,
        } = running;

        let _ = shutdown.send(());
        match tokio::time::timeout(self.grace, &mut handle).await {
            Ok(Ok(Ok(()))) => tracing::debug!(%addr, "test server stopped"),
            Ok(Ok(Err(e))) => tracing::warn!(%addr, error = %e, "test server exited with error"),
            Ok(Err(e)) => tracing::warn!(%addr, error = %e, "test server task failed"),
            Err(_) => {
                tracing::warn!(%addr, grace = ?self.grace, "test server did not drain, aborting");
                handle.abort();
            }
        }
    }
}

impl Drop for TransientServer {
    fn drop(&mut self) {
        if let State::Running(running) = &self.state {
            running.handle.abort();
        }
    }
}
