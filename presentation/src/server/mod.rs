//! HTTP transport for the tool gateway
//!
//! Accepts `{name, args}` envelopes on `POST /mcp`, runs each through the
//! [`DispatchToolCallUseCase`] on its own task, and answers with a
//! `{ok, error?, error_kind?, data?}` envelope. Tool failures (including
//! unknown names) are reported inside a 200 response; only an unparseable
//! envelope is rejected at the HTTP level.
//!
//! # Usage
//!
//! ```ignore
//! let handle = GatewayServer::new(dispatcher).start("127.0.0.1:0".parse()?).await?;
//! println!("listening on {}", handle.local_addr());
//! handle.shutdown().await?;
//! ```

pub mod envelope;
pub mod routes;

pub use envelope::{ToolRequest, ToolResponse};
pub use routes::{CALL_TIMEOUT_HEADER, GatewayState, router};

use axum::Router;
use skybit_application::use_cases::dispatch_call::DispatchToolCallUseCase;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// The gateway's HTTP server, not yet bound
pub struct GatewayServer {
    router: Router,
}

impl GatewayServer {
    pub fn new(dispatcher: DispatchToolCallUseCase) -> Self {
        Self {
            router: router(GatewayState::new(dispatcher)),
        }
    }

    /// Bind `addr` (port 0 picks a free port) and serve in the background.
    pub async fn start(self, addr: SocketAddr) -> io::Result<ServerHandle> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        info!("skybit tool gateway listening on {}", local_addr);
        let task = tokio::spawn(async move {
            axum::serve(listener, self.router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Ok(ServerHandle {
            local_addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }
}

/// A running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    /// Address actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight calls to finish.
    pub async fn shutdown(mut self) -> io::Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.join().await
    }

    async fn join(self) -> io::Result<()> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::other(e)),
        }
    }
}
