//! HTTP control surface for a running monitor.
//!
//! - `GET /status` current status snapshot
//! - `POST /start`, `POST /stop` toggle polling
//! - `POST /check` run one cycle now

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::monitor::MonitorHandle;

/// Shared state for the control server.
#[derive(Clone)]
pub struct AppState {
    pub monitor: MonitorHandle,
}

impl AppState {
    pub fn new(monitor: MonitorHandle) -> Self {
        Self { monitor }
    }
}

/// Bind the listener up front so address errors surface before the monitor runs.
pub async fn bind(host: &str, port: u16) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Control server listening at http://{}", listener.local_addr()?);
    Ok(listener)
}

/// Serve the control router on an already bound listener.
pub async fn serve(listener: TcpListener, monitor: MonitorHandle) -> anyhow::Result<()> {
    let app = create_router(AppState::new(monitor));
    axum::serve(listener, app).await?;
    Ok(())
}
