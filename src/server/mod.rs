//! TCP transport
//!
//! This module handles:
//! - Accepting client connections, one task per connection
//! - Reading length-prefixed request frames
//! - Answering every request with exactly one response frame

mod connection;
mod handler;

pub use handler::RequestHandler;

use connection::ClientConnection;

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Accept connections until the listener fails
pub async fn serve(listener: TcpListener, handler: Arc<RequestHandler>) -> Result<()> {
    info!("[SERVER] Listening on {}", listener.local_addr()?);

    loop {
        let (stream, addr) = listener.accept().await?;
        info!("[SERVER] Connection from {}", addr);

        let handler = handler.clone();
        tokio::spawn(async move {
            let mut connection = ClientConnection::new(stream, addr);
            if let Err(e) = handle_connection(&mut connection, &handler).await {
                warn!("[SERVER] Closing {}: {}", addr, e);
            }
        });
    }
}

async fn handle_connection(
    connection: &mut ClientConnection,
    handler: &RequestHandler,
) -> Result<()> {
    while let Some(request) = connection.recv().await? {
        let response = handler.handle(&request).await;
        if let Err(e) = connection.send(&response).await {
            error!(
                "[SERVER] Failed to answer request {} from {}: {}",
                request.request_id(),
                connection.addr(),
                e
            );
            return Err(e);
        }
    }

    debug!("[SERVER] Client disconnected: {}", connection.addr());
    Ok(())
}
