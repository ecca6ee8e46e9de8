//! One client connection

use anyhow::Result;
use dispatch_shared::{
    codec::{self, FrameDecoder},
    Envelope,
};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::warn;

/// A framed request/response stream over TCP
pub struct ClientConnection {
    stream: TcpStream,
    addr: SocketAddr,
    decoder: FrameDecoder,
    read_buf: Vec<u8>,
}

impl ClientConnection {
    pub fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            stream,
            addr,
            decoder: FrameDecoder::new(),
            read_buf: vec![0u8; 4096],
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Read the next request.
    ///
    /// Returns `Ok(None)` when the peer closed the connection and an error
    /// when the stream can no longer be framed.
    pub async fn recv(&mut self) -> Result<Option<Envelope>> {
        loop {
            if let Some(envelope) = self.decoder.decode_next()? {
                return Ok(Some(envelope));
            }

            let n = self.stream.read(&mut self.read_buf).await?;
            if n == 0 {
                if self.decoder.buffer_len() > 0 {
                    warn!(
                        "[SERVER] {} closed with {} undecoded byte(s)",
                        self.addr,
                        self.decoder.buffer_len()
                    );
                }
                return Ok(None);
            }
            self.decoder.extend(&self.read_buf[..n]);
        }
    }

    pub async fn send(&mut self, envelope: &Envelope) -> Result<()> {
        let encoded = codec::encode(envelope)?;
        self.stream.write_all(&encoded).await?;
        Ok(())
    }
}
