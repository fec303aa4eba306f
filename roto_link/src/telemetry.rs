//! Telemetry TCP endpoint.
//!
//! One persistent duplex connection per client, length-prefixed binary
//! frames (see [`roto_common::wire`]). A zero-length frame is a keepalive
//! and never touches the store; any non-empty command frame is received
//! into an exactly-sized scoped buffer, its content discarded, and answered
//! with the current full position snapshot.
//!
//! Per-request failures (allocation, send) are reported and never take the
//! process down; whether a broken connection is re-established is the
//! client transport's concern.

use std::sync::Arc;

use roto_common::state::StateStore;
use roto_common::wire::{self, HEADER_LEN};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

/// Error types for the telemetry channel.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Client declared a frame larger than the configured cap.
    #[error("command frame of {len} bytes exceeds cap of {max}")]
    FrameTooLarge {
        /// Declared payload length.
        len: u32,
        /// Configured cap.
        max: u32,
    },

    /// Receive buffer allocation failed.
    #[error("receive buffer allocation of {len} bytes failed")]
    ResourceExhaustion {
        /// Requested buffer size.
        len: usize,
    },

    /// Frame send/receive failure.
    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),
}

/// A received command, as far as this version interprets it.
///
/// Version 0 of the protocol receives and discards command payloads; this
/// enum is the extension point where a future version byte dispatches real
/// target-update commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Uninterpreted payload of the given length.
    Opaque {
        /// Payload length [bytes].
        len: usize,
    },
}

/// Interpret a command payload.
pub fn decode_command(payload: &[u8]) -> Command {
    Command::Opaque {
        len: payload.len(),
    }
}

/// Accept telemetry clients forever, one task per connection.
pub async fn serve(listener: TcpListener, store: Arc<StateStore>, max_frame_len: u32) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                // Handshake phase: the connection itself carries no payload.
                debug!(%peer, "telemetry client connected");
                let store = store.clone();
                tokio::spawn(async move {
                    match handle_client(stream, store, max_frame_len).await {
                        Ok(()) => debug!(%peer, "telemetry client disconnected"),
                        Err(err) => warn!(%peer, %err, "telemetry connection ended"),
                    }
                });
            }
            Err(err) => {
                warn!(%err, "telemetry accept failed");
            }
        }
    }
}

/// Serve one client until it disconnects or a request fails.
async fn handle_client(
    mut stream: TcpStream,
    store: Arc<StateStore>,
    max_frame_len: u32,
) -> Result<(), LinkError> {
    loop {
        let mut header = [0u8; HEADER_LEN];
        match stream.read_exact(&mut header).await {
            Ok(_) => {}
            // Clean close between frames.
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e.into()),
        }
        let len = wire::decode_header(header);

        if len == 0 {
            // Keepalive: echo an empty frame, no store access.
            stream.write_all(&wire::encode_header(0)).await?;
            continue;
        }

        if len > max_frame_len {
            return Err(LinkError::FrameTooLarge {
                len,
                max: max_frame_len,
            });
        }

        // Scoped receive buffer, released on every exit path of this block.
        {
            let mut payload = recv_buffer(len as usize)?;
            stream.read_exact(&mut payload).await?;
            let command = decode_command(&payload);
            debug!(?command, "command frame received, content discarded");
        }

        let frame = wire::encode_snapshot_frame(&store.snapshot());
        stream.write_all(&frame).await?;
    }
}

/// Allocate the receive buffer sized exactly to the declared frame length.
fn recv_buffer(len: usize) -> Result<Vec<u8>, LinkError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| LinkError::ResourceExhaustion { len })?;
    buf.resize(len, 0);
    Ok(buf)
}
