//! TCP IPC server: accept loop and per-connection handler.

use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::dispatch::Dispatcher;
use crate::ipc::codec::{encode_json, read_frame, write_frame, MSG_ERROR, MSG_REQUEST, MSG_RESPONSE};
use crate::ipc::router;
use crate::types::{IpcConfig, RequestId};

/// IPC server wrapping the dispatcher.
#[derive(Debug)]
pub struct IpcServer {
    dispatcher: Arc<Dispatcher>,
    addr: SocketAddr,
    cancel: CancellationToken,
    ipc_config: IpcConfig,
}

impl IpcServer {
    pub fn new(dispatcher: Arc<Dispatcher>, addr: SocketAddr, ipc_config: IpcConfig) -> Self {
        Self {
            dispatcher,
            addr,
            cancel: CancellationToken::new(),
            ipc_config,
        }
    }

    /// Token that stops the server (and in-flight retries) when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the server until cancelled or a fatal error occurs.
    pub async fn serve(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_listener(listener).await
    }

    /// Run the server on an already-bound listener.
    pub async fn serve_listener(&self, listener: TcpListener) -> std::io::Result<()> {
        let conn_semaphore = Arc::new(Semaphore::new(self.ipc_config.max_connections));
        tracing::info!(
            "IPC server listening on {} (max_connections={}, tools={})",
            listener.local_addr()?,
            self.ipc_config.max_connections,
            self.dispatcher.catalog().len(),
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("IPC server shutting down");
                    break;
                }
                accept = listener.accept() => {
                    let (stream, peer) = accept?;

                    // Acquire connection permit (backpressure when at capacity).
                    let permit = match conn_semaphore.clone().try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            tracing::warn!(
                                "Connection from {} rejected: at max_connections ({})",
                                peer,
                                self.ipc_config.max_connections,
                            );
                            drop(stream);
                            continue;
                        }
                    };

                    tracing::debug!("IPC connection from {} (active={})",
                        peer,
                        self.ipc_config.max_connections - conn_semaphore.available_permits(),
                    );
                    let dispatcher = self.dispatcher.clone();
                    let cancel = self.cancel.clone();
                    let ipc_config = self.ipc_config.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, dispatcher, cancel, ipc_config, permit).await {
                            tracing::warn!("Connection from {} error: {}", peer, e);
                        }
                    });
                }
            }
        }
        Ok(())
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

fn error_body(id: &str, code: &str, message: String) -> Value {
    serde_json::json!({
        "id": id,
        "ok": false,
        "error": {
            "code": code,
            "message": message,
        }
    })
}

/// Handle a single TCP connection: read frames → route → write responses.
async fn handle_connection(
    stream: tokio::net::TcpStream,
    dispatcher: Arc<Dispatcher>,
    cancel: CancellationToken,
    ipc_config: IpcConfig,
    _permit: OwnedSemaphorePermit, // held for connection lifetime
) -> std::io::Result<()> {
    let (mut reader, mut writer) = stream.into_split();
    let read_timeout = Duration::from_secs(ipc_config.read_timeout_secs);
    let write_timeout = Duration::from_secs(ipc_config.write_timeout_secs);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame_result = tokio::time::timeout(read_timeout, read_frame(&mut reader, ipc_config.max_frame_bytes)) => {
                let frame = match frame_result {
                    Err(_elapsed) => {
                        tracing::debug!("Read timeout ({}s), dropping connection", ipc_config.read_timeout_secs);
                        break;
                    }
                    Ok(result) => match result? {
                        Some(f) => f,
                        None => break, // clean EOF
                    },
                };

                let (msg_type, payload_bytes) = frame;

                if msg_type != MSG_REQUEST {
                    let err = error_body(
                        "",
                        "INVALID_ARGUMENT",
                        format!("Unexpected message type: 0x{:02X}", msg_type),
                    );
                    timed_write(&mut writer, MSG_ERROR, &encode_json(&err)?, write_timeout).await?;
                    continue;
                }

                let request: Value = match serde_json::from_slice(&payload_bytes) {
                    Ok(v) => v,
                    Err(e) => {
                        let err = error_body("", "INVALID_ARGUMENT", format!("Invalid JSON: {}", e));
                        timed_write(&mut writer, MSG_ERROR, &encode_json(&err)?, write_timeout).await?;
                        continue;
                    }
                };

                let request_id = request.get("id")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| RequestId::new().to_string());
                let service = request.get("service")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                let method = request.get("method")
                    .and_then(|v| v.as_str())
                    .unwrap_or("");
                let body = request.get("body")
                    .cloned()
                    .unwrap_or(Value::Object(serde_json::Map::new()));

                let span = tracing::debug_span!("ipc_request", id = %request_id, service, method);
                let result = router::route_request(&dispatcher, service, method, body, &cancel)
                    .instrument(span)
                    .await;

                match result {
                    Ok(response_body) => {
                        let response = serde_json::json!({
                            "id": request_id,
                            "ok": true,
                            "body": response_body,
                        });
                        timed_write(&mut writer, MSG_RESPONSE, &encode_json(&response)?, write_timeout).await?;
                    }
                    Err(e) => {
                        tracing::debug!("IPC request {} failed: {}", request_id, e);
                        let response = error_body(&request_id, e.to_ipc_error_code(), e.to_string());
                        timed_write(&mut writer, MSG_ERROR, &encode_json(&response)?, write_timeout).await?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Write a frame with a timeout. Returns an error if the write takes too long
/// (prevents slow consumers from holding connections indefinitely).
async fn timed_write<W: tokio::io::AsyncWriteExt + Unpin>(
    writer: &mut W,
    msg_type: u8,
    payload: &[u8],
    timeout: Duration,
) -> std::io::Result<()> {
    tokio::time::timeout(timeout, write_frame(writer, msg_type, payload))
        .await
        .map_err(|_| {
            tracing::warn!("Write timeout ({}s), dropping connection", timeout.as_secs());
            std::io::Error::new(std::io::ErrorKind::TimedOut, "write timeout")
        })?
}
