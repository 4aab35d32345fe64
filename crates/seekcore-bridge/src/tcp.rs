use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use seekcore_config::{PanelConfig, SettingsRecord};
use seekcore_entry::{decode_entries, FileEntry};

use crate::wire::{
    Call, Reply, ReplyStatus, GET_SETTINGS, OPEN_FILE, SEARCH_FILE, UPDATE_SETTINGS,
};
use crate::{Bridge, BridgeError};

// `None` once the reader task has stopped; no new call may wait after that.
type PendingCalls = Arc<Mutex<Option<HashMap<u64, oneshot::Sender<Reply>>>>>;

pub struct TcpBridge {
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    pending: PendingCalls,
    next_id: AtomicU64,
    request_timeout: Duration,
    reader: JoinHandle<()>,
}

impl TcpBridge {
    pub async fn connect(addr: &str, config: &PanelConfig) -> Result<Self, BridgeError> {
        let stream = match tokio::time::timeout(config.connect_timeout(), TcpStream::connect(addr))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(error)) => {
                return Err(BridgeError::Unavailable(format!(
                    "cannot connect to {addr}: {error}"
                )))
            }
            Err(_) => {
                return Err(BridgeError::Unavailable(format!(
                    "connecting to {addr} timed out after {:?}",
                    config.connect_timeout()
                )))
            }
        };

        if let Err(error) = stream.set_nodelay(true) {
            tracing::debug!(%error, "could not disable nagle on bridge socket");
        }

        tracing::info!(%addr, "bridge connected");
        Ok(Self::from_stream(stream, config.request_timeout()))
    }

    pub fn from_stream(stream: TcpStream, request_timeout: Duration) -> Self {
        let (read_half, write_half) = stream.into_split();
        let pending: PendingCalls = Arc::new(Mutex::new(Some(HashMap::new())));
        let reader = tokio::spawn(read_replies(read_half, Arc::clone(&pending)));

        Self {
            writer: tokio::sync::Mutex::new(write_half),
            pending,
            next_id: AtomicU64::new(1),
            request_timeout,
            reader,
        }
    }

    async fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, BridgeError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = Call {
            call: id,
            name: name.to_string(),
            args,
        };
        let mut line = serde_json::to_string(&frame)
            .map_err(|error| BridgeError::Protocol(error.to_string()))?;
        line.push('\n');

        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let mut pending = lock(&self.pending);
            let Some(calls) = pending.as_mut() else {
                return Err(BridgeError::Unavailable("connection closed".to_string()));
            };
            calls.insert(id, reply_tx);
        }

        let deadline = tokio::time::Instant::now() + self.request_timeout;
        let written = tokio::time::timeout_at(deadline, async {
            let mut writer = self.writer.lock().await;
            match writer.write_all(line.as_bytes()).await {
                Ok(()) => writer.flush().await,
                Err(error) => Err(error),
            }
        })
        .await;
        match written {
            Ok(Ok(())) => {}
            Ok(Err(error)) => {
                self.forget(id);
                return Err(BridgeError::Unavailable(error.to_string()));
            }
            Err(_) => {
                self.forget(id);
                return Err(BridgeError::Timeout(self.request_timeout));
            }
        }

        let reply = match tokio::time::timeout_at(deadline, reply_rx).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => {
                return Err(BridgeError::Unavailable(
                    "connection closed before reply".to_string(),
                ))
            }
            Err(_) => {
                self.forget(id);
                return Err(BridgeError::Timeout(self.request_timeout));
            }
        };

        match reply.status {
            ReplyStatus::Ok => Ok(reply.value),
            ReplyStatus::Error => Err(BridgeError::Unavailable(match reply.value {
                Value::String(message) => message,
                other => other.to_string(),
            })),
        }
    }

    fn forget(&self, id: u64) {
        if let Some(calls) = lock(&self.pending).as_mut() {
            calls.remove(&id);
        }
    }
}

impl Drop for TcpBridge {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl Bridge for TcpBridge {
    async fn search(&self, query: &str) -> Result<Vec<FileEntry>, BridgeError> {
        let value = self.call(SEARCH_FILE, vec![Value::from(query)]).await?;
        decode_entries(value)
            .ok_or_else(|| BridgeError::Protocol(format!("{SEARCH_FILE} did not return a list")))
    }

    async fn open_file(&self, path: &str) -> Result<(), BridgeError> {
        self.call(OPEN_FILE, vec![Value::from(path)]).await?;
        Ok(())
    }

    async fn read_settings(&self) -> Result<SettingsRecord, BridgeError> {
        let value = self.call(GET_SETTINGS, Vec::new()).await?;
        serde_json::from_value(value).map_err(|error| BridgeError::Protocol(error.to_string()))
    }

    async fn write_settings(&self, record: &SettingsRecord) -> Result<String, BridgeError> {
        let payload =
            serde_json::to_value(record).map_err(|error| BridgeError::Protocol(error.to_string()))?;
        match self.call(UPDATE_SETTINGS, vec![payload]).await? {
            Value::String(message) => Ok(message),
            Value::Null => Ok(String::new()),
            other => Err(BridgeError::Protocol(format!(
                "{UPDATE_SETTINGS} returned {other}"
            ))),
        }
    }
}

async fn read_replies(read_half: OwnedReadHalf, pending: PendingCalls) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::warn!("backend closed the bridge connection");
                break;
            }
            Err(error) => {
                tracing::warn!(%error, "bridge read failed");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Reply>(&line) {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(%error, "undecodable bridge reply");
                continue;
            }
        };

        let waiter = lock(&pending)
            .as_mut()
            .and_then(|calls| calls.remove(&reply.id));
        match waiter {
            Some(waiter) => {
                let _ = waiter.send(reply);
            }
            None => tracing::debug!(id = reply.id, "reply for a call nobody waits on"),
        }
    }

    // Dropping the senders wakes every waiter with a closed-channel error.
    lock(&pending).take();
}

fn lock(pending: &PendingCalls) -> MutexGuard<'_, Option<HashMap<u64, oneshot::Sender<Reply>>>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
