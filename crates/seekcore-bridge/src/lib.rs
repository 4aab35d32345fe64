use std::future::Future;
use std::time::Duration;

use seekcore_config::SettingsRecord;
use seekcore_entry::FileEntry;

mod tcp;
pub mod wire;

pub use tcp::TcpBridge;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),
    #[error("malformed backend reply: {0}")]
    Protocol(String),
}

/// `write_settings` reports a backend-side rejection as a non-empty string
/// inside `Ok`.
pub trait Bridge: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<FileEntry>, BridgeError>> + Send;

    fn open_file(&self, path: &str) -> impl Future<Output = Result<(), BridgeError>> + Send;

    fn read_settings(&self) -> impl Future<Output = Result<SettingsRecord, BridgeError>> + Send;

    fn write_settings(
        &self,
        record: &SettingsRecord,
    ) -> impl Future<Output = Result<String, BridgeError>> + Send;
}
