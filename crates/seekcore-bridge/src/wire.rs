
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SEARCH_FILE: &str = "search_file";
pub const OPEN_FILE: &str = "open_file";
pub const GET_SETTINGS: &str = "get_settings";
pub const UPDATE_SETTINGS: &str = "update_settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub call: u64,
    pub name: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "return")]
    pub id: u64,
    pub status: ReplyStatus,
    #[serde(default)]
    pub value: Value,
}

impl Reply {
    pub fn ok(id: u64, value: Value) -> Self {
        Self {
            id,
            status: ReplyStatus::Ok,
            value,
        }
    }

    pub fn error(id: u64, message: impl Into<String>) -> Self {
        Self {
            id,
            status: ReplyStatus::Error,
            value: Value::String(message.into()),
        }
    }
}
