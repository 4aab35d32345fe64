use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Directory,
    Image,
    Document,
    Generic,
}

impl FileKind {
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "dir" => Self::Directory,
            "img" => Self::Image,
            "doc" => Self::Document,
            _ => Self::Generic,
        }
    }

    pub fn wire_tag(self) -> &'static str {
        match self {
            Self::Directory => "dir",
            Self::Image => "img",
            Self::Document => "doc",
            Self::Generic => "any",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub kind: FileKind,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEntry {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

impl From<WireEntry> for FileEntry {
    fn from(value: WireEntry) -> Self {
        Self {
            kind: value
                .file_type
                .as_deref()
                .map_or(FileKind::Generic, FileKind::from_wire),
            name: value.name,
            path: value.path,
        }
    }
}

impl From<&FileEntry> for WireEntry {
    fn from(value: &FileEntry) -> Self {
        Self {
            name: value.name.clone(),
            path: value.path.clone(),
            file_type: Some(value.kind.wire_tag().to_string()),
        }
    }
}

pub fn decode_entries(value: Value) -> Option<Vec<FileEntry>> {
    let Value::Array(items) = value else {
        return None;
    };

    let total = items.len();
    let entries: Vec<FileEntry> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<WireEntry>(item) {
            Ok(wire) => Some(FileEntry::from(wire)),
            Err(error) => {
                tracing::debug!(index, %error, "skipping malformed search entry");
                None
            }
        })
        .collect();

    if entries.len() < total {
        tracing::warn!(
            skipped = total - entries.len(),
            total,
            "search reply contained malformed entries"
        );
    }

    Some(entries)
}
