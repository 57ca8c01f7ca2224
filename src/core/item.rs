use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::{PasteError, PasteResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Directory,
}

/// One entry of the clipboard's file-drop list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardItem {
    path: PathBuf,
    kind: ItemKind,
}

impl ClipboardItem {
    pub fn new(path: impl Into<PathBuf>, kind: ItemKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Tag an existing path as file or directory
    pub async fn read(path: impl Into<PathBuf>) -> PasteResult<Self> {
        let path = path.into();

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| PasteError::InvalidSource {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let kind = if metadata.is_dir() {
            ItemKind::Directory
        } else if metadata.is_file() {
            ItemKind::File
        } else {
            return Err(PasteError::InvalidSource {
                path,
                reason: "not a regular file or directory".to_string(),
            });
        };

        Ok(Self { path, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == ItemKind::Directory
    }
}
