use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::SubtreeConflict;

/// Which path-length ceiling was exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    File,
    Folder,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::File => f.write_str("file"),
            LimitKind::Folder => f.write_str("folder"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PasteError {
    #[error("Invalid destination {}: {reason}", .path.display())]
    InvalidDestination { path: PathBuf, reason: String },

    #[error("No files or folders were selected to paste")]
    EmptyInputSet,

    #[error("Invalid source item {}: {reason}", .path.display())]
    InvalidSource { path: PathBuf, reason: String },

    #[error("{}", format_subtree_conflicts(.0))]
    SourceSubtreeConflict(Vec<SubtreeConflict>),

    #[error("Target {kind} path is too long ({length} > {limit}): {}", .path.display())]
    PathTooLong {
        path: PathBuf,
        length: usize,
        limit: usize,
        kind: LimitKind,
    },

    #[error("{action} failed for {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation cancelled by user")]
    Cancelled,
}

impl PasteError {
    pub fn io(action: &'static str, path: &Path, source: std::io::Error) -> Self {
        PasteError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error ends the whole session rather than one item
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PasteError::InvalidDestination { .. }
                | PasteError::EmptyInputSet
                | PasteError::InvalidSource { .. }
                | PasteError::SourceSubtreeConflict(_)
                | PasteError::Cancelled
        )
    }
}

fn format_subtree_conflicts(conflicts: &[SubtreeConflict]) -> String {
    let mut message = format!(
        "Cannot paste {} item(s) into their own folder tree:",
        conflicts.len()
    );
    for conflict in conflicts {
        message.push_str(&format!(
            "\n  - {} -> {}",
            conflict.source.display(),
            conflict.target.display()
        ));
    }
    message
}

pub type PasteResult<T> = std::result::Result<T, PasteError>;
