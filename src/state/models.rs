use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::ConflictChoice;
use crate::error::PasteError;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Nothing checked yet
    Idle,

    /// Pre-flight subtree check over every item
    GuardCheck,

    /// Items are being copied
    Copying,

    /// Every item processed
    Done,

    /// Pre-flight check failed, nothing copied
    Aborted,

    /// User chose Cancel in a conflict prompt
    Cancelled,
}

/// A path that was skipped or failed, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Running counters for one paste session
#[derive(Debug, Clone, Default, Serialize)]
pub struct CopyProgress {
    pub bytes_copied: u64,
    pub files_copied: u64,
    pub files_overwritten: u64,
    pub files_renamed: u64,
    pub files_skipped: u64,
    pub directories_created: u64,
    pub too_long: Vec<PathIssue>,
    pub failures: Vec<PathIssue>,
}

impl CopyProgress {
    pub fn record_too_long(&mut self, err: &PasteError, path: &Path) {
        self.too_long.push(PathIssue {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }

    pub fn record_failure(&mut self, err: &PasteError, path: &Path) {
        self.failures.push(PathIssue {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }

    /// Paths skipped for length, in the order they were met
    pub fn too_long_paths(&self) -> Vec<PathBuf> {
        self.too_long.iter().map(|issue| issue.path.clone()).collect()
    }

    /// Whether any path was left behind for length or failure
    pub fn has_issues(&self) -> bool {
        !self.too_long.is_empty() || !self.failures.is_empty()
    }
}

/// Mutable state shared by every step of one paste run.
///
/// The sticky choice is written at most once and never cleared; Cancel is
/// never stored in it.
#[derive(Debug, Clone)]
pub struct SessionState {
    sticky: Option<ConflictChoice>,
    aborted: bool,
    status: SessionStatus,
    pub progress: CopyProgress,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            sticky: None,
            aborted: false,
            status: SessionStatus::Idle,
            progress: CopyProgress::default(),
        }
    }

    /// Start with a choice already applied to every conflict
    pub fn with_sticky(choice: ConflictChoice) -> Self {
        let mut state = Self::new();
        state.remember(choice);
        state
    }

    pub fn sticky(&self) -> Option<ConflictChoice> {
        self.sticky
    }

    /// Store an "apply to all" choice; ignored for Cancel or once one is set
    pub fn remember(&mut self, choice: ConflictChoice) -> bool {
        if choice == ConflictChoice::Cancel || self.sticky.is_some() {
            return false;
        }

        debug!("Applying {:?} to all remaining conflicts", choice);
        self.sticky = Some(choice);
        true
    }

    pub fn mark_aborted(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        debug!("Session status: {:?} -> {:?}", self.status, status);
        self.status = status;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sticky_choice_is_set_once() {
        let mut state = SessionState::new();
        assert_eq!(state.sticky(), None);

        assert!(state.remember(ConflictChoice::Rename));
        assert!(!state.remember(ConflictChoice::Overwrite));
        assert_eq!(state.sticky(), Some(ConflictChoice::Rename));
    }

    #[test]
    fn test_cancel_is_never_sticky() {
        let mut state = SessionState::new();
        assert!(!state.remember(ConflictChoice::Cancel));
        assert_eq!(state.sticky(), None);

        let state = SessionState::with_sticky(ConflictChoice::Cancel);
        assert_eq!(state.sticky(), None);
    }

    #[test]
    fn test_issues_cover_length_skips_and_failures() {
        let err = PasteError::EmptyInputSet;

        let mut progress = CopyProgress::default();
        progress.files_copied = 3;
        assert!(!progress.has_issues());

        progress.record_too_long(&err, Path::new("/dst/long"));
        assert!(progress.has_issues());

        let mut progress = CopyProgress::default();
        progress.record_failure(&err, Path::new("/dst/denied"));
        assert!(progress.has_issues());
    }

    #[test]
    fn test_progress_serializes_issues() {
        let mut progress = CopyProgress::default();
        progress.files_copied = 3;
        progress.record_failure(&PasteError::EmptyInputSet, Path::new("/tmp/x"));

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["files_copied"], 3);
        assert_eq!(json["failures"][0]["path"], "/tmp/x");
    }
}
