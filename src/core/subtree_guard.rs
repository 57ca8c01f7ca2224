use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::item::{ClipboardItem, ItemKind};
use super::path_resolver::{is_strict_descendant, paths_equal, resolve_target};
use crate::error::{PasteError, PasteResult};

/// An item that would be pasted onto itself or into its own subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtreeConflict {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: ItemKind,
}

fn is_unsafe(item: &ClipboardItem, target: &Path) -> bool {
    match item.kind() {
        ItemKind::File => paths_equal(target, item.path()),
        ItemKind::Directory => {
            paths_equal(target, item.path()) || is_strict_descendant(target, item.path())
        }
    }
}

/// Every item whose computed target is unsafe. Touches no filesystem state.
pub fn find_subtree_conflicts(items: &[ClipboardItem], destination: &Path) -> Vec<SubtreeConflict> {
    items
        .iter()
        .filter_map(|item| {
            let target = resolve_target(item.path(), destination);
            debug!("Guard: {} -> {}", item.path().display(), target.display());

            is_unsafe(item, &target).then(|| SubtreeConflict {
                source: item.path().to_path_buf(),
                target,
                kind: item.kind(),
            })
        })
        .collect()
}

/// Fail with one aggregated error if any item would land inside itself
pub fn check_subtree(items: &[ClipboardItem], destination: &Path) -> PasteResult<()> {
    let conflicts = find_subtree_conflicts(items, destination);

    if conflicts.is_empty() {
        return Ok(());
    }

    for conflict in &conflicts {
        warn!(
            "Source subtree conflict: {} -> {}",
            conflict.source.display(),
            conflict.target.display()
        );
    }

    Err(PasteError::SourceSubtreeConflict(conflicts))
}
