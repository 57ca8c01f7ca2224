use std::path::Path;
use tracing::debug;

use super::item::ClipboardItem;
use crate::error::{PasteError, PasteResult};

/// The destination must be an existing directory before anything is copied
pub async fn validate_destination(destination: &Path) -> PasteResult<()> {
    debug!("Validating destination: {:?}", destination);

    let invalid = |reason: &str| PasteError::InvalidDestination {
        path: destination.to_path_buf(),
        reason: reason.to_string(),
    };

    let metadata = match tokio::fs::metadata(destination).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(invalid("path does not exist"));
        }
        Err(e) => return Err(invalid(&e.to_string())),
    };

    if !metadata.is_dir() {
        return Err(invalid("path is not a directory"));
    }

    debug!("Destination is a directory");
    Ok(())
}

pub fn validate_items(items: &[ClipboardItem]) -> PasteResult<()> {
    if items.is_empty() {
        return Err(PasteError::EmptyInputSet);
    }
    Ok(())
}
