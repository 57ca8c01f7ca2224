use crate::platform::traits::PathNormalizer;
use std::path::{Path, PathBuf};

/// Windows MAX_PATH, including the terminating NUL
const WINDOWS_MAX_PATH: usize = 260;

/// CreateDirectoryW reserves room for an 8.3 file name below the new directory
const DIRECTORY_HEADROOM: usize = 12;

/// Windows extended path prefix
const EXTENDED_PATH_PREFIX: &str = r"\\?\";

pub struct WindowsPathNormalizer;

impl WindowsPathNormalizer {
    /// Canonicalize the deepest existing ancestor and re-append the rest,
    /// so targets that do not exist yet still get an absolute form
    fn canonicalize_lenient(path: &Path) -> Option<PathBuf> {
        if let Ok(normalized) = dunce::canonicalize(path) {
            return Some(normalized);
        }

        let mut existing = path;
        let mut missing = Vec::new();

        while let Some(parent) = existing.parent() {
            missing.push(existing.file_name()?);
            existing = parent;

            if let Ok(mut normalized) = dunce::canonicalize(existing) {
                for name in missing.iter().rev() {
                    normalized.push(name);
                }
                return Some(normalized);
            }
        }

        None
    }
}

impl PathNormalizer for WindowsPathNormalizer {
    fn normalize(&self, path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();

        if path_str.starts_with(EXTENDED_PATH_PREFIX) {
            return path.to_path_buf();
        }

        let Some(normalized) = Self::canonicalize_lenient(path) else {
            tracing::debug!(
                "Cannot canonicalize '{}', using original path",
                path.display()
            );
            return path.to_path_buf();
        };

        let normalized_str = normalized.to_string_lossy();

        if normalized_str.len() < WINDOWS_MAX_PATH - DIRECTORY_HEADROOM {
            return normalized;
        }

        tracing::debug!(
            "Path length {} is close to MAX_PATH, adding extended prefix",
            normalized_str.len()
        );

        if let Some(unc) = normalized_str.strip_prefix(r"\\") {
            PathBuf::from(format!(r"\\?\UNC\{}", unc))
        } else {
            PathBuf::from(format!("{}{}", EXTENDED_PATH_PREFIX, normalized_str))
        }
    }
}
