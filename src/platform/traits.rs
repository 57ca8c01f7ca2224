use std::ffi::OsString;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

/// Path normalization for platform-specific requirements
pub trait PathNormalizer {
    /// Normalize path for the platform (e.g., Windows long path support)
    fn normalize(&self, path: &Path) -> PathBuf;
}

/// One child of a listed directory
#[derive(Debug)]
pub struct ListedEntry {
    pub name: OsString,
    /// Metadata of the entry itself; symlinks are not followed
    pub metadata: io::Result<Metadata>,
}

/// Every filesystem call a paste makes below its destination and sources
pub trait FileSystem {
    /// Copy a file, truncating an existing target. Returns bytes written.
    fn copy_file(&self, src: &Path, dst: &Path) -> impl Future<Output = io::Result<u64>> + Send;

    /// Create a directory with its missing parents; an existing directory is not an error
    fn create_dir_all(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    fn metadata(&self, path: &Path) -> impl Future<Output = io::Result<Metadata>> + Send;

    fn symlink_metadata(&self, path: &Path) -> impl Future<Output = io::Result<Metadata>> + Send;

    fn try_exists(&self, path: &Path) -> impl Future<Output = io::Result<bool>> + Send;

    /// Children of `path` in the order the filesystem yields them
    fn read_dir(&self, path: &Path) -> impl Future<Output = io::Result<Vec<ListedEntry>>> + Send;
}
