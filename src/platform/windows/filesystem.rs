use crate::platform::local;
use crate::platform::traits::{FileSystem, ListedEntry, PathNormalizer};
use crate::platform::windows::long_path::WindowsPathNormalizer;
use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Windows filesystem that reads and writes through extended-length paths when needed
pub struct WindowsFileSystem {
    normalizer: WindowsPathNormalizer,
}

impl WindowsFileSystem {
    pub fn new() -> Self {
        Self {
            normalizer: WindowsPathNormalizer,
        }
    }
}

impl Default for WindowsFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for WindowsFileSystem {
    async fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        let src = self.normalizer.normalize(src);
        let dst = self.normalizer.normalize(dst);
        local::copy_file(&src, &dst).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = self.normalizer.normalize(path);
        tokio::fs::create_dir_all(&path).await
    }

    async fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        tokio::fs::metadata(self.normalizer.normalize(path)).await
    }

    async fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        tokio::fs::symlink_metadata(self.normalizer.normalize(path)).await
    }

    async fn try_exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(self.normalizer.normalize(path)).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<ListedEntry>> {
        local::list_dir(&self.normalizer.normalize(path)).await
    }
}
