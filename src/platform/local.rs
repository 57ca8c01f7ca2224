use std::fs::Metadata;
use std::io;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use super::traits::{FileSystem, ListedEntry};

/// Buffer size for streaming copy (1MB)
const COPY_BUFFER_SIZE: usize = 1024 * 1024;

/// Plain tokio-backed filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    async fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        copy_file(src, dst).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn metadata(&self, path: &Path) -> io::Result<Metadata> {
        tokio::fs::metadata(path).await
    }

    async fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata> {
        tokio::fs::symlink_metadata(path).await
    }

    async fn try_exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<ListedEntry>> {
        list_dir(path).await
    }
}

/// Read every entry of `path` with its own (non-following) metadata
pub async fn list_dir(path: &Path) -> io::Result<Vec<ListedEntry>> {
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut listed = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        listed.push(ListedEntry {
            name: entry.file_name(),
            metadata: entry.metadata().await,
        });
    }

    Ok(listed)
}

/// Stream `src` into `dst`, replacing its contents, and carry over the modification time
pub async fn copy_file(src: &Path, dst: &Path) -> io::Result<u64> {
    debug!("Copying file: {:?} -> {:?}", src, dst);

    let mut src_file = tokio::fs::File::open(src).await?;
    let modified = src_file.metadata().await?.modified().ok();

    let mut dst_file = tokio::fs::File::create(dst).await?;

    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file.read(&mut buffer).await?;

        if bytes_read == 0 {
            break;
        }

        dst_file.write_all(&buffer[..bytes_read]).await?;
        total_bytes += bytes_read as u64;
    }

    dst_file.sync_all().await?;

    if let Some(modified) = modified {
        let dst_file = dst_file.into_std().await;
        if let Err(e) = dst_file.set_modified(modified) {
            debug!("Could not preserve modification time on {}: {}", dst.display(), e);
        }
    }

    Ok(total_bytes)
}
