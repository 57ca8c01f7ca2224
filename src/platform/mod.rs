pub mod console;
pub mod local;
pub mod traits;

#[cfg(windows)]
pub mod windows;

pub use console::ConsolePrompt;
pub use local::LocalFileSystem;
pub use traits::{FileSystem, ListedEntry, PathNormalizer};

#[cfg(windows)]
pub use windows::WindowsFileSystem;

/// Filesystem used by the binary on this platform
#[cfg(windows)]
pub type NativeFileSystem = WindowsFileSystem;

#[cfg(not(windows))]
pub type NativeFileSystem = LocalFileSystem;
