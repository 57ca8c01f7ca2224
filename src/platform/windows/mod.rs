pub mod filesystem;
pub mod long_path;

pub use filesystem::WindowsFileSystem;
pub use long_path::WindowsPathNormalizer;
