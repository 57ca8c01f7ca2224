pub mod models;

pub use models::{LogRotation, PasteConfig, PathLimits};
