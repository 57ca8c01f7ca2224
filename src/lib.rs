pub mod config;
pub mod core;
pub mod error;
pub mod observability;
pub mod platform;
pub mod state;

pub use anyhow::{Context, Result};
pub use error::{PasteError, PasteResult};
