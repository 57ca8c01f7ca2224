pub mod models;

pub use models::{CopyProgress, PathIssue, SessionState, SessionStatus};
