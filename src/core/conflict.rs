use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::platform::FileSystem;
use crate::state::SessionState;

/// What to do with a file whose target already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictChoice {
    /// Replace the existing target
    Overwrite,
    /// Copy next to the target under a free "name (n).ext"
    Rename,
    /// Leave source and target untouched
    Skip,
    /// Stop the whole session
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictDecision {
    pub choice: ConflictChoice,
    pub apply_to_all: bool,
}

impl ConflictDecision {
    pub fn once(choice: ConflictChoice) -> Self {
        Self {
            choice,
            apply_to_all: false,
        }
    }

    pub fn for_all(choice: ConflictChoice) -> Self {
        Self {
            choice,
            apply_to_all: true,
        }
    }
}

/// Configured answer to conflicts before any prompt is shown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Prompt for every conflict
    #[default]
    Ask,
    Overwrite,
    Rename,
    Skip,
}

impl ConflictPolicy {
    /// The sticky choice this policy seeds a session with
    pub fn sticky_choice(&self) -> Option<ConflictChoice> {
        match self {
            ConflictPolicy::Ask => None,
            ConflictPolicy::Overwrite => Some(ConflictChoice::Overwrite),
            ConflictPolicy::Rename => Some(ConflictChoice::Rename),
            ConflictPolicy::Skip => Some(ConflictChoice::Skip),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ask" => Some(ConflictPolicy::Ask),
            "overwrite" => Some(ConflictPolicy::Overwrite),
            "rename" => Some(ConflictPolicy::Rename),
            "skip" => Some(ConflictPolicy::Skip),
            _ => None,
        }
    }
}

/// Asks the user how to resolve one conflict. Blocks until answered.
pub trait ConflictPrompt {
    fn ask(&mut self, source: &Path, target: &Path) -> ConflictDecision;
}

impl<P: ConflictPrompt + ?Sized> ConflictPrompt for &mut P {
    fn ask(&mut self, source: &Path, target: &Path) -> ConflictDecision {
        (**self).ask(source, target)
    }
}

pub struct ConflictResolver<P> {
    prompt: P,
}

impl<P: ConflictPrompt> ConflictResolver<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }

    /// Decide what happens to `source` now that `target` exists.
    ///
    /// A sticky choice in `state` wins without prompting. Otherwise the prompt
    /// is asked, and an "apply to all" answer other than Cancel becomes the
    /// sticky choice for the rest of the session.
    pub fn resolve(
        &mut self,
        source: &Path,
        target: &Path,
        state: &mut SessionState,
    ) -> ConflictDecision {
        if let Some(choice) = state.sticky() {
            info!(
                "Conflict decision for {} -> {}: {:?} (sticky choice)",
                source.display(),
                target.display(),
                choice
            );
            return ConflictDecision::for_all(choice);
        }

        let decision = self.prompt.ask(source, target);
        info!(
            "Conflict decision for {} -> {}: {:?} (apply to all: {})",
            source.display(),
            target.display(),
            decision.choice,
            decision.apply_to_all
        );

        if decision.apply_to_all {
            state.remember(decision.choice);
        }

        decision
    }
}

/// First free sibling of `path`, trying "stem (1).ext", "stem (2).ext", ...
///
/// Returns `path` unchanged when nothing exists there yet.
pub async fn unique_name<F: FileSystem>(fs: &F, path: &Path) -> std::io::Result<PathBuf> {
    if !fs.try_exists(path).await? {
        return Ok(path.to_path_buf());
    }

    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter: u64 = 1;
    loop {
        let candidate = parent.join(format!("{} ({}){}", stem, counter, ext));
        if !fs.try_exists(&candidate).await? {
            debug!("Unique name for {}: {}", path.display(), candidate.display());
            return Ok(candidate);
        }
        counter += 1;
    }
}
