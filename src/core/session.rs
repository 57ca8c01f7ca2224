use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::copy_engine::CopyEngine;
use super::conflict::ConflictPrompt;
use super::item::ClipboardItem;
use super::subtree_guard::check_subtree;
use super::validation::{validate_destination, validate_items};
use crate::error::PasteResult;
use crate::platform::FileSystem;
use crate::state::{CopyProgress, SessionState, SessionStatus};

/// How a session that got past its pre-flight checks ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionOutcome {
    Done,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub destination: PathBuf,
    pub items_total: usize,
    pub items_processed: usize,
    pub progress: CopyProgress,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives one paste: every pre-flight check first, then each item in order
pub struct PasteSession<P, F> {
    destination: PathBuf,
    engine: CopyEngine<P, F>,
    state: SessionState,
}

impl<P: ConflictPrompt, F: FileSystem> PasteSession<P, F> {
    pub fn new(destination: impl Into<PathBuf>, engine: CopyEngine<P, F>, state: SessionState) -> Self {
        Self {
            destination: destination.into(),
            engine,
            state,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Paste `items` into the destination.
    ///
    /// Destination, input and subtree problems are returned as errors before
    /// anything is written. After that, per-item failures are recorded in the
    /// report and the remaining items still run; only Cancel stops early.
    pub async fn run(&mut self, items: &[ClipboardItem]) -> PasteResult<SessionReport> {
        let started_at = Utc::now();

        info!("Pasting {} item(s) into {}", items.len(), self.destination.display());
        for item in items {
            info!("Input: {} ({:?})", item.path().display(), item.kind());
        }

        self.state.set_status(SessionStatus::GuardCheck);
        if let Err(e) = self.preflight(items).await {
            error!("{}", e);
            self.state.set_status(SessionStatus::Aborted);
            return Err(e);
        }

        self.state.set_status(SessionStatus::Copying);

        let mut outcome = SessionOutcome::Done;
        let mut items_processed = 0;

        for item in items {
            let result = self
                .engine
                .copy_item(item, &self.destination, &mut self.state)
                .await;

            let cancelled = match result {
                Ok(flow) => flow.is_cancelled(),
                Err(e) if e.is_fatal() => {
                    error!("{}", e);
                    self.state.set_status(SessionStatus::Aborted);
                    return Err(e);
                }
                Err(e) => {
                    error!("Failed to paste {}: {}", item.path().display(), e);
                    self.state.progress.record_failure(&e, item.path());
                    false
                }
            };

            if cancelled || self.state.is_aborted() {
                warn!("Paste cancelled by user after {} item(s)", items_processed);
                outcome = SessionOutcome::Cancelled;
                break;
            }

            items_processed += 1;
        }

        self.state.set_status(match outcome {
            SessionOutcome::Done => SessionStatus::Done,
            SessionOutcome::Cancelled => SessionStatus::Cancelled,
        });

        let report = SessionReport {
            outcome,
            destination: self.destination.clone(),
            items_total: items.len(),
            items_processed,
            progress: self.state.progress.clone(),
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Paste {:?}: {} file(s) copied, {} skipped, {} too long, {} failed",
            report.outcome,
            report.progress.files_copied,
            report.progress.files_skipped,
            report.progress.too_long.len(),
            report.progress.failures.len()
        );

        Ok(report)
    }

    async fn preflight(&self, items: &[ClipboardItem]) -> PasteResult<()> {
        validate_destination(&self.destination).await?;
        validate_items(items)?;
        check_subtree(items, &self.destination)
    }
}
