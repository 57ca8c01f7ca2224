use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::conflict::{ConflictDecision, ConflictPrompt};

/// Answers conflicts from a fixed script and records every question
pub struct ScriptedPrompt {
    answers: VecDeque<ConflictDecision>,
    pub asked: Vec<(PathBuf, PathBuf)>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<ConflictDecision>) -> Self {
        Self {
            answers: answers.into(),
            asked: Vec::new(),
        }
    }
}

impl ConflictPrompt for ScriptedPrompt {
    fn ask(&mut self, source: &Path, target: &Path) -> ConflictDecision {
        self.asked.push((source.to_path_buf(), target.to_path_buf()));
        self.answers.pop_front().unwrap_or_else(|| {
            panic!(
                "Unexpected conflict prompt #{} for {}",
                self.asked.len(),
                target.display()
            )
        })
    }
}

/// Collects formatted `info` and above, the level the trace log runs at by default
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        let writer = self.clone();
        tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
