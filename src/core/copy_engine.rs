use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use tracing::{debug, error, info, warn};

use super::conflict::{unique_name, ConflictChoice, ConflictPrompt, ConflictResolver};
use super::item::{ClipboardItem, ItemKind};
use super::path_resolver::{path_length, resolve_target};
use crate::config::PathLimits;
use crate::error::{LimitKind, PasteError, PasteResult};
use crate::platform::FileSystem;
use crate::state::SessionState;

/// Whether the walk may go on after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The user cancelled; unwind without touching remaining entries
    Cancelled,
}

impl Flow {
    pub fn is_cancelled(self) -> bool {
        self == Flow::Cancelled
    }
}

pub struct CopyEngine<P, F> {
    resolver: ConflictResolver<P>,
    fs: F,
    limits: PathLimits,
}

impl<P: ConflictPrompt, F: FileSystem> CopyEngine<P, F> {
    pub fn new(prompt: P, fs: F, limits: PathLimits) -> Self {
        Self {
            resolver: ConflictResolver::new(prompt),
            fs,
            limits,
        }
    }

    /// Paste one clipboard item under `destination`
    pub async fn copy_item(
        &mut self,
        item: &ClipboardItem,
        destination: &Path,
        state: &mut SessionState,
    ) -> PasteResult<Flow> {
        let target = resolve_target(item.path(), destination);
        info!("Target for {}: {}", item.path().display(), target.display());

        match item.kind() {
            ItemKind::File => self.copy_file(item.path(), &target, state).await,
            ItemKind::Directory => self.copy_tree(item.path(), &target, state).await,
        }
    }

    /// Copy a top-level file item to its computed target
    pub async fn copy_file(
        &mut self,
        source: &Path,
        target: &Path,
        state: &mut SessionState,
    ) -> PasteResult<Flow> {
        if !within_limit(target, LimitKind::File, self.limits.max_file_path, state) {
            return Ok(Flow::Continue);
        }

        if let Some(parent) = target.parent() {
            self.ensure_dir(parent, state).await?;
        }

        Ok(self.place_file(source, target, state).await)
    }

    /// Recreate `source_dir` at `target_dir`, merging into an existing folder.
    ///
    /// A failing subfolder is recorded and its siblings still copied.
    pub fn copy_tree<'a>(
        &'a mut self,
        source_dir: &'a Path,
        target_dir: &'a Path,
        state: &'a mut SessionState,
    ) -> Pin<Box<dyn Future<Output = PasteResult<Flow>> + 'a>> {
        Box::pin(async move {
            if !within_limit(target_dir, LimitKind::Folder, self.limits.max_folder_path, state) {
                return Ok(Flow::Continue);
            }

            self.ensure_dir(target_dir, state).await?;

            let entries = self
                .fs
                .read_dir(source_dir)
                .await
                .map_err(|e| PasteError::io("Read directory", source_dir, e))?;

            for entry in entries {
                let source_path = source_dir.join(&entry.name);
                let target_path = target_dir.join(&entry.name);

                let metadata = match entry.metadata {
                    Ok(m) => m,
                    Err(e) => {
                        record_failure(state, PasteError::io("Read metadata", &source_path, e), &source_path);
                        continue;
                    }
                };

                let flow = if metadata.is_dir() {
                    match self.copy_tree(&source_path, &target_path, state).await {
                        Ok(flow) => flow,
                        Err(e) => {
                            record_failure(state, e, &source_path);
                            Flow::Continue
                        }
                    }
                } else if metadata.is_file() {
                    if within_limit(&target_path, LimitKind::File, self.limits.max_file_path, state) {
                        self.place_file(&source_path, &target_path, state).await
                    } else {
                        Flow::Continue
                    }
                } else {
                    warn!("Skipping {}: not a regular file or folder", source_path.display());
                    Flow::Continue
                };

                if flow.is_cancelled() {
                    debug!("Unwinding {} after cancel", source_dir.display());
                    return Ok(Flow::Cancelled);
                }
            }

            Ok(Flow::Continue)
        })
    }

    async fn ensure_dir(&self, dir: &Path, state: &mut SessionState) -> PasteResult<()> {
        if let Ok(metadata) = self.fs.metadata(dir).await {
            if metadata.is_dir() {
                return Ok(());
            }
        }

        self.fs
            .create_dir_all(dir)
            .await
            .map_err(|e| PasteError::io("Create directory", dir, e))?;

        debug!("Created directory {}", dir.display());
        state.progress.directories_created += 1;
        Ok(())
    }

    /// Copy one file to `target`, resolving an existing target first.
    /// Failures are recorded, never returned.
    async fn place_file(&mut self, source: &Path, target: &Path, state: &mut SessionState) -> Flow {
        let (destination, choice) = match self.fs.symlink_metadata(target).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => (target.to_path_buf(), None),
            Err(e) => {
                record_failure(state, PasteError::io("Inspect target", target, e), source);
                return Flow::Continue;
            }
            Ok(metadata) if metadata.is_dir() => {
                let e = io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a folder with the same name already exists",
                );
                record_failure(state, PasteError::io("Copy file", target, e), source);
                return Flow::Continue;
            }
            Ok(_) => {
                let decision = self.resolver.resolve(source, target, state);
                match decision.choice {
                    ConflictChoice::Overwrite => (target.to_path_buf(), Some(ConflictChoice::Overwrite)),
                    ConflictChoice::Rename => match unique_name(&self.fs, target).await {
                        Ok(renamed) => (renamed, Some(ConflictChoice::Rename)),
                        Err(e) => {
                            record_failure(state, PasteError::io("Find free name", target, e), source);
                            return Flow::Continue;
                        }
                    },
                    ConflictChoice::Skip => {
                        info!("Skipped {}, keeping existing {}", source.display(), target.display());
                        state.progress.files_skipped += 1;
                        return Flow::Continue;
                    }
                    ConflictChoice::Cancel => {
                        warn!("Paste cancelled at {}", target.display());
                        state.mark_aborted();
                        return Flow::Cancelled;
                    }
                }
            }
        };

        match self.fs.copy_file(source, &destination).await {
            Ok(bytes) => {
                info!("Copied {} -> {} ({} bytes)", source.display(), destination.display(), bytes);
                let progress = &mut state.progress;
                progress.bytes_copied += bytes;
                progress.files_copied += 1;
                match choice {
                    Some(ConflictChoice::Overwrite) => progress.files_overwritten += 1,
                    Some(ConflictChoice::Rename) => progress.files_renamed += 1,
                    _ => {}
                }
            }
            Err(e) => record_failure(state, PasteError::io("Copy file", &destination, e), source),
        }

        Flow::Continue
    }
}

/// Skip-and-warn check against a legacy path-length ceiling
fn within_limit(path: &Path, kind: LimitKind, limit: usize, state: &mut SessionState) -> bool {
    let length = path_length(path);
    if length <= limit {
        return true;
    }

    let err = PasteError::PathTooLong {
        path: path.to_path_buf(),
        length,
        limit,
        kind,
    };
    warn!("{}", err);
    state.progress.record_too_long(&err, path);
    false
}

fn record_failure(state: &mut SessionState, err: PasteError, path: &Path) {
    error!("{}", err);
    state.progress.record_failure(&err, path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conflict::ConflictDecision;
    use crate::core::test_support::{LogCapture, ScriptedPrompt};
    use crate::platform::{local, ListedEntry, LocalFileSystem};
    use std::fs::Metadata;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// Refuses to create one directory, like a folder without write permission
    struct DenyingFileSystem {
        denied: PathBuf,
    }

    impl FileSystem for DenyingFileSystem {
        async fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
            local::copy_file(src, dst).await
        }

        async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            if path == self.denied {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
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
            local::list_dir(path).await
        }
    }

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    fn engine(prompt: &mut ScriptedPrompt) -> CopyEngine<&mut ScriptedPrompt, LocalFileSystem> {
        CopyEngine::new(prompt, LocalFileSystem::new(), PathLimits::default())
    }

    #[tokio::test]
    async fn test_file_lands_under_recreated_parent() {
        let root = tempdir().unwrap();
        let source = root.path().join("src").join("reports").join("q3.txt");
        let destination = root.path().join("dst");
        write(&source, "q3");
        std::fs::create_dir_all(&destination).unwrap();

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        let flow = engine(&mut prompt)
            .copy_item(&ClipboardItem::new(&source, ItemKind::File), &destination, &mut state)
            .await
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(read(&destination.join("src").join("reports").join("q3.txt")), "q3");
        assert_eq!(state.progress.files_copied, 1);
        assert_eq!(state.progress.bytes_copied, 2);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_target() {
        let root = tempdir().unwrap();
        let source = root.path().join("a.txt");
        let target = root.path().join("out").join("a.txt");
        write(&source, "new");
        write(&target, "old");

        let mut prompt = ScriptedPrompt::new(vec![ConflictDecision::once(ConflictChoice::Overwrite)]);
        let mut state = SessionState::new();
        engine(&mut prompt).copy_file(&source, &target, &mut state).await.unwrap();

        assert_eq!(read(&target), "new");
        assert_eq!(state.progress.files_overwritten, 1);
        assert_eq!(prompt.asked, vec![(source.clone(), target.clone())]);
    }

    #[tokio::test]
    async fn test_rename_keeps_original_target() {
        let root = tempdir().unwrap();
        let source = root.path().join("a.txt");
        let target = root.path().join("out").join("a.txt");
        write(&source, "new");
        write(&target, "old");

        let mut prompt = ScriptedPrompt::new(vec![ConflictDecision::once(ConflictChoice::Rename)]);
        let mut state = SessionState::new();
        engine(&mut prompt).copy_file(&source, &target, &mut state).await.unwrap();

        assert_eq!(read(&target), "old");
        assert_eq!(read(&root.path().join("out").join("a (1).txt")), "new");
        assert_eq!(state.progress.files_renamed, 1);
    }

    #[tokio::test]
    async fn test_skip_leaves_both_untouched() {
        let root = tempdir().unwrap();
        let source = root.path().join("a.txt");
        let target = root.path().join("out").join("a.txt");
        write(&source, "new");
        write(&target, "old");

        let mut prompt = ScriptedPrompt::new(vec![ConflictDecision::once(ConflictChoice::Skip)]);
        let mut state = SessionState::new();
        let flow = engine(&mut prompt).copy_file(&source, &target, &mut state).await.unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(read(&source), "new");
        assert_eq!(read(&target), "old");
        assert_eq!(state.progress.files_skipped, 1);
        assert_eq!(state.progress.files_copied, 0);
    }

    #[tokio::test]
    async fn test_tree_is_recreated_and_merged() {
        let root = tempdir().unwrap();
        let source = root.path().join("project");
        write(&source.join("readme.md"), "readme");
        write(&source.join("src").join("main.rs"), "fn main() {}");
        std::fs::create_dir_all(source.join("empty")).unwrap();

        let target = root.path().join("copy");
        write(&target.join("existing.txt"), "keep");

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        let flow = engine(&mut prompt).copy_tree(&source, &target, &mut state).await.unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(read(&target.join("readme.md")), "readme");
        assert_eq!(read(&target.join("src").join("main.rs")), "fn main() {}");
        assert!(target.join("empty").is_dir());
        assert_eq!(read(&target.join("existing.txt")), "keep");
        assert_eq!(state.progress.files_copied, 2);
        assert!(prompt.asked.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_unwinds_remaining_siblings() {
        let root = tempdir().unwrap();
        let source = root.path().join("src");
        let target = root.path().join("dst");
        for name in ["a.txt", "b.txt", "c.txt"] {
            write(&source.join(name), "new");
            write(&target.join(name), "old");
        }

        let mut prompt = ScriptedPrompt::new(vec![ConflictDecision::for_all(ConflictChoice::Cancel)]);
        let mut state = SessionState::new();
        let flow = engine(&mut prompt).copy_tree(&source, &target, &mut state).await.unwrap();

        assert_eq!(flow, Flow::Cancelled);
        assert!(state.is_aborted());
        assert_eq!(state.sticky(), None);
        assert_eq!(prompt.asked.len(), 1);
        for name in ["a.txt", "b.txt", "c.txt"] {
            assert_eq!(read(&target.join(name)), "old");
        }
    }

    #[tokio::test]
    async fn test_sticky_skip_logs_source_and_target() {
        let root = tempdir().unwrap();
        let source = root.path().join("src");
        let target = root.path().join("dst");
        write(&source.join("n").join("clash.txt"), "new");
        write(&target.join("n").join("clash.txt"), "old");

        let logs = LogCapture::default();
        let _guard = tracing::subscriber::set_default(logs.subscriber());

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::with_sticky(ConflictChoice::Skip);
        engine(&mut prompt).copy_tree(&source, &target, &mut state).await.unwrap();

        let logged = logs.contents();
        let target_file = target.join("n").join("clash.txt");
        assert!(logged.contains("(sticky choice)"), "{}", logged);
        assert!(
            logged.contains(&format!("keeping existing {}", target_file.display())),
            "{}",
            logged
        );
        assert_eq!(read(&target_file), "old");
        assert_eq!(state.progress.files_skipped, 1);
    }

    #[tokio::test]
    async fn test_apply_to_all_covers_whole_tree() {
        let root = tempdir().unwrap();
        let source = root.path().join("src");
        let target = root.path().join("dst");
        for name in ["a.txt", "nested/b.txt", "nested/deeper/c.txt"] {
            write(&source.join(name), "new");
            write(&target.join(name), "old");
        }

        let mut prompt = ScriptedPrompt::new(vec![ConflictDecision::for_all(ConflictChoice::Overwrite)]);
        let mut state = SessionState::new();
        engine(&mut prompt).copy_tree(&source, &target, &mut state).await.unwrap();

        assert_eq!(prompt.asked.len(), 1);
        assert_eq!(state.progress.files_overwritten, 3);
        for name in ["a.txt", "nested/b.txt", "nested/deeper/c.txt"] {
            assert_eq!(read(&target.join(name)), "new");
        }
    }

    #[tokio::test]
    async fn test_long_file_target_is_skipped() {
        let root = tempdir().unwrap();
        let source = root.path().join("src").join("quarterly_report.txt");
        let destination = root.path().join("dst");
        write(&source, "data");
        std::fs::create_dir_all(&destination).unwrap();

        let expected = destination.join("src").join("quarterly_report.txt");
        let limit = path_length(&expected) - 1;
        let limits = PathLimits { max_file_path: limit, max_folder_path: limit };

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        let flow = CopyEngine::new(&mut prompt, LocalFileSystem::new(), limits)
            .copy_item(&ClipboardItem::new(&source, ItemKind::File), &destination, &mut state)
            .await
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(!expected.exists());
        assert_eq!(state.progress.too_long_paths(), vec![expected]);
        assert!(state.progress.failures.is_empty());
    }

    #[tokio::test]
    async fn test_file_target_at_exact_limit_is_copied() {
        let root = tempdir().unwrap();
        let source = root.path().join("a.txt");
        let target = root.path().join("out").join("a.txt");
        write(&source, "data");

        let limit = path_length(&target);
        let limits = PathLimits { max_file_path: limit, max_folder_path: limit };

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        CopyEngine::new(&mut prompt, LocalFileSystem::new(), limits)
            .copy_file(&source, &target, &mut state)
            .await
            .unwrap();

        assert_eq!(read(&target), "data");
        assert!(state.progress.too_long.is_empty());
    }

    #[tokio::test]
    async fn test_long_folder_is_skipped_but_siblings_copied() {
        let root = tempdir().unwrap();
        let source = root.path().join("top");
        write(&source.join("ok.txt"), "ok");
        write(&source.join("deep_folder_name").join("x.txt"), "x");

        let target = root.path().join("out");
        let base = path_length(&target);
        let limits = PathLimits {
            max_file_path: base + 20,
            max_folder_path: base + 3,
        };

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        let flow = CopyEngine::new(&mut prompt, LocalFileSystem::new(), limits)
            .copy_tree(&source, &target, &mut state)
            .await
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(read(&target.join("ok.txt")), "ok");
        assert!(!target.join("deep_folder_name").exists());
        assert_eq!(state.progress.too_long_paths(), vec![target.join("deep_folder_name")]);
    }

    #[tokio::test]
    async fn test_denied_folder_is_reported_and_siblings_continue() {
        let root = tempdir().unwrap();
        let source = root.path().join("top");
        write(&source.join("a").join("x.txt"), "x");
        write(&source.join("b").join("y.txt"), "y");

        let target = root.path().join("out");
        let fs = DenyingFileSystem {
            denied: target.join("a"),
        };

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        let flow = CopyEngine::new(&mut prompt, fs, PathLimits::default())
            .copy_tree(&source, &target, &mut state)
            .await
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert_eq!(read(&target.join("b").join("y.txt")), "y");
        assert!(!target.join("a").exists());
        assert_eq!(state.progress.failures.len(), 1);
        assert_eq!(state.progress.failures[0].path, source.join("a"));
        assert!(state.progress.failures[0].message.contains("Create directory failed"));
    }

    #[tokio::test]
    async fn test_denied_top_level_folder_is_an_error() {
        let root = tempdir().unwrap();
        let source = root.path().join("top");
        write(&source.join("x.txt"), "x");
        let target = root.path().join("out");

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        let fs = DenyingFileSystem { denied: target.clone() };
        let result = CopyEngine::new(&mut prompt, fs, PathLimits::default())
            .copy_tree(&source, &target, &mut state)
            .await;

        assert!(matches!(result, Err(PasteError::Io { .. })));
    }

    #[tokio::test]
    async fn test_folder_in_place_of_file_is_a_failure() {
        let root = tempdir().unwrap();
        let source = root.path().join("top");
        write(&source.join("clash"), "file");
        let target = root.path().join("out");
        std::fs::create_dir_all(target.join("clash")).unwrap();

        let mut prompt = ScriptedPrompt::new(vec![]);
        let mut state = SessionState::new();
        engine(&mut prompt).copy_tree(&source, &target, &mut state).await.unwrap();

        assert!(prompt.asked.is_empty());
        assert!(target.join("clash").is_dir());
        assert_eq!(state.progress.failures.len(), 1);
    }
}
