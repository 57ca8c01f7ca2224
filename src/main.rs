use anyhow::{bail, Context, Result};
use pastetree::{
    config::PasteConfig,
    core::{ClipboardItem, ConflictPolicy, CopyEngine, PasteSession, SessionOutcome, SessionReport},
    observability::{init_logging, shutdown_logging},
    platform::{ConsolePrompt, NativeFileSystem},
    state::SessionState,
    PasteError,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<PathBuf>,
    on_conflict: Option<ConflictPolicy>,
    sources_file: Option<PathBuf>,
    json: bool,
    help: bool,
    destination: Option<PathBuf>,
    sources: Vec<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config requires a file path")?;
                cli.config = Some(PathBuf::from(value));
            }
            "--on-conflict" => {
                let value = args.next().context("--on-conflict requires a mode")?;
                let policy = ConflictPolicy::parse(&value).with_context(|| {
                    format!("Unknown conflict mode '{}' (expected ask, overwrite, rename or skip)", value)
                })?;
                cli.on_conflict = Some(policy);
            }
            "--sources" => {
                let value = args.next().context("--sources requires a file path")?;
                cli.sources_file = Some(PathBuf::from(value));
            }
            "--json" => cli.json = true,
            "--help" | "-h" => cli.help = true,
            other if other.starts_with("--") => bail!("Unknown option: {}", other),
            _ => {
                if cli.destination.is_none() {
                    cli.destination = Some(PathBuf::from(arg));
                } else {
                    cli.sources.push(PathBuf::from(arg));
                }
            }
        }
    }

    Ok(cli)
}

/// One path per line, blank lines ignored
fn parse_source_list(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn absolute(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

// The conflict prompt reads stdin synchronously; one paste runs one step at a time
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = parse_args(std::env::args().skip(1))?;

    if cli.help {
        print_help();
        return Ok(());
    }

    let mut config = PasteConfig::load_or_default(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    if let Some(policy) = cli.on_conflict {
        config.on_conflict = policy;
    }

    init_logging(
        &config.log_level,
        config.log_directory.as_deref(),
        config.log_rotation.into(),
    )?;

    info!("pastetree v{}", env!("CARGO_PKG_VERSION"));

    let result = run(cli, config).await;
    shutdown_logging();
    result
}

async fn run(cli: CliArgs, config: PasteConfig) -> Result<()> {
    let Some(destination) = cli.destination else {
        print_help();
        bail!("Missing destination folder");
    };

    let mut sources = cli.sources;
    if let Some(list) = &cli.sources_file {
        let content = tokio::fs::read_to_string(list)
            .await
            .with_context(|| format!("Failed to read source list {}", list.display()))?;
        sources.extend(parse_source_list(&content));
    }

    let mut items = Vec::with_capacity(sources.len());
    for source in &sources {
        items.push(ClipboardItem::read(absolute(source)).await?);
    }

    let destination = absolute(&destination);

    if let Some(log_dir) = &config.log_directory {
        info!("Trace log: {}", log_dir.display());
    }

    let state = match config.on_conflict.sticky_choice() {
        Some(choice) => {
            info!("Conflicts resolved as {:?} without prompting", choice);
            SessionState::with_sticky(choice)
        }
        None => SessionState::new(),
    };

    let engine = CopyEngine::new(ConsolePrompt::stdio(), NativeFileSystem::new(), config.limits);
    let mut session = PasteSession::new(destination, engine, state);

    let report = session.run(&items).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if report.outcome == SessionOutcome::Cancelled {
        return Err(PasteError::Cancelled.into());
    }

    if report.progress.has_issues() {
        bail!(
            "{} path(s) too long and {} failure(s); see the summary above",
            report.progress.too_long.len(),
            report.progress.failures.len()
        );
    }

    Ok(())
}

fn print_summary(report: &SessionReport) {
    let progress = &report.progress;

    match report.outcome {
        SessionOutcome::Done => println!("Paste into {} finished.", report.destination.display()),
        SessionOutcome::Cancelled => {
            warn!("Paste was cancelled; files already copied were kept");
            println!("Paste into {} cancelled.", report.destination.display());
        }
    }

    println!(
        "  {} file(s) copied ({} bytes), {} overwritten, {} renamed, {} skipped",
        progress.files_copied,
        progress.bytes_copied,
        progress.files_overwritten,
        progress.files_renamed,
        progress.files_skipped
    );
    println!("  {} folder(s) created", progress.directories_created);

    if !progress.too_long.is_empty() {
        println!("  Skipped for path length:");
        for issue in &progress.too_long {
            println!("    {}", issue.path.display());
        }
    }

    if !progress.failures.is_empty() {
        println!("  Failed:");
        for issue in &progress.failures {
            println!("    {}: {}", issue.path.display(), issue.message);
        }
    }
}

fn print_help() {
    println!("pastetree v{} - paste files and folders into a destination", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("  pastetree [OPTIONS] DESTINATION [SOURCE...]");
    println!();
    println!("OPTIONS:");
    println!("  --config FILE         Configuration file (default: pastetree_config.json if present)");
    println!("  --on-conflict MODE    ask, overwrite, rename or skip");
    println!("  --sources FILE        Read additional sources, one path per line");
    println!("  --json                Print the session report as JSON");
    println!("  --help                Show this help");
    println!();
    println!("CONFLICT PROMPT:");
    println!("  o = overwrite, r = rename, s = skip, c = cancel; add ! to apply to all");
    println!();
    println!("EXAMPLES:");
    println!("  pastetree D:\\Backup C:\\Users\\User\\Documents\\report.docx");
    println!("  pastetree --on-conflict rename /mnt/archive ~/projects/site");
}
