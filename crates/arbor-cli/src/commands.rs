use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use arbor_fs::{CommitInfo, FileStore, FileStoreConfig, WriteOutcome, CONFIG_FILE_NAME};
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.repo.as_deref(), cli.config.as_deref())?;
    debug!(root = %config.root.display(), branch = %config.branch, "configuration resolved");
    let format = cli.format;

    match cli.command {
        Command::Init(args) => cmd_init(config, args),
        Command::Ls(args) => cmd_ls(&open(config)?, &args.path, &format),
        Command::Cat(args) => cmd_cat(&open(config)?, &args.path),
        Command::Checksum(args) => cmd_checksum(&open(config)?, &args.path, &format),
        Command::Write(args) => cmd_write(&open(config)?, args, &format),
        Command::Mkdir(args) => cmd_mkdir(&open(config)?, args, &format),
        Command::Log(args) => cmd_log(&open(config)?, args, &format),
    }
}

/// `--config` wins; otherwise `<repo>/arbor.toml` is used when it exists.
/// An explicit `--repo` always overrides the configured root.
fn resolve_config(repo: Option<&Path>, config: Option<&Path>) -> anyhow::Result<FileStoreConfig> {
    let repo_dir = repo.unwrap_or_else(|| Path::new("."));
    let candidate = repo_dir.join(CONFIG_FILE_NAME);

    let mut resolved = match config {
        Some(path) => FileStoreConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None if candidate.is_file() => FileStoreConfig::load(&candidate)?,
        None => FileStoreConfig::at(repo_dir),
    };
    if let Some(repo) = repo {
        resolved.root = repo.to_path_buf();
    }
    Ok(resolved)
}

fn open(config: FileStoreConfig) -> anyhow::Result<FileStore> {
    let root = config.root.clone();
    FileStore::open(config).with_context(|| {
        format!("{} (run `arbor init` first)", root.display())
    })
}

fn commit_info(args: AuthorArgs, default_message: String) -> CommitInfo {
    let name = args
        .author
        .or_else(|| std::env::var("ARBOR_AUTHOR_NAME").ok())
        .unwrap_or_else(|| "arbor".into());
    let email = args
        .email
        .or_else(|| std::env::var("ARBOR_AUTHOR_EMAIL").ok())
        .unwrap_or_else(|| "arbor@localhost".into());
    CommitInfo::now(name, email, args.message.unwrap_or(default_message))
}

fn cmd_init(mut config: FileStoreConfig, args: InitArgs) -> anyhow::Result<()> {
    if let Some(branch) = args.branch {
        config.branch = branch;
    }
    let root: PathBuf = config.root.clone();
    let store = FileStore::init(config)?;
    println!(
        "{} Initialized arbor repository in {}",
        "✓".green().bold(),
        root.display().to_string().bold()
    );
    println!("  Branch: {}", store.current_branch()?.yellow());
    Ok(())
}

fn cmd_ls(store: &FileStore, path: &str, format: &OutputFormat) -> anyhow::Result<()> {
    let listing = store.read_directory(path)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Text => {
            for entry in &listing {
                if entry.is_dir() {
                    println!("{}/", entry.name().blue().bold());
                } else {
                    println!("{}", entry.name());
                }
            }
        }
    }
    Ok(())
}

fn cmd_cat(store: &FileStore, path: &str) -> anyhow::Result<()> {
    let data = store.read_file(path)?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&data)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_checksum(store: &FileStore, path: &str, format: &OutputFormat) -> anyhow::Result<()> {
    let checksum = store.checksum(path)?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "path": path, "checksum": checksum })),
        OutputFormat::Text => println!("{checksum}"),
    }
    Ok(())
}

fn cmd_write(store: &FileStore, args: WriteArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let info = commit_info(args.author, format!("Write {}", args.path));
    let outcome = match &args.file {
        Some(file) => {
            let reader = File::open(file)
                .with_context(|| format!("failed to open {}", file.display()))?;
            store.write_file(&args.path, reader, &info)?
        }
        None => {
            let mut stdin = io::stdin().lock();
            let mut data = Vec::new();
            stdin.read_to_end(&mut data)?;
            store.write_file(&args.path, data.as_slice(), &info)?
        }
    };
    report(&args.path, &outcome, format)
}

fn cmd_mkdir(store: &FileStore, args: MkdirArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let info = commit_info(args.author, format!("Create directory {}", args.path));
    let outcome = store.create_directory(&args.path, &info)?;
    report(&args.path, &outcome, format)
}

fn report(path: &str, outcome: &WriteOutcome, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "path": path,
                "blob": outcome.blob_id.to_hex(),
                "tree": outcome.tree_id.to_hex(),
                "commit": outcome.commit_id.to_hex(),
                "parent": outcome.parent.map(|p| p.to_hex()),
                "reference": outcome.reference,
            })
        ),
        OutputFormat::Text => {
            println!(
                "{} {} [{} {}]",
                "✓".green().bold(),
                path.bold(),
                outcome.reference.trim_start_matches("refs/heads/").yellow(),
                outcome.commit_id.short_hex().dimmed()
            );
        }
    }
    Ok(())
}

fn cmd_log(store: &FileStore, args: LogArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let history = store.history(args.limit)?;
    if let OutputFormat::Json = format {
        let entries: Vec<_> = history
            .iter()
            .map(|c| {
                json!({
                    "commit": c.id.to_hex(),
                    "tree": c.tree.to_hex(),
                    "parent": c.parent.map(|p| p.to_hex()),
                    "author": c.author.to_string(),
                    "date": c.author.when.to_rfc3339(),
                    "message": c.message,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No commits yet.");
    }
    for commit in &history {
        let subject = commit.message.lines().next().unwrap_or_default();
        if args.oneline {
            println!("{} {}", commit.id.short_hex().yellow(), subject);
            continue;
        }
        println!("{} {}", "commit".yellow(), commit.id.to_hex().yellow());
        println!("Author: {}", commit.author);
        println!("Date:   {}", commit.author.when.format("%a %b %e %H:%M:%S %Y %z"));
        println!();
        for line in commit.message.lines() {
            println!("    {line}");
        }
        println!();
    }
    Ok(())
}
