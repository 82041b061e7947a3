use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "arbor",
    about = "Arbor -- a versioned file tree where every write is a commit",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Repository directory (default: the current directory)
    #[arg(short = 'C', long, global = true)]
    pub repo: Option<PathBuf>,

    /// Config file (default: <repo>/arbor.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a repository, or leave an existing one untouched
    Init(InitArgs),
    /// List a directory
    Ls(PathArgs),
    /// Print a file
    Cat(FileArgs),
    /// Print the object id of a file or directory
    Checksum(PathArgs),
    /// Commit a file from disk or stdin
    Write(WriteArgs),
    /// Commit an empty directory
    Mkdir(MkdirArgs),
    /// Show commit history
    Log(LogArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Branch that HEAD should point at
    #[arg(long)]
    pub branch: Option<String>,
}

#[derive(Args)]
pub struct PathArgs {
    #[arg(default_value = "")]
    pub path: String,
}

#[derive(Args)]
pub struct FileArgs {
    pub path: String,
}

#[derive(Args)]
pub struct AuthorArgs {
    #[arg(short, long)]
    pub message: Option<String>,
    /// Author name (default: $ARBOR_AUTHOR_NAME)
    #[arg(long)]
    pub author: Option<String>,
    /// Author email (default: $ARBOR_AUTHOR_EMAIL)
    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Args)]
pub struct WriteArgs {
    pub path: String,
    /// Read content from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub author: AuthorArgs,
}

#[derive(Args)]
pub struct MkdirArgs {
    pub path: String,
    #[command(flatten)]
    pub author: AuthorArgs,
}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
    #[arg(long)]
    pub oneline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["arbor", "init", "--branch", "trunk"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.branch.as_deref(), Some("trunk"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn ls_defaults_to_root() {
        let cli = Cli::try_parse_from(["arbor", "ls"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.path, "");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn cat_requires_a_path() {
        assert!(Cli::try_parse_from(["arbor", "cat"]).is_err());
    }

    #[test]
    fn parse_write() {
        let cli = Cli::try_parse_from([
            "arbor", "write", "bar/qux.txt", "-f", "local.txt", "-m", "Have fun.", "--author",
            "Paul", "--email", "p@example.com",
        ])
        .unwrap();
        if let Command::Write(args) = cli.command {
            assert_eq!(args.path, "bar/qux.txt");
            assert_eq!(args.file, Some(PathBuf::from("local.txt")));
            assert_eq!(args.author.message.as_deref(), Some("Have fun."));
            assert_eq!(args.author.author.as_deref(), Some("Paul"));
            assert_eq!(args.author.email.as_deref(), Some("p@example.com"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_log_oneline() {
        let cli = Cli::try_parse_from(["arbor", "log", "--oneline", "-n", "5"]).unwrap();
        if let Command::Log(args) = cli.command {
            assert!(args.oneline);
            assert_eq!(args.limit, 5);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "arbor", "mkdir", "docs", "-C", "/srv/repo", "--verbose", "--format", "json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.repo, Some(PathBuf::from("/srv/repo")));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Command::Mkdir(_)));
    }
}
