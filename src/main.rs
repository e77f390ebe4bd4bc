//! gitwiki - a Git-backed wiki page store
//!
//! Command-line entry point for managing a wiki repository.

use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitwiki::page::{log_to_json, LogEntry, Page};
use gitwiki::store::{PageStore, StoreConfig, ENV_ROOT};

#[derive(Parser)]
#[command(name = "gitwiki")]
#[command(version, about = "Git-backed wiki page store", long_about = None)]
struct Cli {
    /// Wiki root directory
    #[arg(short = 'd', long, env = "WIKIPATH", global = true)]
    root: Option<PathBuf>,

    /// Commit author name
    #[arg(long, env = "GIT_USERNAME", global = true, default_value = "")]
    author_name: String,

    /// Commit author email
    #[arg(long, env = "GIT_EMAIL", global = true, default_value = "")]
    author_email: String,

    /// Put the page file back when its commit fails
    #[arg(long, global = true)]
    strict: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the wiki repository
    Init,

    /// Create or update a page from a file or stdin
    Save {
        title: String,

        /// Commit message
        #[arg(short, long)]
        message: Option<String>,

        /// Read the document from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Input is a JSON page payload rather than raw text
        #[arg(long)]
        json: bool,
    },

    /// Print a page
    Show {
        title: String,

        /// Show the page as of this commit
        #[arg(long)]
        at: Option<String>,

        /// Print the JSON page instead of the document
        #[arg(long)]
        json: bool,
    },

    /// Delete a page
    Remove { title: String },

    /// List page titles
    List,

    /// Show history of the wiki, or of one page
    Log {
        title: Option<String>,

        /// Number of entries to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gitwiki=debug" } else { "gitwiki=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let root = cli
        .root
        .with_context(|| format!("wiki root not configured; set {} or pass --root", ENV_ROOT))?;
    let config = StoreConfig::new(root)
        .author(cli.author_name, cli.author_email)
        .rollback_on_commit_failure(cli.strict);
    let store = PageStore::new(config);

    match cli.command {
        Commands::Init => {
            let repo = store.init_repository()?;
            println!("Initialized wiki in {}", repo.root().display());
        }
        Commands::Save {
            title,
            message,
            file,
            json,
        } => {
            let input = read_input(file)?;
            let (document, message) = if json {
                let page = Page::from_json(input.as_bytes())?;
                let message = message.or(Some(page.message).filter(|m| !m.is_empty()));
                (page.document, message)
            } else {
                (input, message)
            };

            let repo = store.open_repository()?;
            let page = store.save(&title, &document, message.as_deref(), &repo)?;
            if let Some(entry) = page.latest() {
                println!("{} {}", short(&entry.id), entry.message);
            }
        }
        Commands::Show { title, at, json } => {
            let repo = store.open_repository()?;
            let page = match at {
                Some(revision) => store.load_at(&title, &revision, &repo)?,
                None => {
                    let loaded = store.load(&title, &repo)?;
                    if let Some(e) = &loaded.history_error {
                        eprintln!("warning: history unavailable: {}", e);
                    }
                    loaded.into_page()
                }
            };

            let mut stdout = io::stdout();
            if json {
                stdout.write_all(&page.to_json()?)?;
                writeln!(stdout)?;
            } else {
                write!(stdout, "{}", page.document)?;
            }
        }
        Commands::Remove { title } => {
            let repo = store.open_repository()?;
            store.remove(&title, &repo)?;
            println!("Removed {}", title);
        }
        Commands::List => {
            for title in store.list_titles(&store.config().root)? {
                println!("{}", title);
            }
        }
        Commands::Log { title, limit, json } => {
            let repo = store.open_repository()?;
            let mut log = match title {
                Some(title) => store.history(&title, &repo)?,
                None => store.repository_log(&repo)?,
            };
            if let Some(limit) = limit {
                log.truncate(limit);
            }

            if json {
                println!("{}", String::from_utf8(log_to_json(&log)?)?);
            } else {
                print_log(&log);
            }
        }
    }

    Ok(())
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("cannot read stdin")?;
            Ok(buf)
        }
    }
}

fn print_log(log: &[LogEntry]) {
    if log.is_empty() {
        println!("(no history)");
        return;
    }
    for entry in log {
        println!(
            "{}  {}  {}",
            short(&entry.id),
            entry.date.format("%Y-%m-%d %H:%M:%S"),
            entry.message.lines().next().unwrap_or("")
        );
    }
}

fn short(id: &str) -> &str {
    id.get(..7).unwrap_or(id)
}
