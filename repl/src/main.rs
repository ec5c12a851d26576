//! circ - the library front desk.
//!
//! Entry point for the `circ` binary: loads configuration, opens the store and
//! hands control to the REPL or a one-shot admin command.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use circ_engine::{LendingEngine, SystemClock};
use circ_repl::{Backend, CircConfig, ConfigError, Repl};
use circ_session::{Library, SessionError};
use circ_store::{LendingStore, MemoryStore, SqliteStore};

/// Library circulation front desk.
#[derive(Parser)]
#[command(name = "circ", version, about = "Library circulation front desk")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, env = "CIRC_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// SQLite database file. Overrides the configured store.
    #[arg(long, env = "CIRC_DB", global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive front desk (the default).
    Repl {
        /// Command scripts to run before going interactive.
        scripts: Vec<PathBuf>,

        /// Create this administrator before starting. Needed to do anything
        /// useful with the memory backend.
        #[arg(long, requires = "admin_password")]
        admin: Option<String>,

        /// Password for `--admin`.
        #[arg(long, env = "CIRC_ADMIN_PASSWORD")]
        admin_password: Option<String>,
    },

    /// Create the database schema and seed categories.
    Init,

    /// Manage administrator accounts.
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create an administrator.
    Create {
        #[arg(long)]
        username: String,

        #[arg(long, env = "CIRC_ADMIN_PASSWORD")]
        password: String,

        /// Role label, "Librarian" when omitted.
        #[arg(long)]
        role: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circ=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CircConfig::load(path)?,
        None => CircConfig::default(),
    };
    if let Some(db) = &cli.db {
        config = config.with_database(db);
    }
    config.validate()?;

    let command = cli.command.unwrap_or(Commands::Repl {
        scripts: Vec::new(),
        admin: None,
        admin_password: None,
    });

    match config.store.backend {
        Backend::Memory => {
            let store = MemoryStore::new().with_lock_timeout(config.store.lock_timeout());
            run(command, library(store, &config))
        }
        Backend::Sqlite => {
            let path = config.store.path.as_deref().ok_or(ConfigError::MissingPath)?;
            let store = SqliteStore::open(path)
                .with_context(|| format!("opening {}", path.display()))?
                .with_lock_timeout(config.store.lock_timeout())?;
            tracing::info!(path = %path.display(), "database opened");
            run(command, library(store, &config))
        }
    }
}

fn library<S: LendingStore>(store: S, config: &CircConfig) -> Library<S, SystemClock> {
    let engine = LendingEngine::with_store(store)
        .with_loan_policy(config.loans)
        .with_fine_policy(config.fines);
    Library::new(engine)
}

fn run<S: LendingStore>(command: Commands, library: Library<S, SystemClock>) -> Result<()> {
    match command {
        Commands::Repl {
            scripts,
            admin,
            admin_password,
        } => {
            if let (Some(username), Some(password)) = (admin, admin_password) {
                match library.create_admin(&username, &password, None) {
                    Ok(_) | Err(SessionError::UsernameTaken { .. }) => {}
                    Err(err) => return Err(err.into()),
                }
            }
            repl(library, &scripts)
        }
        Commands::Init => {
            let categories = library.categories()?;
            println!("Catalog ready with {} categories", categories.len());
            Ok(())
        }
        Commands::Admin {
            action:
                AdminCommand::Create {
                    username,
                    password,
                    role,
                },
        } => {
            let id = library.create_admin(&username, &password, role.as_deref())?;
            println!("Administrator {username} created ({id})");
            Ok(())
        }
    }
}

fn repl<S: LendingStore>(library: Library<S, SystemClock>, scripts: &[PathBuf]) -> Result<()> {
    let mut repl = Repl::new(library);

    for path in scripts {
        if let Err(e) = repl.run_file(path) {
            bail!("{}: {}", path.display(), e);
        }
        if repl.is_finished() {
            return Ok(());
        }
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        repl.interactive();
    } else if scripts.is_empty() {
        let mut input = String::new();
        stdin
            .lock()
            .read_to_string(&mut input)
            .context("reading stdin")?;
        if let Err(e) = repl.run_script(&input) {
            bail!(e);
        }
    }
    Ok(())
}
