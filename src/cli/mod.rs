use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::ConfigLoader;
use crate::store::{JsonSlotRepository, NoteStore};

pub mod commands;

use self::commands::{AddArgs, ClearArgs, ListArgs, RemoveArgs};

#[derive(Parser, Debug)]
#[command(
    name = "calnote",
    version,
    about = "Month-view calendar with per-day notes in the terminal"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over CALNOTE_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over CALNOTE_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive calendar (default)
    Tui,
    /// Add a note to a day from the command line
    Add(AddArgs),
    /// Print notes, optionally narrowed to one day or one month
    List(ListArgs),
    /// Remove a single note by its id
    Remove(RemoveArgs),
    /// Remove every note on a day
    Clear(ClearArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("CALNOTE_CONFIG", path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var("CALNOTE_DATA", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;

    let repository = JsonSlotRepository::new(&config.storage.notes_path, config.storage.pretty_json);
    let store = NoteStore::open(Box::new(repository))
        .with_context(|| format!("opening notes at {}", config.storage.notes_path.display()))?;

    let config = Arc::new(config);
    let command = cli.command.unwrap_or(Commands::Tui);
    match command {
        Commands::Tui => {
            let mut app = App::new(config, store);
            commands::run_tui(&mut app)
        }
        Commands::Add(args) => commands::add_note(store, args),
        Commands::List(args) => commands::list_notes(&store, args),
        Commands::Remove(args) => commands::remove_note(store, args),
        Commands::Clear(args) => commands::clear_day(store, args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
