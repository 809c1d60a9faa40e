//! folio - rebuilds a captured rules library and extracts its content.
//!
//! Usage:
//!   folio scan                Load the sources listing and every owned book
//!   folio update              Refresh whatever changed on disk since the last run
//!   folio status              List books with updates available
//!   folio content             Extract and merge content references as JSON

mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use folio_config::Config;
use folio_extract::models::ContentKind;
use folio_library::{BookFilter, Diagnostics, Library, Selection};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Rebuilds an ordered rules library from captured HTML pages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Configuration file (toml, yaml or json)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the sources listing and every owned book, then save the library
    Scan,
    /// Reload the saved library and refresh stale books
    Update,
    /// List books with updates available
    Status {
        /// List every book, not only stale ones
        #[arg(long)]
        all: bool,
    },
    /// Extract content references and merge them across books
    Content {
        /// Content kind to extract (repeatable; defaults to the configured kinds)
        #[arg(short, long = "kind", value_name = "KIND")]
        kinds: Vec<ContentKind>,
        /// Only read the book with this acronym (repeatable)
        #[arg(short, long = "book", value_name = "ACRONYM")]
        books: Vec<String>,
        /// Write the JSON to FILE instead of stdout
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Commands::Scan => cmd_scan(&config),
        Commands::Update => cmd_update(&config),
        Commands::Status { all } => cmd_status(&config, all),
        Commands::Content { kinds, books, out } => cmd_content(&config, kinds, books, out.as_deref()),
    }
}

fn cmd_scan(config: &Config) -> Result<()> {
    let options = &config.library;
    let mut library = Library::new(&options.name, &options.root, &options.sources_file);
    let diagnostics = scan(&mut library, config)?;
    save(&library, config)?;
    println!(
        "{} books ({} owned), {} pages",
        library.len(),
        library.books.iter().filter(|book| book.is_owned()).count(),
        library.books.iter().map(|book| book.len()).sum::<usize>(),
    );
    report(&diagnostics)
}

fn cmd_update(config: &Config) -> Result<()> {
    let mut library = Library::open(&config.library).or_raise(|| ErrorKind::Library)?;
    let diagnostics = match library.is_empty() {
        true => scan(&mut library, config)?,
        false => library.update().or_raise(|| ErrorKind::Library)?,
    };
    save(&library, config)?;
    report(&diagnostics)
}

fn cmd_status(config: &Config, all: bool) -> Result<()> {
    let library = Library::open(&config.library).or_raise(|| ErrorKind::Library)?;
    let mut stdout = io::stdout().lock();
    if all {
        for book in &library.books {
            let state = match (book.is_owned(), book.validate(), book.update_available()) {
                (false, _, _) => "not owned",
                (true, false, _) => "missing",
                (true, true, true) => "stale",
                (true, true, false) => "ok",
            };
            writeln!(stdout, "{:<12} {:<10} {} ({} pages)", book.acronym, state, book.name, book.len())
                .or_raise(|| ErrorKind::Output)?;
        }
        return Ok(());
    }
    let stale = library.book_names(BookFilter::UpdateAvailable(true));
    if stale.is_empty() && !library.sources.update_available() {
        writeln!(stdout, "up to date").or_raise(|| ErrorKind::Output)?;
    }
    if library.sources.update_available() {
        writeln!(stdout, "{}", library.sources.path.display()).or_raise(|| ErrorKind::Output)?;
    }
    for name in stale {
        writeln!(stdout, "{name}").or_raise(|| ErrorKind::Output)?;
    }
    Ok(())
}

fn cmd_content(config: &Config, kinds: Vec<ContentKind>, books: Vec<String>, out: Option<&Path>) -> Result<()> {
    let library = Library::open(&config.library).or_raise(|| ErrorKind::Library)?;
    let kinds = match kinds.is_empty() {
        true => config.extract.kinds.clone(),
        false => kinds,
    };
    let selection = match books.is_empty() {
        true => Selection::All,
        false => Selection::Acronyms(books),
    };
    let content = library
        .content(&selection, &kinds, &config.extract.normalize, &config.skip_books)
        .or_raise(|| ErrorKind::Library)?;
    let json = serde_json::to_vec_pretty(&content.references).or_raise(|| ErrorKind::Output)?;
    match out {
        Some(path) => std::fs::write(path, &json).or_raise(|| ErrorKind::Output)?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&json).or_raise(|| ErrorKind::Output)?;
            writeln!(stdout).or_raise(|| ErrorKind::Output)?;
        },
    }
    report(&content.diagnostics)
}

fn scan(library: &mut Library, config: &Config) -> Result<Diagnostics> {
    library.load_sources(true).or_raise(|| ErrorKind::Library)?;
    Ok(library.load_books(&config.skip_books))
}

fn save(library: &Library, config: &Config) -> Result<()> {
    library.save_json(&config.library.state_path()).or_raise(|| ErrorKind::Library)
}

/// Prints non-empty diagnostics to stderr, keeping stdout for data.
fn report(diagnostics: &Diagnostics) -> Result<()> {
    if diagnostics.is_clean() && diagnostics.merged_duplicates == 0 {
        return Ok(());
    }
    let json = serde_json::to_string_pretty(diagnostics).or_raise(|| ErrorKind::Output)?;
    eprintln!("{json}");
    Ok(())
}
