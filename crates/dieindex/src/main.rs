use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use dieindex_core::config::{IndexConfig, MemoStrategy, SchedulerKind};
use dieindex_core::index::{CookedIndexVector, EntryRef};
use dieindex_core::scanner;
use dieindex_core::types::Address;
use dieindex_utils::{info, init_logging_with, LogLevel, LogSettings};

/// Build a cooked DWARF name index for an object file and query it.
#[derive(Parser, Debug)]
#[command(name = "dieindex")]
#[command(version)]
#[command(about = "Build and query a cooked DWARF name index", long_about = None)]
struct Cli
{
    /// Number of shards to scan and finalize in parallel (default: DIEINDEX_SHARDS or CPU count, at most 8)
    #[arg(long, global = true)]
    shards: Option<NonZeroUsize>,
    /// Where finalization runs: inline, thread or tokio (default: DIEINDEX_SCHEDULER or thread)
    #[arg(long, global = true)]
    scheduler: Option<SchedulerKind>,
    /// Canonical-name memoization: identity or content (default: DIEINDEX_MEMO or identity)
    #[arg(long, global = true)]
    memo: Option<MemoStrategy>,
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Find entries by name
    Find
    {
        /// Object file to index
        binary: PathBuf,
        /// Name to look up (case-insensitive)
        name: String,
        /// Treat the name as a prefix
        #[arg(long, default_value_t = false)]
        complete: bool,
        /// Print at most this many matches
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Find the compile unit covering an address
    Lookup
    {
        /// Object file to index
        binary: PathBuf,
        /// Address (hex format: 0x1000 or decimal)
        address: Address,
    },
    /// Show the program's entry point
    Main
    {
        /// Object file to index
        binary: PathBuf,
    },
    /// Print every entry and address range
    Dump
    {
        /// Object file to index
        binary: PathBuf,
    },
}

impl Commands
{
    fn binary(&self) -> &Path
    {
        match self {
            Commands::Find { binary, .. }
            | Commands::Lookup { binary, .. }
            | Commands::Main { binary }
            | Commands::Dump { binary } => binary,
        }
    }
}

fn main()
{
    let cli = Cli::parse();

    let settings = match LogSettings::from_env() {
        Ok(settings) => settings.with_level(cli.log_level),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = init_logging_with(&settings) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    let mut config = IndexConfig::from_env()?;
    if let Some(shards) = cli.shards {
        config.shards = shards;
    }
    if let Some(scheduler) = cli.scheduler {
        config.scheduler = scheduler;
    }
    if let Some(memo) = cli.memo {
        config.memo = memo;
    }

    // The tokio scheduler hands jobs to the runtime entered here, so it has to
    // outlive every query.
    let runtime = match config.scheduler {
        SchedulerKind::Tokio => Some(tokio::runtime::Builder::new_multi_thread().enable_all().build()?),
        SchedulerKind::Inline | SchedulerKind::Thread => None,
    };
    let _entered = runtime.as_ref().map(tokio::runtime::Runtime::enter);

    info!(binary = %cli.command.binary().display(), ?config, "building index");
    let index = scanner::scan_file(cli.command.binary(), &config, config.index_options()?)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Find {
            name, complete, limit, ..
        } => {
            let matches = index.find(&name, complete);
            let total = matches.len();
            let mut shown = 0usize;
            for entry in matches.take(limit.unwrap_or(usize::MAX)) {
                print_entry(&mut out, entry)?;
                shown += 1;
            }
            if shown < total {
                writeln!(out, "... {} more", total - shown)?;
            } else if total == 0 {
                writeln!(out, "no match for {name:?}")?;
            }
        }
        Commands::Lookup { address, .. } => match index.lookup(address) {
            Some(unit) => writeln!(out, "{address}: {unit}")?,
            None => writeln!(out, "{address}: no unit")?,
        },
        Commands::Main { .. } => print_main(&mut out, &index)?,
        Commands::Dump { .. } => index.dump(&mut out)?,
    }

    Ok(())
}

fn print_entry(out: &mut impl Write, entry: EntryRef<'_>) -> io::Result<()>
{
    writeln!(
        out,
        "{}\t{}\t{}\t{}\t{}",
        entry.full_name(),
        entry.tag(),
        entry.flags(),
        entry.die_offset(),
        entry.unit()
    )
}

fn print_main(out: &mut impl Write, index: &CookedIndexVector) -> io::Result<()>
{
    match index.get_main() {
        Some(entry) => print_entry(out, entry),
        None => writeln!(out, "no main entry"),
    }
}
