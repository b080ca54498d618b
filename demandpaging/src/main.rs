mod report;
mod search_file;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{error, info};

use search_file::SearchFile;
use vm::{config, Config, FallbackPolicy, Simulation};

/// Simulates demand paging for processes running binary searches.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Workload description: `n m`, then each array size followed by its keys.
    #[arg(default_value = "search.txt")]
    input: PathBuf,

    /// Bytes per page.
    #[arg(long, default_value_t = config::DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Frames available to user processes (at most 16384).
    #[arg(long, default_value_t = config::DEFAULT_USER_FRAMES)]
    frames: usize,

    /// Entries in every process page table.
    #[arg(long, default_value_t = config::DEFAULT_PAGE_TABLE_ENTRIES)]
    page_table_entries: usize,

    /// Leading pages of every process that are never evicted.
    #[arg(long, default_value_t = config::DEFAULT_ESSENTIAL_PAGES)]
    essential_pages: usize,

    /// Free-frame count at or below which faults evict a page.
    #[arg(long, default_value_t = config::DEFAULT_NFF_MIN)]
    nff_min: usize,

    /// Seed of the last-resort frame pick.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Take the most recently freed frame as the last resort instead of a
    /// random one.
    #[arg(long)]
    most_recent: bool,

    /// Trace every search and page fault.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let fallback = if self.most_recent {
            FallbackPolicy::MostRecent
        } else {
            FallbackPolicy::Random { seed: self.seed }
        };

        Config {
            page_size: self.page_size,
            user_frames: self.frames,
            page_table_entries: self.page_table_entries,
            essential_pages: self.essential_pages,
            nff_min: self.nff_min,
            fallback,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let workload = SearchFile::from_file(&cli.input)?;
    info!(
        "{} processes, {} searches each",
        workload.processes.len(),
        workload.searches_per_process
    );

    let mut sim = Simulation::new(cli.config()).context("cannot build the machine")?;

    for process in workload.processes {
        sim.spawn(process.array_size, process.keys)
            .context("cannot start process")?;
    }

    let report = sim.run_to_completion().context("simulation aborted")?;

    print!("{}", report::render(&report));

    Ok(())
}
