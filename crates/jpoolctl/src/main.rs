// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Journal reader pool administration CLI.
//!
//! # Usage
//!
//! ```bash
//! # Acquire and immediately release a reader (smoke test the open path)
//! jpoolctl --base /var/lib/journals reader trades
//!
//! # Drain a journal's slots ahead of an out-of-band maintenance operation
//! jpoolctl --base /var/lib/journals lock trades
//! jpoolctl --base /var/lib/journals unlock trades
//!
//! # Report per-name capacity
//! jpoolctl --base /var/lib/journals max-entries
//! ```
//!
//! Each invocation builds a fresh, process-local pool over `--base`; there
//! is no daemon holding pool state across calls. `lock`/`unlock` are
//! therefore only useful paired within a single invocation chain or against
//! a long-running embedder's pool via the library directly -- this binary
//! is an operational smoke-test tool, not a client to a shared server.

use clap::{Parser, Subcommand};
use journal_pool::{FsJournalConfig, MmapJournalReader, PoolError, ReaderPool};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "jpoolctl")]
#[command(about = "Journal reader pool administration CLI")]
#[command(version)]
struct Args {
    /// Root directory containing one subdirectory per journal.
    #[arg(short, long, default_value = ".")]
    base: PathBuf,

    /// Segment chain cap per journal name (capacity = max_segments * 32).
    #[arg(long, default_value_t = 4)]
    max_segments: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Acquire a reader for `name`, then release it.
    Reader { name: String },

    /// Drain every slot for `name` so on-disk files can be safely mutated.
    Lock { name: String },

    /// Release a lock previously taken by this same process.
    Unlock { name: String },

    /// Print the per-name slot capacity (max_segments * 32).
    MaxEntries,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = FsJournalConfig::new(&args.base);
    let pool = ReaderPool::<MmapJournalReader, FsJournalConfig>::new(config, args.max_segments);

    let result = match &args.command {
        Commands::Reader { name } => cmd_reader(&pool, name),
        Commands::Lock { name } => pool.lock(name),
        Commands::Unlock { name } => {
            pool.unlock(name);
            Ok(())
        }
        Commands::MaxEntries => {
            println!("{}", pool.max_entries());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("jpoolctl: {e}");
            exit_code_for(&e)
        }
    }
}

fn cmd_reader(
    pool: &ReaderPool<MmapJournalReader, FsJournalConfig>,
    name: &str,
) -> Result<(), PoolError> {
    let handle = pool.reader(name)?;
    println!("acquired {name}");
    handle.close()
}

fn exit_code_for(err: &PoolError) -> ExitCode {
    match err {
        PoolError::Locked(_) | PoolError::Retry(_) => ExitCode::from(2),
        PoolError::NotFound(_) => ExitCode::from(3),
        PoolError::PoolFull(_) => ExitCode::from(4),
        PoolError::PoolClosed | PoolError::OpenFailed(_, _) => ExitCode::FAILURE,
    }
}
