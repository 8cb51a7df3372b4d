//! Vanity Commit Miner CLI
//!
//! Usage:
//!   git cat-file commit HEAD | commit-vanity -p c0ffee > commit.txt
//!   git hash-object -t commit -w commit.txt    # prints c0ffee...
//!
//!   commit-vanity -p abc -i commit.txt -o vanity.txt -w 8

use std::fs;
use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commit_vanity::{Config, SearchError, SearchResult, WorkerPool};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = Config::parse();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&config) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let prefix = config.target_prefix()?;
    let content = config.read_content()?;

    let mut pool = WorkerPool::new(config.worker_count(), &content, prefix)?;

    // Startup info goes to stderr; stdout may carry the commit itself.
    eprintln!("Vanity Commit Miner");
    eprintln!("===================");
    eprintln!("Prefix:     {} ({} bits)", pool.prefix(), pool.prefix().bits());
    eprintln!("Difficulty: {}", pool.prefix().difficulty_description());
    eprintln!("Workers:    {}", pool.num_workers());
    eprintln!("Content:    {} bytes", content.len());
    eprintln!();

    // Set up ctrl-c handler
    let stop_flag = pool.stop_flag_clone();
    ctrlc::set_handler(move || {
        stop_flag.store(true, std::sync::atomic::Ordering::Relaxed);
    })?;

    eprintln!("Searching... (Press Ctrl+C to stop)\n");

    let report_interval = Duration::from_secs(config.report_interval);

    let result = loop {
        match pool.wait_for_result(report_interval) {
            Ok(Some(first)) => break pool.finish(first),
            Ok(None) => print_progress(&pool),
            Err(SearchError::Aborted) if pool.is_stopped() => {
                eprintln!("\nStopped by user.");
                process::exit(130);
            }
            Err(e) => return Err(e.into()),
        }
    };

    print_result(&result);
    write_output(config, &result)?;
    Ok(())
}

fn print_result(result: &SearchResult) {
    eprintln!("=== Match ===");
    eprintln!("Commit:      {}", result.digest_hex());
    eprintln!("Nonce:       {}", String::from_utf8_lossy(result.nonce()));
    eprintln!("Counter:     {}", result.counter);
    eprintln!("Worker:      {}", result.worker_id);
    eprintln!();
}

fn write_output(config: &Config, result: &SearchResult) -> io::Result<()> {
    let bytes = if config.raw {
        &result.buffer[..]
    } else {
        result.body()
    };

    match &config.output {
        Some(path) => {
            fs::write(path, bytes)?;
            eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
            Ok(())
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
    }
}

fn print_progress(pool: &WorkerPool) {
    let hashes = pool.total_hashes();
    let rate = pool.hashes_per_second();
    let elapsed = pool.elapsed().as_secs();

    eprintln!(
        "[{:>4}s] Tried {} hashes ({}/s)",
        elapsed,
        format_number(hashes),
        format_number(rate as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
