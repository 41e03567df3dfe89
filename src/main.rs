use std::io::{stderr, stdout, BufWriter, Write};
use std::process::exit;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use pocketbank::engine::BankEngine;
use pocketbank::storage::DeviceStore;

const STORE_ENV: &str = "POCKETBANK_STORE";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: pocketbank [session].csv [log_level:optional]");
        eprintln!("Set {STORE_ENV} to a file path to persist accounts between runs.");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let path = &args[1];
    let log_level = args
        .get(2)
        .map(|raw| {
            raw.parse().unwrap_or_else(|_| {
                eprintln!("Invalid log level '{raw}', defaulting to 'error'");
                LevelFilter::ERROR
            })
        })
        .unwrap_or(LevelFilter::ERROR);

    setup_logging(log_level);

    let store = match std::env::var(STORE_ENV) {
        Ok(store_path) => Arc::new(DeviceStore::open(store_path)?),
        Err(_) => Arc::new(DeviceStore::in_memory()),
    };
    let engine = BankEngine::new(store);

    engine.replay(path).await?;

    info!("Replayed session from {path}");

    write_summary_to_stdout(&engine)?;

    Ok(())
}

fn setup_logging(level: LevelFilter) {
    // Account summaries go to stdout, so logging stays on stderr.
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn write_summary_to_stdout(engine: &BankEngine<DeviceStore>) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    writeln!(output, "user,balance,transactions,notifications")?;

    let mut users = engine.store().users();
    users.sort();

    for user in users {
        writeln!(
            output,
            "{},{},{},{}",
            user,
            engine.balance(user)?,
            engine.history(user)?.len(),
            engine.notifications(user)?.len()
        )?;
    }

    output.flush()?;

    Ok(())
}
