// src/main.rs
//! Burn the Boats entry point: loads configuration, installs the wallet
//! context and runs the page on stdin/stdout. Logs go to stderr.
use anyhow::Result;
use burn_the_boats::cli::Cli;
use burn_the_boats::context::{init_context, AppContext};
use burn_the_boats::core::config::AppConfig;
use burn_the_boats::shell::run_page;
use clap::Parser;
use std::io::{BufRead, Write};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log.as_deref())?;

    info!("Starting Burn the Boats v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.rpc_url {
        config.rpc_url = Some(url);
    }

    let ctx = if cli.demo {
        AppContext::demo(config)
    } else {
        AppContext::ethereum(config)?
    };
    let ctx = init_context(ctx)?;

    let lines = spawn_stdin_reader();
    let mut stdout = std::io::stdout();
    run_page(ctx, lines, |page| {
        // A closed stdout only loses the page, not the pending submission.
        let _ = writeln!(stdout, "{}", page).and_then(|_| stdout.flush());
    })
    .await?;

    Ok(())
}

fn init_logging(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Reads stdin on a plain thread so an idle terminal never holds up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}
