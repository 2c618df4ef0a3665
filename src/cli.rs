use clap::Parser;
use std::path::PathBuf;

/// Burn the Boats: one-way ETH bridge to Base, in the terminal.
#[derive(Debug, Parser)]
#[command(name = "burn-the-boats", about = "One-way ticket to Base", version)]
pub struct Cli {
    /// TOML config file (falls back to CONFIG_PATH)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Chain-access endpoint, overriding the file, BRIDGE_RPC_URL and ALCHEMY_API_KEY
    #[arg(long = "rpc-url")]
    pub rpc_url: Option<String>,

    /// Run offline against an in-process wallet with a fixed balance
    #[arg(long)]
    pub demo: bool,

    /// Log filter, e.g. `debug` or `burn_the_boats=trace` (overrides RUST_LOG)
    #[arg(long)]
    pub log: Option<String>,
}
