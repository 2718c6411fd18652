//! anyone-staking CLI: positions, unwrap, tokens, details.

use anyone_staking::chain::{JsonRpcProvider, MetadataCache};
use anyone_staking::config::AdapterConfig;
use anyone_staking::staking::TracingObserver;
use anyone_staking::StakingAdapter;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let adapter = build_adapter(&cli.global)?;
    match cli.command {
        Command::Positions(args) => run_positions(&adapter, args),
        Command::Unwrap(args) => run_unwrap(&adapter, args),
        Command::Tokens => run_tokens(&adapter),
        Command::Details => run_details(&adapter),
    }
}

#[derive(Parser)]
#[command(name = "anyone-staking")]
#[command(author = "gorusys <goru.connector@outlook.com>")]
#[command(about = "Read-only Anyone Protocol staking positions (Hodler stakes per operator)")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
struct GlobalArgs {
    /// JSON config file; defaults to the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured JSON-RPC endpoint.
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    /// Directory for the token metadata cache; no cache when omitted.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List staked positions (one per operator) for an address.
    Positions(PositionsArgs),
    /// Show the exchange rate from a protocol token to its underlying token.
    Unwrap(UnwrapArgs),
    /// List protocol tokens.
    Tokens,
    /// Show protocol details.
    Details,
}

#[derive(Parser)]
struct PositionsArgs {
    #[arg(long)]
    address: String,
}

#[derive(Parser)]
struct UnwrapArgs {
    #[arg(long)]
    token: String,
}

fn cache_path(cache_dir: &std::path::Path) -> PathBuf {
    cache_dir.join("metadata.sqlite")
}

fn build_adapter(
    args: &GlobalArgs,
) -> Result<StakingAdapter<JsonRpcProvider>, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => AdapterConfig::load_from_path(path)?,
        None => AdapterConfig::load(),
    };
    if let Some(url) = &args.rpc_url {
        config.rpc_url = url.clone();
    }
    let provider = JsonRpcProvider::new(config.rpc_config()?)?;
    let mut adapter = StakingAdapter::new(provider, config.chain()?)?
        .with_observer(Arc::new(TracingObserver));
    if let Some(dir) = &args.cache_dir {
        adapter = adapter.with_cache(MetadataCache::open(cache_path(dir))?);
    }
    Ok(adapter)
}

fn run_positions(
    adapter: &StakingAdapter<JsonRpcProvider>,
    args: PositionsArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let positions = rt.block_on(async { adapter.get_positions(&args.address).await })?;
    info!(
        count = positions.len(),
        requests = adapter.query().request_count(),
        "positions complete"
    );
    println!("{}", serde_json::to_string_pretty(&positions)?);
    Ok(())
}

fn run_unwrap(
    adapter: &StakingAdapter<JsonRpcProvider>,
    args: UnwrapArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let rate = adapter.unwrap(&args.token)?;
    println!("{}", serde_json::to_string_pretty(&rate)?);
    Ok(())
}

fn run_tokens(adapter: &StakingAdapter<JsonRpcProvider>) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{}",
        serde_json::to_string_pretty(&adapter.list_protocol_tokens())?
    );
    Ok(())
}

fn run_details(adapter: &StakingAdapter<JsonRpcProvider>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&adapter.protocol_details())?);
    Ok(())
}
