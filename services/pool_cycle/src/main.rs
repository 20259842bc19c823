use anyhow::{bail, Context, Result};
use clap::Parser;
use ethers::utils::format_ether;
use pool_cycle::{log_success, CycleConfig, CycleRunner, EthersChainClient};
use poolcycle_config::{paths, NetworkRegistry, ResolvedRun, RunSettings, TokenRegistry};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Deposit native currency into a classic pool, then withdraw it")]
struct Args {
    /// Run settings (TOML)
    #[arg(short, long, default_value = paths::SETTINGS_FILE)]
    config: PathBuf,

    /// Network registry (JSON)
    #[arg(long, default_value = paths::NETWORKS_FILE)]
    networks: PathBuf,

    /// Token registry (JSON)
    #[arg(long, default_value = paths::TOKENS_FILE)]
    tokens: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pool_cycle=info")),
        )
        .init();

    let args = Args::parse();
    info!("🚀 Starting Pool Cycle...");

    let settings = RunSettings::load(&args.config)
        .with_context(|| format!("Failed to load settings from {:?}", args.config))?;
    let networks = NetworkRegistry::from_file(&args.networks)?;
    let tokens = TokenRegistry::from_file(&args.tokens)?;
    let run = ResolvedRun::resolve(settings, &networks, &tokens)?;
    let config = CycleConfig::from_resolved(run)?;

    info!(
        "Network {}: depositing {} native, tolerance {}, authorization {:?}",
        config.network,
        format_ether(config.amount),
        config.tolerance,
        config.authorization
    );

    let client = EthersChainClient::connect(config.client.clone(), config.credential)
        .await
        .context("Failed to connect chain client")?;

    let report = CycleRunner::new(
        &client,
        &config.contracts,
        config.tolerance,
        config.authorization,
    )
    .run(config.amount)
    .await;

    if let Some((delta, gained)) = report.balance_change() {
        info!(
            "Native balance {} by {} over {:.1}s",
            if gained { "increased" } else { "decreased" },
            format_ether(delta),
            report.elapsed.as_secs_f64()
        );
    }

    if let Err(e) = &report.deposit {
        bail!("Deposit failed: {}", e);
    }
    if let Err(e) = &report.withdrawal {
        bail!("Withdrawal failed: {}", e);
    }

    log_success!("Cycle complete");
    Ok(())
}
