//! utxo-gateway CLI
//!
//! Runs the gateway handlers once from the command line and prints the JSON
//! response envelope.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use rand::RngCore;
use std::path::PathBuf;
use zeroize::Zeroizing;

use utxo_gateway::{
    config::GatewayConfig, exchange::Exchange, handlers, utils::logging, wallet::MAX_ADDRESS_BATCH,
    CoinType, GenerateAddressesRequest, GetOutputRequest, GetUtxoRequest,
};

#[derive(Parser)]
#[command(name = "utxo-gateway")]
#[command(about = "UTXO backend gateway for exchange servers")]
#[command(version)]
struct Cli {
    /// Path to configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List unspent outputs of one or more addresses
    Utxos {
        coin: CoinType,

        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Look up a single output by hash
    Output { coin: CoinType, hash: String },

    /// Derive deposit addresses from a seed
    Addresses {
        coin: CoinType,

        /// Hex seed; a random 32-byte seed is used when omitted
        #[arg(long)]
        seed: Option<String>,

        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Validate configuration file
    ValidateConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level)?;

    let mut config = match &cli.config {
        Some(path) => match GatewayConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                if matches!(cli.command, Commands::ValidateConfig) {
                    eprintln!("Configuration validation failed: {}", e);
                    std::process::exit(1);
                }
                anyhow::bail!("Failed to load config from {:?}: {}", path, e);
            }
        },
        None => GatewayConfig::default(),
    };
    config.apply_env_overrides();

    let reply = match cli.command {
        Commands::ValidateConfig => return validate_config(&config),
        Commands::Utxos { coin, addresses } => handlers::get_utxos(
            &Exchange::from_config(&config)?,
            &GetUtxoRequest {
                coin_type: coin,
                addresses,
            },
        )
        .to_json(),
        Commands::Output { coin, hash } => handlers::get_output(
            &Exchange::from_config(&config)?,
            &GetOutputRequest { coin_type: coin, hash },
        )
        .to_json(),
        Commands::Addresses { coin, seed, count } => {
            let request = GenerateAddressesRequest {
                coin_type: coin,
                seed: seed.unwrap_or_else(random_seed_hex),
                count,
            };
            handlers::generate_addresses(&Exchange::from_config(&config)?, &request).to_json()
        }
    };

    println!("{}", reply);
    Ok(())
}

fn random_seed_hex() -> String {
    let mut seed = Zeroizing::new([0u8; 32]);
    OsRng.fill_bytes(&mut seed[..]);
    hex::encode(&seed[..])
}

fn validate_config(config: &GatewayConfig) -> Result<()> {
    config.validate()?;
    println!("Configuration is valid.");
    match &config.skycoin {
        Some(sky) => println!("  skycoin: {}", sky.node_addr),
        None => println!("  skycoin: disabled"),
    }
    match &config.bitcoin {
        Some(btc) => println!("  bitcoin: {} ({})", btc.node_addr, btc.network),
        None => println!("  bitcoin: disabled"),
    }
    println!("  hide_secret_key: {}", config.hide_secret_key);
    println!(
        "  timeouts: request {}s, connect {}s",
        config.request_timeout_secs, config.connect_timeout_secs
    );
    println!("  max address batch: {}", MAX_ADDRESS_BATCH);
    Ok(())
}
