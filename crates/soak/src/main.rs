use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use soak_client::HttpClusterClient;
use soak_core::{ClusterConfig, DirectoryTarget, SECURITY_PROPERTIES};
use soak_probe::{
    FsEndpoint, FsProbe, Probe, ProbeRunner, ReadWriteProbe, RegionMoveProbe, RunnerConfig,
    FATAL_EXIT_CODE,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Path the merged configuration is serialized to before the fs loop starts
const MERGED_CONFIG_PATH: &str = "./merged-site.yaml";

#[derive(Parser)]
#[command(
    name = "soak",
    about = "Long-running soak drivers for a secured storage cluster"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move a region of the target table to another live server every iteration
    RegionMover {
        /// Table whose first region is moved
        table: String,
        /// Seconds to sleep between iterations
        interval_secs: u64,
    },
    /// Write, read back, and scan a fixed row of the target table
    ReadWrite {
        /// Table to write to
        table: String,
        /// Seconds to sleep between iterations
        interval_secs: u64,
    },
    /// Overwrite and append fixed files on every configured filesystem
    Fs {
        /// Target directory; must end with a path separator
        directory: String,
        /// Seconds to sleep between iterations
        interval_secs: u64,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{:?}", report);
            FATAL_EXIT_CODE
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> miette::Result<i32> {
    match cli.command {
        Commands::RegionMover {
            table,
            interval_secs,
        } => run_region_mover(&table, interval_secs).await,
        Commands::ReadWrite {
            table,
            interval_secs,
        } => run_read_write(&table, interval_secs).await,
        Commands::Fs {
            directory,
            interval_secs,
        } => run_fs(&directory, interval_secs).await,
    }
}

/// Region mover: exercises client behavior while the addressed data keeps
/// changing hosts
async fn run_region_mover(table: &str, interval_secs: u64) -> miette::Result<i32> {
    warn!(
        "Starting region mover for table {} every {} seconds",
        table, interval_secs
    );

    let config = ClusterConfig::load_from_env()?;
    log_security_properties(&config);
    config.ensure_security_enabled()?;

    let client = Arc::new(HttpClusterClient::for_master(&config)?);
    let mut probe = RegionMoveProbe::new(client, table, StdRng::from_entropy());
    Ok(run_probe(&mut probe, interval_secs).await)
}

/// Read/write driver: exercises token renewal across put/get/scan traffic
async fn run_read_write(table: &str, interval_secs: u64) -> miette::Result<i32> {
    info!("Starting read/write driver for table {}", table);

    let mut config = ClusterConfig::load_from_env()?;

    // Exercise token renewal and connection re-establishment aggressively.
    // DO NOT SET VALUES THIS LOW IN PRODUCTION
    config.set_property("security.token.autorenewal.enabled", "true");
    config.set_property("security.token.min-seconds-before-relogin", "20");
    config.set_property("client.connection.min-idle-before-close-ms", "10000");

    // Confirm the overrides took
    for key in [
        "security.token.autorenewal.enabled",
        "security.token.min-seconds-before-relogin",
        "client.connection.min-idle-before-close-ms",
    ] {
        warn!("Config {} {}", key, config.get_property(key).unwrap_or(""));
    }

    config.ensure_security_enabled()?;

    let client = Arc::new(HttpClusterClient::for_master(&config)?);
    let mut probe = ReadWriteProbe::new(client, table);
    Ok(run_probe(&mut probe, interval_secs).await)
}

/// Filesystem driver: overwrite and append fixed files on every configured
/// nameservice while tokens age out
async fn run_fs(directory: &str, interval_secs: u64) -> miette::Result<i32> {
    warn!("Running for argument {}", directory);

    // Syntax check happens before any cluster contact
    let dir = DirectoryTarget::parse(directory)?;

    let mut config = ClusterConfig::load_from_env()?;

    // Pin the client to fresh connections and fast failover so expiry bugs
    // surface instead of hiding behind caches and retries
    config.set_property("client.fs.cache.enabled", "false");
    config.set_property("client.retry.max-attempts", "0");
    config.set_property("client.connect.max-retries", "1");
    config.set_property("client.connect.retry-interval-ms", "10");
    config.set_property("client.failover.sleep-max-ms", "500");
    config.set_property("security.token.autorenewal.enabled", "true");
    config.set_property("security.token.min-seconds-before-relogin", "20");

    // The merged view must not inherit a default filesystem or an internal
    // nameservice list from either source cluster
    config.remove_property("fs.default");
    config.remove_property("dfs.internal.nameservices");

    config.write_to_file(Path::new(MERGED_CONFIG_PATH))?;

    config.ensure_security_enabled()?;

    let mut endpoints = Vec::new();
    for nameservice in &config.nameservices {
        let store = Arc::new(HttpClusterClient::for_nameservice(&config, nameservice)?);
        info!(
            "Starting filesystem writing driver for directory {} on filesystem {}",
            dir, nameservice
        );
        endpoints.push(FsEndpoint::new(nameservice.clone(), store));
    }

    let mut probe = FsProbe::new(dir, endpoints);
    probe.prepare().await?;

    Ok(run_probe(&mut probe, interval_secs).await)
}

/// Log the security-relevant configuration the driver is about to run under
fn log_security_properties(config: &ClusterConfig) {
    for key in SECURITY_PROPERTIES {
        warn!("Config {} {}", key, config.get_property(key).unwrap_or(""));
    }
}

/// Run the probe loop with a ctrl-c watcher; returns the process exit code
async fn run_probe<P: Probe>(probe: &mut P, interval_secs: u64) -> i32 {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_token.cancel();
        }
    });

    let runner = ProbeRunner::new(RunnerConfig {
        interval: Duration::from_secs(interval_secs),
    });
    runner.run(probe, token).await
}
