//! pulse — control-plane etcd health and consistency checker.
//!
//! Single-shot diagnostic: checks that the etcd cluster backing a
//! Kubernetes control plane is healthy and that its membership matches
//! the control-plane node inventory reported by the API server. Exits
//! non-zero with the first detected inconsistency.
//!
//! ```text
//! pulse check-etcd --endpoint https://127.0.0.1:2379
//! ```

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pulse",
    about = "Control-plane etcd health and consistency checker",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check etcd cluster health and cross-check its members against
    /// the Kubernetes control-plane nodes.
    CheckEtcd(commands::check::CheckArgs),
    /// Print the pulse version.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulse=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CheckEtcd(args) => commands::check::run(args).await,
        Commands::Version => {
            println!("pulse {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
