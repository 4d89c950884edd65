//! sweeper — scheduled, scoped, auditable deletion runner.
//!
//! Non-interactive by design: the external scheduler invokes this binary on
//! a cadence, configuration comes from flags or `SWEEPER_*` environment
//! variables, logs go to stderr, and the single machine-parseable run record
//! goes to stdout.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use sweeper_core::report::{self, EXIT_SCOPE_FAILURE};
use sweeper_core::{RunConfig, Runner};

#[derive(Debug, Parser)]
#[command(name = "sweeper", about = "Scheduled bulk deletion for shared filesystems")]
struct Cli {
    /// Mount point of the (already mounted) shared filesystem.
    #[arg(long, env = "SWEEPER_MOUNT_ROOT")]
    mount_root: PathBuf,

    /// Tenant subdirectory under the mount root. Default: the whole mount.
    #[arg(long, env = "SWEEPER_TENANT")]
    tenant: Option<String>,

    /// Exclusion glob pattern matched against base names (repeatable).
    #[arg(long = "exclude", env = "SWEEPER_EXCLUDE", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Candidates per deletion batch.
    #[arg(long, env = "SWEEPER_BATCH_SIZE", default_value_t = 500)]
    batch_size: usize,

    /// Run-duration budget in seconds. Unset = unbounded.
    #[arg(long, env = "SWEEPER_MAX_DURATION_SECS")]
    max_duration_secs: Option<u64>,

    /// Log would-be deletions without touching the filesystem.
    #[arg(long, env = "SWEEPER_DRY_RUN")]
    dry_run: bool,

    /// Parallel deletion workers over disjoint top-level subtrees.
    #[arg(long, env = "SWEEPER_WORKERS", default_value_t = 1)]
    workers: usize,

    /// Error rate (errors / attempted) above which the run exits nonzero.
    #[arg(long, env = "SWEEPER_ERROR_RATE_THRESHOLD", default_value_t = 1.0)]
    error_rate_threshold: f64,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let mut config = RunConfig::new(self.mount_root)
            .with_batch_size(self.batch_size)
            .with_dry_run(self.dry_run)
            .with_workers(self.workers);
        if let Some(tenant) = self.tenant {
            config = config.with_tenant(tenant);
        }
        for pattern in self.exclude {
            config = config.with_exclude(pattern);
        }
        if let Some(secs) = self.max_duration_secs {
            config = config.with_max_duration(Duration::from_secs(secs));
        }
        config.error_rate_threshold = self.error_rate_threshold;
        config
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config();
    let threshold = config.error_rate_threshold;

    // Ctrl-C / operator abort: flip the cancellation signal, let in-flight
    // batches finish, still emit the partial record.
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("cancellation requested, stopping at next batch boundary");
            let _ = cancel_tx.send(true);
        }
    });

    let code = match Runner::new(config).run(cancel_rx).await {
        Ok(outcome) => match report::render(&outcome.summary) {
            Ok(record) => {
                println!("{record}");
                outcome.exit_code
            }
            Err(err) => {
                tracing::error!(%err, "failed to render run record");
                EXIT_SCOPE_FAILURE
            }
        },
        Err(err) => {
            tracing::error!(%err, "scope resolution failed, nothing deleted");
            EXIT_SCOPE_FAILURE
        }
    };

    std::process::exit(code);
}
