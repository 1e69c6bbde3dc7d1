//! framecheck binary.
//!
//! Runs the full in-process pipeline: a producer task emitting the
//! canonical record stream with adversarial write splits, and a consumer
//! task framing and verifying every line, optionally cross-checked against
//! a parallel reference stream.
//!
//! ## Configuration
//! All configuration is done via environment variables:
//! - `FRAMECHECK_CHUNK_SIZE`: bytes pulled per fill (default: 65536)
//! - `FRAMECHECK_BATCH_SIZE`: records per backpressure pause (default: 100)
//! - `FRAMECHECK_IO_DELAY_MS`: pause duration in ms (default: 15)
//! - `FRAMECHECK_STRATEGY`: `single-read` | `fill-until-full`
//! - `FRAMECHECK_MAX_ROWS`: rows to produce (default: 1000000000)
//! - `FRAMECHECK_CROSS_CHECK`: enable the reference oracle (any value)
//!
//! ## Logging
//! Controlled via `RUST_LOG` (default `info`).
//!
//! On any fatal divergence the process logs the diagnostic and exits
//! non-zero; there are no retry semantics by design.

use std::str::FromStr;
use std::time::Duration;

use framecheck_core::{ReadOptions, ReadStrategy};
use framecheck_pipeline::Pipeline;
use tokio::sync::watch;
use tracing::{error, info};

fn env_parse<T: FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|err| anyhow::anyhow!("invalid {key}: {err}")),
        Err(_) => Ok(default),
    }
}

fn options_from_env() -> anyhow::Result<ReadOptions> {
    let defaults = ReadOptions::default();
    Ok(ReadOptions {
        chunk_size: env_parse("FRAMECHECK_CHUNK_SIZE", defaults.chunk_size)?,
        batch_size: env_parse("FRAMECHECK_BATCH_SIZE", defaults.batch_size)?,
        io_delay: Duration::from_millis(env_parse(
            "FRAMECHECK_IO_DELAY_MS",
            defaults.io_delay.as_millis() as u64,
        )?),
        strategy: env_parse("FRAMECHECK_STRATEGY", defaults.strategy)?,
        max_rows: env_parse("FRAMECHECK_MAX_ROWS", defaults.max_rows)?,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = options_from_env()?;
    let cross_check = std::env::var("FRAMECHECK_CROSS_CHECK").is_ok();
    info!(
        chunk_size = options.chunk_size,
        batch_size = options.batch_size,
        io_delay_ms = options.io_delay.as_millis() as u64,
        strategy = %options.strategy,
        max_rows = options.max_rows,
        cross_check,
        "starting pipeline"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("shutdown requested, unwinding tasks");
        let _ = shutdown_tx.send(true);
    });

    let pipeline = Pipeline::builder()
        .options(options)
        .cross_check(cross_check)
        .build()?;

    match pipeline.run_in_process(shutdown_rx).await {
        Ok(summary) => {
            info!(
                rows = summary.rows,
                bytes_consumed = summary.bytes_consumed,
                "pipeline completed"
            );
            Ok(())
        }
        Err(err) => {
            error!(%err, "pipeline failed, stopping process");
            Err(err.into())
        }
    }
}
