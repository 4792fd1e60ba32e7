use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rget_fetch::{AttemptRecord, Completion, Progress, ReqwestClient, ResumeClient};
use tracing_subscriber::EnvFilter;

mod args;
mod config;

use args::Args;
use config::FileConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let file = FileConfig::load(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;

    let mut options = config::resume_options(&args, &file);
    init_tracing(options.debug);

    if let Some(path) = &args.stats {
        options = options.on_attempt(stats_sink(path)?);
    }
    options = options.on_progress(Arc::new(|progress: &Progress| {
        tracing::info!(
            persisted = progress.bytes_persisted,
            total = ?progress.total_bytes,
            attempt = progress.attempt,
            "{}",
            progress
                .percentage()
                .map(|p| format!("{p:.1}%"))
                .unwrap_or_else(|| "in progress".into())
        );
    }));

    let transport = ReqwestClient::with_timeouts(file.connect_timeout(), file.read_timeout())
        .context("failed to build HTTP client")?;
    let client = ResumeClient::new(transport);

    match client.download_resume(&args.method, &args.url, options).await {
        Ok(Completion::Finalized { path, bytes } | Completion::WholeFile { path, bytes }) => {
            println!("{} ({bytes} bytes)", path.display());
            Ok(())
        }
        Ok(Completion::Redirected { status, location }) => bail!(
            "server answered {status} with a redirect to {}",
            location.as_deref().unwrap_or("<no location>")
        ),
        Err(e) if e.is_resumable() => Err(anyhow::Error::new(e)
            .context("download interrupted; run the same command again to resume")),
        Err(e) => Err(e.into()),
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "info,rget::stats=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Appends one JSON object per attempt to `path`.
fn stats_sink(path: &Path) -> Result<Arc<dyn Fn(&AttemptRecord) + Send + Sync>> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open stats file {}", path.display()))?;
    let file = Mutex::new(file);

    Ok(Arc::new(move |record: &AttemptRecord| {
        let Ok(mut file) = file.lock() else { return };
        let written = serde_json::to_writer(&mut *file, record)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(file));
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write stats record");
        }
    }))
}
