//! Run the remote call once and print the outcome.
//!
//! Environment:
//! - `RUST_LOG` - log filter (default `info`)
//! - `RETRYKIT_CONFIG` - path to a TOML retry policy
//! - `RETRYKIT_MAX_ATTEMPTS`, `RETRYKIT_DELAY_MS`, `RETRYKIT_MULTIPLIER`,
//!   `RETRYKIT_MAX_DELAY_MS`, `RETRYKIT_JITTER` - policy overrides

use anyhow::Context;
use retrykit::{RemoteErrorKind, RetryService};
use retrykit_core::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const ENV_PREFIX: &str = "RETRYKIT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config: RetryPolicyConfig<RemoteErrorKind> = match std::env::var("RETRYKIT_CONFIG") {
        Ok(path) => RetryPolicyConfig::from_file(&path)
            .with_context(|| format!("loading retry policy from {path}"))?,
        Err(_) => RetryPolicyConfig::from(&RetryService::default_policy()?),
    };
    let policy = config.apply_env(ENV_PREFIX)?.into_policy()?;

    let executor = RetryExecutor::<RemoteErrorKind>::builder()
        .listener(Arc::new(TracingListener))
        .build();
    let service = RetryService::with_parts(policy, executor);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, cancelling");
                cancel.cancel();
            }
        }
    });

    let result = service.call_cancellable(&cancel).await?;
    println!("{result}");
    Ok(())
}
