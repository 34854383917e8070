// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Background sweep of expired session tokens.
//!
//! The sweeper is owned by whoever starts it (normally `main`) and is
//! stopped explicitly on shutdown. It runs concurrently with request
//! handling and takes no locks: a request racing a sweep either sees its
//! row just before deletion or finds it gone, and both outcomes are fine.

use std::time::Duration;

use anyhow::bail;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::tokens::TokenStore;

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Periodically deletes expired rows from the token store.
pub struct ExpirySweeper {
    tokens: TokenStore,
    interval: Duration,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ExpirySweeper {
    pub fn new(tokens: TokenStore, interval: Duration) -> Self {
        Self {
            tokens,
            interval,
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the sweep loop. The first sweep happens one interval from now.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            bail!("expiry sweeper already running");
        }
        if self.interval.is_zero() {
            bail!("expiry sweeper interval must be non-zero");
        }

        // Fresh token so a stopped sweeper can be restarted.
        self.cancel = CancellationToken::new();

        let tokens = self.tokens.clone();
        let interval = self.interval;
        let cancel = self.cancel.clone();
        self.handle = Some(tokio::spawn(sweep_loop(tokens, interval, cancel)));

        tracing::info!(interval_secs = interval.as_secs(), "Token expiry sweeper started");
        Ok(())
    }

    /// Cancel the loop and wait (bounded) for it to finish.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        let Some(handle) = self.handle.take() else {
            bail!("expiry sweeper not running");
        };

        self.cancel.cancel();

        match tokio::time::timeout(STOP_TIMEOUT, handle).await {
            Ok(Ok(())) => {
                tracing::info!("Token expiry sweeper stopped");
                Ok(())
            }
            Ok(Err(e)) => bail!("expiry sweeper task panicked: {}", e),
            Err(_) => bail!("expiry sweeper did not stop within {:?}", STOP_TIMEOUT),
        }
    }
}

async fn sweep_loop(tokens: TokenStore, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; skip it.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match tokens.sweep_expired().await {
                    Ok(0) => tracing::debug!("Token sweep found nothing to delete"),
                    Ok(deleted) => tracing::info!(deleted, "Swept expired session tokens"),
                    Err(e) => tracing::warn!(error = %e, "Token sweep failed"),
                }
            }
        }
    }
}
