use async_trait::async_trait;
use chrono::Utc;
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, warn, Level};

use crate::error::{AppError, AppResult};
use crate::gateway::{GatewayResult, RosterGateway};
use crate::models::{Registrant, RegistrantId, RegistrantInput};

/// Install the global fmt subscriber at `level`, writing to stderr
///
/// Calling this again after a subscriber is installed is a no-op.
pub fn init_tracing(level: &str) -> AppResult<()> {
    let level = Level::from_str(level.trim())
        .map_err(|_| AppError::Configuration(format!("Unsupported log level: {}", level)))?;

    // Err only means a subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}

/// Gateway decorator writing one access-log line per remote call
pub struct LoggedGateway<G> {
    inner: G,
}

impl<G> LoggedGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

fn log_call<T>(operation: &str, detail: &str, result: &GatewayResult<T>, start: Instant) {
    let duration = start.elapsed();
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    match result {
        Ok(_) => info!(
            target: "gateway_log",
            "{} {} \"{}\" ok {}ms",
            timestamp,
            operation,
            detail,
            duration.as_millis()
        ),
        Err(e) => warn!(
            target: "gateway_log",
            "{} {} \"{}\" failed {}ms \"{}\"",
            timestamp,
            operation,
            detail,
            duration.as_millis(),
            e
        ),
    }
}

#[async_trait]
impl<G: RosterGateway> RosterGateway for LoggedGateway<G> {
    async fn list_all(&self) -> GatewayResult<Vec<Registrant>> {
        let start = Instant::now();
        let result = self.inner.list_all().await;
        let detail = match &result {
            Ok(rows) => format!("{} rows", rows.len()),
            Err(_) => "-".to_string(),
        };
        log_call("list_all", &detail, &result, start);
        result
    }

    async fn create(&self, candidate: &RegistrantInput) -> GatewayResult<Registrant> {
        let start = Instant::now();
        let result = self.inner.create(candidate).await;
        let detail = match &result {
            Ok(created) => format!("id={}", created.id),
            Err(_) => "-".to_string(),
        };
        log_call("create", &detail, &result, start);
        result
    }

    async fn remove(&self, id: RegistrantId) -> GatewayResult<()> {
        let start = Instant::now();
        let result = self.inner.remove(id).await;
        log_call("remove", &format!("id={}", id), &result, start);
        result
    }
}
