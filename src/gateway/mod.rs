use crate::config::{GatewayConfig, GatewayType};
use crate::error::{AppError, AppResult};
use crate::logging::LoggedGateway;
use crate::models::{FailureKind, Registrant, RegistrantId, RegistrantInput};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub mod memory;
pub mod sqlite;
pub mod wire;

pub use memory::{Fault, MemoryGateway};
pub use sqlite::SqliteGateway;

/// Shown for every operational failure; invites the user to retry
pub const SERVER_UNAVAILABLE: &str =
    "Le serveur est temporairement indisponible. Veuillez réessayer plus tard.";
/// Fallback when the remote rejects a request without a message
pub const INVALID_PAYLOAD: &str = "Les données envoyées sont invalides.";
/// Server-side uniqueness rejection
pub const EMAIL_TAKEN: &str = "Cet email est déjà utilisé par un autre inscrit";

/// Typed failure of a remote roster call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The remote understood the request and rejected its content
    Business(String),
    /// The remote failed while handling the request
    Server { status: Option<u16>, message: String },
    /// No response reached us
    Transport(String),
}

impl GatewayError {
    /// Classifies an HTTP-style status the way the roster API reports errors
    ///
    /// 4xx responses are business rejections carrying the server message,
    /// 5xx responses are server faults. Anything else is unexpected and treated
    /// as a transport problem.
    pub fn from_status(status: u16, server_message: Option<&str>) -> Self {
        match status {
            400..=499 => GatewayError::Business(
                server_message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or(INVALID_PAYLOAD)
                    .to_string(),
            ),
            500..=599 => GatewayError::Server {
                status: Some(status),
                message: server_message.unwrap_or("server error").to_string(),
            },
            _ => GatewayError::Transport(format!("unexpected status {}", status)),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        GatewayError::Server {
            status: None,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::Transport(message.into())
    }

    /// Business failures route to the email field; everything else to the form
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Business(_) => FailureKind::Business,
            GatewayError::Server { .. } | GatewayError::Transport(_) => FailureKind::Server,
        }
    }

    /// Message safe to show to the person filling the form
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Business(message) => message.clone(),
            GatewayError::Server { .. } | GatewayError::Transport(_) => {
                SERVER_UNAVAILABLE.to_string()
            }
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Business(m) => write!(f, "Business error: {}", m),
            GatewayError::Server {
                status: Some(status),
                message,
            } => write!(f, "Server error ({}): {}", status, message),
            GatewayError::Server {
                status: None,
                message,
            } => write!(f, "Server error: {}", message),
            GatewayError::Transport(m) => write!(f, "Transport error: {}", m),
        }
    }
}

impl std::error::Error for GatewayError {}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Remote roster operations consumed by the roster manager
///
/// Implementations own their request timeouts. Server-side uniqueness
/// checking is allowed but callers must not rely on it being absent or
/// present.
#[async_trait]
pub trait RosterGateway: Send + Sync {
    /// Fetch every registrant known to the authoritative store
    async fn list_all(&self) -> GatewayResult<Vec<Registrant>>;

    /// Create one registrant; id and timestamp are assigned by the store
    async fn create(&self, candidate: &RegistrantInput) -> GatewayResult<Registrant>;

    /// Delete one registrant by id
    async fn remove(&self, id: RegistrantId) -> GatewayResult<()>;
}

/// Factory for creating gateway instances
pub struct GatewayFactory;

impl GatewayFactory {
    /// Create the configured gateway, wrapped with call logging
    pub async fn create(config: &GatewayConfig) -> AppResult<Arc<dyn RosterGateway>> {
        let gateway: Arc<dyn RosterGateway> = match config.gateway_type {
            GatewayType::Memory => Arc::new(LoggedGateway::new(MemoryGateway::new())),
            GatewayType::Sqlite => {
                let url = config.url.as_deref().ok_or_else(|| {
                    AppError::Configuration(
                        "gateway.url is required when gateway type is 'sqlite'".to_string(),
                    )
                })?;
                let gateway = SqliteGateway::connect(url, config.max_connections).await?;
                Arc::new(LoggedGateway::new(gateway))
            }
        };
        Ok(gateway)
    }
}
