pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod roster;
pub mod utils;
pub mod validation;

// Re-export commonly used types for easier access
pub use cache::{CacheFactory, RosterCache};
pub use error::{AppError, AppResult};
pub use gateway::{GatewayError, GatewayFactory, RosterGateway};
pub use models::{AddResult, FailureKind, Registrant, RegistrantInput, RosterFailure};
pub use roster::{LoadOutcome, RosterManager, RosterState};
pub use validation::{validate_form, RegistrationForm, ValidationResult};
