//! Roster state manager
//!
//! Owns the in-memory roster and keeps a durable cache mirror of it.
//!
//! # Lifecycle
//! `Uninitialized -> Loading -> Ready`, or `Loading -> Degraded` when the
//! remote list call fails. A degraded manager serves the cached roster (or an
//! empty one) and still accepts adds and removes.
//!
//! # Invariants
//! - Emails are unique across the roster, compared case-insensitively.
//! - The roster only changes after the gateway confirmed the change.
//! - Each mirror overwrites the whole cache slot with the whole roster.
//! - A failed add or remove leaves roster and cache untouched.
//!
//! Methods take `&mut self`, so at most one load, add or remove is in flight
//! per manager.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::{read_roster, write_roster, RosterCache, DEFAULT_SLOT};
use crate::gateway::{GatewayError, RosterGateway, EMAIL_TAKEN};
use crate::models::{
    AddResult, FailureKind, Registrant, RegistrantId, RegistrantInput, RosterFailure,
};
use crate::utils::emails_match;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterState {
    Uninitialized,
    Loading,
    Ready,
    Degraded,
}

impl fmt::Display for RosterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RosterState::Uninitialized => "uninitialized",
            RosterState::Loading => "loading",
            RosterState::Ready => "ready",
            RosterState::Degraded => "degraded",
        };
        f.write_str(name)
    }
}

/// How a load ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Roster replaced by the remote list and mirrored
    Synced { count: usize },
    /// Remote list failed; roster comes from the cache (possibly empty)
    Degraded {
        count: usize,
        from_cache: bool,
        failure: RosterFailure,
    },
}

impl LoadOutcome {
    pub fn count(&self) -> usize {
        match self {
            LoadOutcome::Synced { count } | LoadOutcome::Degraded { count, .. } => *count,
        }
    }
}

fn to_failure(err: &GatewayError) -> RosterFailure {
    RosterFailure {
        message: err.user_message(),
        kind: err.kind(),
    }
}

pub struct RosterManager {
    gateway: Arc<dyn RosterGateway>,
    cache: Arc<dyn RosterCache>,
    slot: String,
    registrants: Vec<Registrant>,
    state: RosterState,
    sync_error: Option<GatewayError>,
}

impl RosterManager {
    /// An empty, not yet loaded roster mirrored into the default slot
    pub fn new(gateway: Arc<dyn RosterGateway>, cache: Arc<dyn RosterCache>) -> Self {
        Self {
            gateway,
            cache,
            slot: DEFAULT_SLOT.to_string(),
            registrants: Vec::new(),
            state: RosterState::Uninitialized,
            sync_error: None,
        }
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = slot.into();
        self
    }

    pub fn state(&self) -> RosterState {
        self.state
    }

    pub fn is_degraded(&self) -> bool {
        self.state == RosterState::Degraded
    }

    /// The list failure that put the manager into `Degraded`
    pub fn sync_error(&self) -> Option<&GatewayError> {
        self.sync_error.as_ref()
    }

    /// Registrants in insertion order
    pub fn registrants(&self) -> &[Registrant] {
        &self.registrants
    }

    pub fn count(&self) -> usize {
        self.registrants.len()
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Registrant> {
        self.registrants
            .iter()
            .find(|r| emails_match(&r.email, email))
    }

    /// Load the roster, remote first, cache as fallback
    pub async fn load(&mut self) -> LoadOutcome {
        self.state = RosterState::Loading;
        debug!(slot = %self.slot, "loading roster");

        match self.gateway.list_all().await {
            Ok(registrants) => {
                self.registrants = registrants;
                self.sync_error = None;
                self.mirror();
                self.state = RosterState::Ready;
                info!(count = self.registrants.len(), "roster synced from remote");
                LoadOutcome::Synced {
                    count: self.registrants.len(),
                }
            }
            Err(err) => {
                let cached = read_roster(self.cache.as_ref(), &self.slot);
                let from_cache = cached.is_some();
                self.registrants = cached.unwrap_or_default();
                self.state = RosterState::Degraded;
                warn!(
                    error = %err,
                    from_cache,
                    count = self.registrants.len(),
                    "remote roster unavailable, running degraded"
                );

                let failure = to_failure(&err);
                self.sync_error = Some(err);
                LoadOutcome::Degraded {
                    count: self.registrants.len(),
                    from_cache,
                    failure,
                }
            }
        }
    }

    /// Register a candidate that already passed the form validator
    ///
    /// A manager that was never loaded loads first, so the uniqueness check
    /// and the cache mirror start from the remote or cached roster.
    pub async fn add(&mut self, input: &RegistrantInput) -> AddResult {
        if self.state == RosterState::Uninitialized {
            debug!("add before load, loading roster first");
            self.load().await;
        }

        if self.find_by_email(&input.email).is_some() {
            debug!("rejecting add: email already in roster");
            return AddResult::Rejected {
                error: EMAIL_TAKEN.to_string(),
                kind: FailureKind::Business,
            };
        }

        match self.gateway.create(input).await {
            Ok(registrant) => {
                info!(id = registrant.id, "registrant created");
                self.registrants.push(registrant.clone());
                self.mirror();
                AddResult::Added(registrant)
            }
            Err(err) => {
                warn!(error = %err, "create rejected");
                AddResult::Rejected {
                    error: err.user_message(),
                    kind: err.kind(),
                }
            }
        }
    }

    /// Delete a registrant remotely, then locally
    pub async fn remove(&mut self, id: RegistrantId) -> Result<(), RosterFailure> {
        if let Err(err) = self.gateway.remove(id).await {
            warn!(id, error = %err, "remove failed");
            return Err(RosterFailure {
                message: err.user_message(),
                kind: FailureKind::Server,
            });
        }

        let before = self.registrants.len();
        self.registrants.retain(|r| r.id != id);
        if self.registrants.len() != before {
            self.mirror();
            info!(id, "registrant removed");
        }
        Ok(())
    }

    /// Overwrite the cache slot with the current roster
    ///
    /// The remote already holds the change, so a cache failure is logged and
    /// the in-memory roster stays authoritative for this session.
    fn mirror(&self) {
        if let Err(e) = write_roster(self.cache.as_ref(), &self.slot, &self.registrants) {
            warn!(slot = %self.slot, error = %e, "failed to mirror roster to cache");
        }
    }
}
