use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::wire::{
    into_created_registrant, into_registrant, to_create_request, CreateUserRequest, RemoteUser,
};
use super::{GatewayError, GatewayResult, RosterGateway, EMAIL_TAKEN};
use crate::models::{Registrant, RegistrantId, RegistrantInput};
use crate::utils::emails_match;

/// A failure the next remote call should report instead of running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Respond with this HTTP status and optional message
    Status(u16, Option<String>),
    /// Drop the request without a response
    Transport,
}

impl Fault {
    fn into_error(self) -> GatewayError {
        match self {
            Fault::Status(status, message) => GatewayError::from_status(status, message.as_deref()),
            Fault::Transport => GatewayError::transport("no response from roster API"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list_all: usize,
    pub create: usize,
    pub remove: usize,
}

/// A remote row plus the creation time the store assigned it
#[derive(Clone)]
struct StoredUser {
    row: RemoteUser,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<StoredUser>,
    next_id: RegistrantId,
    faults: VecDeque<Fault>,
    offline: bool,
    calls: CallCounts,
}

/// In-process authoritative roster store speaking the remote wire shape
///
/// Requests and responses pass through JSON so the wire mapping is exercised
/// exactly as against a real API. Email uniqueness is enforced server-side.
/// Faults can be queued to simulate 4xx/5xx responses and lost connectivity.
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id: 1,
                ..MemoryState::default()
            }),
        }
    }

    /// Start with existing remote rows; new ids continue after the largest one
    ///
    /// Seeded rows are stamped as created now.
    pub fn with_users(users: Vec<RemoteUser>) -> Self {
        let next_id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let created_at = Utc::now();
        let users = users
            .into_iter()
            .map(|row| StoredUser { row, created_at })
            .collect();
        Self {
            state: Mutex::new(MemoryState {
                users,
                next_id,
                ..MemoryState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a fault for the next call, whatever its operation
    pub fn fail_next(&self, fault: Fault) {
        self.lock().faults.push_back(fault);
    }

    /// While offline every call fails with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    pub fn remote_users(&self) -> Vec<RemoteUser> {
        self.lock().users.iter().map(|u| u.row.clone()).collect()
    }

    fn begin_call(&self, state: &mut MemoryState) -> GatewayResult<()> {
        if state.offline {
            return Err(GatewayError::transport("roster API unreachable"));
        }
        match state.faults.pop_front() {
            Some(fault) => Err(fault.into_error()),
            None => Ok(()),
        }
    }
}

/// Round-trips a value through JSON the way it would cross the network
fn over_the_wire<T, U>(value: &T) -> GatewayResult<U>
where
    T: Serialize,
    U: DeserializeOwned,
{
    let body = serde_json::to_value(value)
        .map_err(|e| GatewayError::transport(format!("failed to encode request: {}", e)))?;
    serde_json::from_value(body)
        .map_err(|e| GatewayError::server(format!("malformed response: {}", e)))
}

#[async_trait]
impl RosterGateway for MemoryGateway {
    async fn list_all(&self) -> GatewayResult<Vec<Registrant>> {
        let mut state = self.lock();
        state.calls.list_all += 1;
        self.begin_call(&mut state)?;

        let registrants = state
            .users
            .iter()
            .map(|stored| -> GatewayResult<Registrant> {
                let row: RemoteUser = over_the_wire(&stored.row)?;
                Ok(into_registrant(row, stored.created_at))
            })
            .collect();
        registrants
    }

    async fn create(&self, candidate: &RegistrantInput) -> GatewayResult<Registrant> {
        let mut state = self.lock();
        state.calls.create += 1;
        self.begin_call(&mut state)?;

        let request: CreateUserRequest = over_the_wire(&to_create_request(candidate))?;
        if state
            .users
            .iter()
            .any(|u| emails_match(&u.row.email, &request.email))
        {
            return Err(GatewayError::from_status(400, Some(EMAIL_TAKEN)));
        }

        let row = RemoteUser {
            id: state.next_id,
            name: request.name,
            email: request.email,
            address: Some(request.address),
        };
        let created_at = Utc::now();
        state.next_id += 1;
        state.users.push(StoredUser {
            row: row.clone(),
            created_at,
        });

        let response: RemoteUser = over_the_wire(&row)?;
        Ok(into_created_registrant(response, candidate, created_at))
    }

    async fn remove(&self, id: RegistrantId) -> GatewayResult<()> {
        let mut state = self.lock();
        state.calls.remove += 1;
        self.begin_call(&mut state)?;

        // Deleting an unknown id succeeds, as the remote API does
        state.users.retain(|u| u.row.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::wire::RemoteAddress;
    use chrono::NaiveDate;

    fn candidate(email: &str) -> RegistrantInput {
        RegistrantInput {
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            email: email.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 3, 20).unwrap(),
            city: "Paris".to_string(),
            postal_code: "75001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let gateway = MemoryGateway::new();
        let first = gateway.create(&candidate("a@example.com")).await.unwrap();
        let second = gateway.create(&candidate("b@example.com")).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(gateway.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_seeded_rows_continue_ids() {
        let gateway = MemoryGateway::with_users(vec![RemoteUser {
            id: 10,
            name: "Leanne Graham".to_string(),
            email: "leanne@example.com".to_string(),
            address: Some(RemoteAddress {
                city: "Gwenborough".to_string(),
                zipcode: "92998".to_string(),
            }),
        }]);
        let created = gateway.create(&candidate("new@example.com")).await.unwrap();
        assert_eq!(created.id, 11);
    }

    #[tokio::test]
    async fn test_server_side_uniqueness_is_case_insensitive() {
        let gateway = MemoryGateway::new();
        gateway.create(&candidate("jean@x.com")).await.unwrap();
        let err = gateway.create(&candidate("Jean@X.com")).await.unwrap_err();
        assert_eq!(err, GatewayError::Business(EMAIL_TAKEN.to_string()));
        assert_eq!(gateway.remote_users().len(), 1);
    }

    #[tokio::test]
    async fn test_queued_faults_apply_once() {
        let gateway = MemoryGateway::new();
        gateway.fail_next(Fault::Status(500, None));
        assert!(matches!(
            gateway.list_all().await,
            Err(GatewayError::Server { status: Some(500), .. })
        ));
        assert!(gateway.list_all().await.is_ok());
        assert_eq!(gateway.calls().list_all, 2);
    }

    #[tokio::test]
    async fn test_offline_is_transport_error() {
        let gateway = MemoryGateway::new();
        gateway.set_offline(true);
        assert!(matches!(
            gateway.remove(1).await,
            Err(GatewayError::Transport(_))
        ));
        gateway.set_offline(false);
        assert!(gateway.remove(1).await.is_ok());
        assert_eq!(gateway.calls().remove, 2);
    }

    #[tokio::test]
    async fn test_registration_time_is_stable_across_lists() {
        let gateway = MemoryGateway::new();
        let created = gateway.create(&candidate("a@example.com")).await.unwrap();

        let first = gateway.list_all().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = gateway.list_all().await.unwrap();

        assert_eq!(first[0].registered_at, created.registered_at);
        assert_eq!(second[0].registered_at, created.registered_at);
    }

    #[tokio::test]
    async fn test_remove_drops_row() {
        let gateway = MemoryGateway::new();
        let created = gateway.create(&candidate("a@example.com")).await.unwrap();
        gateway.remove(created.id).await.unwrap();
        assert!(gateway.list_all().await.unwrap().is_empty());
    }
}
