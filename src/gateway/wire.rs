//! Remote wire shape of the roster API and its mapping to [`Registrant`]
//!
//! The remote knows a person as `{ id, name, email, address: { city, zipcode } }`.
//! It has no birth date, so listed rows carry [`birth_date_placeholder`].
//!
//! Every row, listed or returned by create, has its full name split on the
//! first space: everything after it is the last name. A create response is
//! mapped the same way so a registrant reads identically before and after a
//! reload; a multi-word first name such as "Marie Claire" therefore comes
//! back as first name "Marie", last name "Claire Dupont". Only the birth
//! date, which the remote never returns, is taken from the submitted
//! candidate.
//!
//! A documented variant splits on every space and keeps only the second
//! token as the last name; it is intentionally not supported.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Registrant, RegistrantId, RegistrantInput};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteAddress {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zipcode: String,
}

/// A row as returned by list and create
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    pub id: RegistrantId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<RemoteAddress>,
}

/// Body of a create call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub address: RemoteAddress,
}

/// Birth date given to rows that come back from the remote
pub fn birth_date_placeholder() -> NaiveDate {
    NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default()
}

/// Splits "First Rest Of Name" into ("First", "Rest Of Name")
pub fn split_full_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.to_string()),
        None => (name.to_string(), String::new()),
    }
}

pub fn to_create_request(candidate: &RegistrantInput) -> CreateUserRequest {
    CreateUserRequest {
        name: format!("{} {}", candidate.first_name, candidate.last_name),
        email: candidate.email.clone(),
        address: RemoteAddress {
            city: candidate.city.clone(),
            zipcode: candidate.postal_code.clone(),
        },
    }
}

/// Maps a listed row back to a registrant
pub fn into_registrant(remote: RemoteUser, registered_at: DateTime<Utc>) -> Registrant {
    let (first_name, last_name) = split_full_name(&remote.name);
    let address = remote.address.unwrap_or_default();
    Registrant {
        id: remote.id,
        first_name,
        last_name,
        email: remote.email,
        date_of_birth: birth_date_placeholder(),
        city: address.city,
        postal_code: address.zipcode,
        registered_at,
    }
}

/// Maps a create response back to a registrant
///
/// Same mapping as a listed row, except the birth date comes from the
/// submitted candidate.
pub fn into_created_registrant(
    remote: RemoteUser,
    candidate: &RegistrantInput,
    registered_at: DateTime<Utc>,
) -> Registrant {
    Registrant {
        date_of_birth: candidate.date_of_birth,
        ..into_registrant(remote, registered_at)
    }
}
