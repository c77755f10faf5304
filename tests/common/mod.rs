#![allow(dead_code)]

use chrono::{Datelike, Local, NaiveDate};
use roster_sync::cache::MemoryCache;
use roster_sync::gateway::MemoryGateway;
use roster_sync::models::RegistrantInput;
use roster_sync::roster::RosterManager;
use roster_sync::validation::RegistrationForm;
use std::sync::Arc;

/// Date `years` years before today, clamped to Feb 28 for leap days
pub fn years_ago(years: i32) -> NaiveDate {
    let today = Local::now().date_naive();
    NaiveDate::from_ymd_opt(today.year() - years, today.month(), today.day())
        .or_else(|| NaiveDate::from_ymd_opt(today.year() - years, 2, 28))
        .unwrap()
}

/// A form that passes every validator
pub fn valid_form() -> RegistrationForm {
    RegistrationForm {
        first_name: Some("Jean".to_string()),
        last_name: Some("Dupont".to_string()),
        email: Some("jean.dupont@example.com".to_string()),
        date_of_birth: Some(years_ago(25).format("%Y-%m-%d").to_string()),
        city: Some("Paris".to_string()),
        postal_code: Some("75001".to_string()),
    }
}

pub fn candidate(email: &str) -> RegistrantInput {
    RegistrantInput {
        first_name: "Marie".to_string(),
        last_name: "Curie".to_string(),
        email: email.to_string(),
        date_of_birth: years_ago(30),
        city: "Lyon".to_string(),
        postal_code: "69001".to_string(),
    }
}

pub struct TestRoster {
    pub roster: RosterManager,
    pub gateway: Arc<MemoryGateway>,
    pub cache: Arc<MemoryCache>,
}

/// Fresh manager over an empty in-memory gateway and cache
pub fn setup_roster() -> TestRoster {
    setup_roster_with(Arc::new(MemoryGateway::new()), Arc::new(MemoryCache::new()))
}

/// Manager sharing an existing gateway and cache, as after a restart
pub fn setup_roster_with(gateway: Arc<MemoryGateway>, cache: Arc<MemoryCache>) -> TestRoster {
    TestRoster {
        roster: RosterManager::new(gateway.clone(), cache.clone()),
        gateway,
        cache,
    }
}
