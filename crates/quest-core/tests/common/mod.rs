//! Shared fixtures for integration tests

#![allow(dead_code)]

use quest_core::storage::{MemoryStore, Row, RowStore};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a test subscriber filtered by RUST_LOG (default `warn`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_test_writer())
        .try_init();
}

/// (name, nickname, country) in insertion order
pub const USERS: [(&str, &str, &str); 4] = [
    ("John Doe", "jndoe", "United States"),
    ("Jane Doe", "jndoe", "United Kingdom"),
    ("Fred Doe", "fredrick", "France"),
    ("William Doe", "willy", "Italy"),
];

pub fn user_row(name: &str, nickname: &str, country: &str) -> Row {
    Row::new()
        .with("name", name)
        .with("nickname", nickname)
        .with("country", country)
}

/// Memory store seeded with the four users
pub fn users() -> MemoryStore {
    init_tracing();
    let mut store = MemoryStore::new();
    for (name, nickname, country) in USERS {
        store
            .insert("users", user_row(name, nickname, country))
            .expect("insert user");
    }
    store
}

pub fn names(rows: &[Row]) -> Vec<&str> {
    rows.iter().filter_map(|row| row.text("name")).collect()
}
