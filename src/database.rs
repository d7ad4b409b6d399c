//! # Database
//!
//! SQLite persistence for the user entity. Only action handlers touch it;
//! the registries and the dispatcher never do.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::{Context as _, Result};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use sqlite::{Connection, State};
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    discord_id TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL,
    display_name TEXT NOT NULL,
    last_seen INTEGER NOT NULL
);
";

/// A stored user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub discord_id: String,
    pub username: String,
    pub display_name: String,
    pub last_seen: DateTime<Utc>,
}

/// Fields needed to create or refresh a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub discord_id: String,
    pub username: String,
    pub display_name: String,
}

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and apply the schema
    pub async fn new(path: &str) -> Result<Self> {
        let connection =
            sqlite::open(path).with_context(|| format!("opening database {path}"))?;
        connection.execute(SCHEMA)?;
        debug!("Database ready at {path}");
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Private in-memory database
    pub async fn in_memory() -> Result<Self> {
        Self::new(":memory:").await
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<UserRecord> {
        let connection = self.connection.lock().await;
        let mut statement = connection.prepare(
            "INSERT INTO users (discord_id, username, display_name, last_seen) VALUES (?, ?, ?, ?)",
        )?;
        statement.bind((1, user.discord_id.as_str()))?;
        statement.bind((2, user.username.as_str()))?;
        statement.bind((3, user.display_name.as_str()))?;
        statement.bind((4, Utc::now().timestamp()))?;
        while statement.next()? != State::Done {}
        drop(statement);

        select_user(&connection, &user.discord_id)?
            .ok_or_else(|| anyhow::anyhow!("user {} missing after insert", user.discord_id))
    }

    pub async fn find_user(&self, discord_id: &str) -> Result<Option<UserRecord>> {
        let connection = self.connection.lock().await;
        select_user(&connection, discord_id)
    }

    /// Refresh display fields and last-seen time of an existing user
    pub async fn touch_user(&self, user: &NewUser) -> Result<Option<UserRecord>> {
        let connection = self.connection.lock().await;
        update_user(&connection, user)?;
        select_user(&connection, &user.discord_id)
    }

    /// Find a user, creating it on first sight and refreshing it otherwise
    ///
    /// Runs under one lock, and the insert itself is conflict-safe, so
    /// concurrent callers (or other shards sharing the file) never trip the
    /// unique `discord_id` constraint.
    pub async fn find_or_create_user(&self, user: &NewUser) -> Result<(UserRecord, bool)> {
        let connection = self.connection.lock().await;

        let mut statement = connection.prepare(
            "INSERT OR IGNORE INTO users (discord_id, username, display_name, last_seen) \
             VALUES (?, ?, ?, ?)",
        )?;
        statement.bind((1, user.discord_id.as_str()))?;
        statement.bind((2, user.username.as_str()))?;
        statement.bind((3, user.display_name.as_str()))?;
        statement.bind((4, Utc::now().timestamp()))?;
        while statement.next()? != State::Done {}
        drop(statement);

        let created = connection.change_count() > 0;
        if !created {
            update_user(&connection, user)?;
        }

        let record = select_user(&connection, &user.discord_id)?
            .ok_or_else(|| anyhow::anyhow!("user {} missing after upsert", user.discord_id))?;
        Ok((record, created))
    }
}

fn update_user(connection: &Connection, user: &NewUser) -> Result<()> {
    let mut statement = connection.prepare(
        "UPDATE users SET username = ?, display_name = ?, last_seen = ? WHERE discord_id = ?",
    )?;
    statement.bind((1, user.username.as_str()))?;
    statement.bind((2, user.display_name.as_str()))?;
    statement.bind((3, Utc::now().timestamp()))?;
    statement.bind((4, user.discord_id.as_str()))?;
    while statement.next()? != State::Done {}
    Ok(())
}

fn select_user(connection: &Connection, discord_id: &str) -> Result<Option<UserRecord>> {
    let mut statement = connection.prepare(
        "SELECT id, discord_id, username, display_name, last_seen FROM users WHERE discord_id = ?",
    )?;
    statement.bind((1, discord_id))?;

    if statement.next()? != State::Row {
        return Ok(None);
    }

    let last_seen = statement.read::<i64, _>("last_seen")?;
    Ok(Some(UserRecord {
        id: statement.read::<i64, _>("id")?,
        discord_id: statement.read::<String, _>("discord_id")?,
        username: statement.read::<String, _>("username")?,
        display_name: statement.read::<String, _>("display_name")?,
        last_seen: Utc
            .timestamp_opt(last_seen, 0)
            .single()
            .unwrap_or_else(Utc::now),
    }))
}
