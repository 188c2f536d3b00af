//! SQLite storage implementation.
//!
//! This module provides the durable slot store for qsheet using SQLite.
//! It follows the `MutationContext` pattern for transaction discipline and
//! audit logging: a slot write and its events commit together or not at all.

use crate::error::Result;
use crate::storage::events::{insert_event, recent_events, Event, EventType};
use crate::storage::schema::apply_schema;
use rusqlite::{Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation, collecting audit events.
///
/// Passed to mutation closures; the events are written in the same
/// transaction as the mutation itself.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Actor performing the operation.
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    /// Create a new mutation context.
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event for this operation.
    pub fn record_event(&mut self, entity_type: &str, entity_id: &str, event_type: EventType) {
        self.events
            .push(Event::new(entity_type, entity_id, event_type, &self.actor));
    }

    /// Record an event with old/new values for field tracking.
    pub fn record_change(
        &mut self,
        entity_type: &str,
        entity_id: &str,
        event_type: EventType,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.events.push(
            Event::new(entity_type, entity_id, event_type, &self.actor)
                .with_values(old_value, new_value),
        );
    }

    /// Record an event carrying a free-form comment (e.g. the new title).
    pub fn record_comment(
        &mut self,
        entity_type: &str,
        entity_id: &str,
        event_type: EventType,
        comment: &str,
    ) {
        self.events.push(
            Event::new(entity_type, entity_id, event_type, &self.actor).with_comment(comment),
        );
    }
}

/// Contents of a named slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub value: String,
    pub content_hash: String,
    pub updated_at: i64,
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, None)
    }

    /// Open a database with an optional busy timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open_with_timeout(path: &Path, timeout_ms: Option<u64>) -> Result<Self> {
        let conn = Connection::open(path)?;

        if let Some(timeout) = timeout_ms {
            conn.busy_timeout(Duration::from_millis(timeout))?;
        } else {
            // Default 5 second timeout
            conn.busy_timeout(Duration::from_secs(5))?;
        }

        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// This method:
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, actor);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;

        Ok(result)
    }

    // ==================
    // Slot Operations
    // ==================

    /// Read a named slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load_slot(&self, name: &str) -> Result<Option<Slot>> {
        let slot = self
            .conn
            .query_row(
                "SELECT name, value, content_hash, updated_at FROM slots WHERE name = ?1",
                [name],
                |row| {
                    Ok(Slot {
                        name: row.get(0)?,
                        value: row.get(1)?,
                        content_hash: row.get(2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(slot)
    }

    /// Content hash currently stored in a slot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn slot_hash(&self, name: &str) -> Result<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT content_hash FROM slots WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    /// Overwrite a slot, recording `events` in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; nothing is committed then.
    pub fn save_slot(
        &mut self,
        op: &str,
        actor: &str,
        name: &str,
        value: &str,
        content_hash: &str,
        events: Vec<Event>,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate(op, actor, |tx, ctx| {
            tx.execute(
                "INSERT INTO slots (name, value, content_hash, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(name) DO UPDATE SET
                   value = excluded.value,
                   content_hash = excluded.content_hash,
                   updated_at = excluded.updated_at",
                rusqlite::params![name, value, content_hash, now],
            )?;
            ctx.events = events;
            Ok(())
        })
    }

    /// Remove a slot entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear_slot(&mut self, name: &str, actor: &str) -> Result<bool> {
        self.mutate("clear_slot", actor, |tx, ctx| {
            let removed = tx.execute("DELETE FROM slots WHERE name = ?1", [name])? > 0;
            if removed {
                ctx.record_event("slot", name, EventType::SheetCleared);
            }
            Ok(removed)
        })
    }

    // ==================
    // Event Operations
    // ==================

    /// Most recent audit events, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_events(&self, limit: u32) -> Result<Vec<Event>> {
        Ok(recent_events(&self.conn, limit)?)
    }

    /// Audit events for one entity, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn entity_events(&self, entity_type: &str, entity_id: &str, limit: u32) -> Result<Vec<Event>> {
        Ok(crate::storage::events::get_events(
            &self.conn,
            entity_type,
            entity_id,
            Some(limit),
        )?)
    }
}
