//! Store bound to a durable slot.
//!
//! [`Workspace`] owns a [`Store`] and the [`SqliteStorage`] its snapshot lives
//! in. Every mutation runs through [`Workspace::mutate`]: the closure edits
//! the store and records audit events, then the full snapshot is written to
//! the slot together with those events in one transaction. A mutation that
//! leaves the snapshot byte-identical (same content hash) writes nothing.

use tracing::{debug, info};

use crate::error::Result;
use crate::model::SheetState;
use crate::storage::{EventType, MutationContext, SqliteStorage};
use crate::store::{Store, UiState};
use crate::sync::{has_changed, hash_bytes};

/// Name of the slot holding the sheet snapshot.
pub const SLOT_NAME: &str = "question-sheet-storage";

/// How [`Workspace::bootstrap`] obtained its initial sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapSource {
    /// The slot held a non-empty snapshot; it was loaded verbatim.
    Loaded,
    /// The slot was missing or empty; the seeder ran and its result was persisted.
    Seeded,
}

/// A store bound to a persistence slot.
#[derive(Debug)]
pub struct Workspace {
    store: Store,
    storage: SqliteStorage,
    slot: String,
    actor: String,
    stored_hash: Option<String>,
}

impl Workspace {
    /// Open the slot as-is. A missing slot yields an empty sheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read or parsed.
    pub fn open(storage: SqliteStorage, slot: &str, actor: &str) -> Result<Self> {
        let (sheet, stored_hash) = match storage.load_slot(slot)? {
            Some(s) => (serde_json::from_str::<SheetState>(&s.value)?, Some(s.content_hash)),
            None => (SheetState::new(), None),
        };

        debug!(
            slot,
            topics = sheet.topic_count(),
            questions = sheet.question_count(),
            "Opened workspace"
        );
        Ok(Self {
            store: Store::from_snapshot(sheet),
            storage,
            slot: slot.to_string(),
            actor: actor.to_string(),
            stored_hash,
        })
    }

    /// Load the slot, seeding it first if it is missing or holds an empty sheet.
    ///
    /// The seeder is never called when the slot already has content.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read, the seeder fails, or the
    /// seeded snapshot cannot be persisted.
    pub fn bootstrap<F>(
        storage: SqliteStorage,
        slot: &str,
        actor: &str,
        seeder: F,
    ) -> Result<(Self, BootstrapSource)>
    where
        F: FnOnce() -> Result<SheetState>,
    {
        let mut workspace = Self::open(storage, slot, actor)?;
        if !workspace.store.sheet().is_empty() {
            return Ok((workspace, BootstrapSource::Loaded));
        }

        let snapshot = seeder()?;
        info!(
            slot,
            topics = snapshot.topic_count(),
            questions = snapshot.question_count(),
            "Seeding empty slot"
        );
        workspace.replace("seed", EventType::SheetSeeded, snapshot)?;
        Ok((workspace, BootstrapSource::Seeded))
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn sheet(&self) -> &SheetState {
        self.store.sheet()
    }

    #[must_use]
    pub fn ui(&self) -> &UiState {
        self.store.ui()
    }

    /// Reattach UI state carried over from a previous run.
    ///
    /// UI state never enters the slot, so nothing is persisted here.
    pub fn restore_ui(&mut self, ui: UiState) {
        self.store.restore_ui(ui);
    }

    #[must_use]
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    #[must_use]
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Run a store operation and persist the result if the snapshot changed.
    ///
    /// Events recorded on the context are written only when the snapshot is.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the slot write fails. The
    /// in-memory store keeps the change in that case.
    pub fn mutate<R, F>(&mut self, op: &str, f: F) -> Result<R>
    where
        F: FnOnce(&mut Store, &mut MutationContext) -> R,
    {
        let mut ctx = MutationContext::new(op, &self.actor);
        let result = f(&mut self.store, &mut ctx);
        self.persist(op, ctx)?;
        Ok(result)
    }

    /// Replace the whole sheet (seed, import) and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot write fails.
    pub fn replace(&mut self, op: &str, event: EventType, snapshot: SheetState) -> Result<()> {
        let slot = self.slot.clone();
        self.mutate(op, |store, ctx| {
            store.import_data(snapshot);
            ctx.record_event("sheet", &slot, event);
        })
    }

    /// Write the snapshot unless its hash matches the stored one.
    ///
    /// Returns whether a write happened.
    fn persist(&mut self, op: &str, ctx: MutationContext) -> Result<bool> {
        let value = serde_json::to_string(self.store.sheet())?;
        let hash = hash_bytes(value.as_bytes());

        if !has_changed(&hash, self.stored_hash.as_deref()) {
            debug!(op, "Snapshot unchanged, skipping write");
            return Ok(false);
        }

        let event_count = ctx.events.len();
        self.storage
            .save_slot(op, &self.actor, &self.slot, &value, &hash, ctx.events)?;
        debug!(op, hash = %hash, events = event_count, "Persisted snapshot");

        self.stored_hash = Some(hash);
        Ok(true)
    }
}
