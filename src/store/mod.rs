use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::DayDate;

mod repository;

pub use repository::{JsonSlotRepository, MemorySlot, NoteRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw).map(Self)
    }
}

/// One annotation on a calendar day. The id is generated locally; slots
/// written before ids existed carry only `{date, title}` and are assigned
/// fresh ids on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default = "NoteId::generate")]
    pub id: NoteId,
    pub date: DayDate,
    pub title: String,
}

/// Insertion-ordered note collection plus its persistence synchronization.
/// Every mutation immediately rewrites the injected slot; there is no
/// batching, and the last successful write wins.
pub struct NoteStore {
    notes: Vec<Note>,
    repository: Box<dyn NoteRepository>,
}

impl NoteStore {
    pub fn open(repository: Box<dyn NoteRepository>) -> Result<Self> {
        let notes = repository.load()?;
        tracing::debug!(count = notes.len(), "hydrated note store");
        Ok(Self { notes, repository })
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn notes_on(&self, date: DayDate) -> Vec<&Note> {
        self.notes.iter().filter(|note| note.date == date).collect()
    }

    pub fn count_on(&self, date: DayDate) -> usize {
        self.notes.iter().filter(|note| note.date == date).count()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Appends a note and persists. Empty or whitespace-only titles are a
    /// contract violation.
    pub fn add(&mut self, date: DayDate, title: &str) -> Result<NoteId> {
        let title = title.trim();
        if title.is_empty() {
            bail!("note title cannot be empty");
        }
        let id = NoteId::generate();
        self.notes.push(Note {
            id,
            date,
            title: title.to_string(),
        });
        self.persist()?;
        Ok(id)
    }

    /// Updates the title (and optionally the date) of an existing note in
    /// place. Returns `false` when no note with that id remains; the store
    /// is left untouched in that case.
    pub fn rename(&mut self, id: NoteId, date: DayDate, title: &str) -> Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            bail!("note title cannot be empty");
        }
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            return Ok(false);
        };
        if note.title == title && note.date == date {
            return Ok(true);
        }
        note.title = title.to_string();
        note.date = date;
        self.persist()?;
        Ok(true)
    }

    /// Removes a single note by id. Absent ids are a no-op.
    pub fn remove(&mut self, id: NoteId) -> Result<bool> {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Removes every note on the given date, returning how many went away.
    /// Clearing a date with no notes is a no-op and does not touch the slot.
    pub fn clear_day(&mut self, date: DayDate) -> Result<usize> {
        let before = self.notes.len();
        self.notes.retain(|note| note.date != date);
        let removed = before - self.notes.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        self.repository.save(&self.notes)
    }
}
