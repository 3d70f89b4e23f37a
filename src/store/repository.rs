use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;

use super::Note;

/// Persistence seam for the note collection. The whole collection is the
/// unit of durability: `save` overwrites the slot wholesale and `load`
/// hydrates it once at startup.
pub trait NoteRepository: Send {
    fn load(&self) -> Result<Vec<Note>>;
    fn save(&self, notes: &[Note]) -> Result<()>;
}

/// JSON-file slot: one file, one JSON array, rewritten on every mutation.
/// A missing or unparsable file hydrates as an empty collection; the parse
/// failure is only logged.
pub struct JsonSlotRepository {
    path: PathBuf,
    pretty: bool,
}

impl JsonSlotRepository {
    pub fn new(path: impl Into<PathBuf>, pretty: bool) -> Self {
        Self {
            path: path.into(),
            pretty,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NoteRepository for JsonSlotRepository {
    fn load(&self) -> Result<Vec<Note>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading notes slot {}", self.path.display()))?;
        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => Ok(notes),
            Err(err) => {
                tracing::warn!(
                    ?err,
                    path = %self.path.display(),
                    "notes slot is unparsable, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }
        let encoded = if self.pretty {
            serde_json::to_string_pretty(notes).context("encoding notes slot")?
        } else {
            serde_json::to_string(notes).context("encoding notes slot")?
        };
        fs::write(&self.path, encoded)
            .with_context(|| format!("writing notes slot {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory slot used by tests and by callers that want an ephemeral store.
#[derive(Default)]
pub struct MemorySlot {
    notes: Mutex<Vec<Note>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(notes: Vec<Note>) -> Self {
        Self {
            notes: Mutex::new(notes),
        }
    }

    pub fn snapshot(&self) -> Vec<Note> {
        self.notes.lock().clone()
    }
}

impl NoteRepository for MemorySlot {
    fn load(&self) -> Result<Vec<Note>> {
        Ok(self.notes.lock().clone())
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        *self.notes.lock() = notes.to_vec();
        Ok(())
    }
}

// Lets tests keep a handle on the slot after handing it to a store.
impl NoteRepository for std::sync::Arc<MemorySlot> {
    fn load(&self) -> Result<Vec<Note>> {
        self.as_ref().load()
    }

    fn save(&self, notes: &[Note]) -> Result<()> {
        self.as_ref().save(notes)
    }
}
