use std::sync::Arc;

use models::Note;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::storage::{Index, Storage, StorageKind};

/// Note operations exposed to the HTTP layer.
///
/// Mutations are serialized by `writes` so that stamping a note with
/// `next_index` and inserting it happen as one step, and so that an update's
/// remove/re-insert pair is not interleaved with other writes.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn Storage<Note>>,
    writes: Arc<Mutex<()>>,
}

impl NoteService {
    pub fn new(store: Arc<dyn Storage<Note>>) -> Self {
        Self { store, writes: Arc::new(Mutex::new(())) }
    }

    pub fn backend(&self) -> StorageKind {
        self.store.kind()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Validate and store a new note; returns its id.
    pub fn create(&self, mut note: Note) -> Result<Index, ServiceError> {
        note.validate_complete()?;
        let _guard = self.writes.lock();
        note.id = self.store.next_index();
        let id = self.store.add(note)?;
        info!(id, backend = %self.backend(), "note created");
        Ok(id)
    }

    pub fn get(&self, id: Index) -> Result<Note, ServiceError> {
        if id <= 0 {
            return Err(ServiceError::Validation("no ID provided".into()));
        }
        self.store.get_by_index(id).ok_or_else(|| ServiceError::not_found("records"))
    }

    /// Replace the note stored under `note.id`.
    ///
    /// Implemented as remove-then-insert at the same index, so on the list
    /// backend the index is read as a chain offset. If the insert fails the
    /// previous note is put back.
    pub fn update(&self, note: Note) -> Result<(), ServiceError> {
        if !note.has_id() || !note.has_content() {
            return Err(ServiceError::Validation("required data is missing".into()));
        }
        let id = note.id;
        let _guard = self.writes.lock();
        let previous = self.store.get_by_index(id);
        self.store.remove_by_index(id);
        if let Err(e) = self.store.add_to_index(note, id) {
            if let Some(prev) = previous {
                if let Err(restore) = self.store.add_to_index(prev, id) {
                    warn!(id, error = %restore, "failed to restore note after rejected update");
                }
            }
            return Err(e.into());
        }
        info!(id, "note updated");
        Ok(())
    }

    pub fn delete(&self, id: Index) -> Result<(), ServiceError> {
        if id <= 0 {
            return Err(ServiceError::Validation("ID is missing".into()));
        }
        let _guard = self.writes.lock();
        self.store.remove_by_index(id);
        info!(id, "note deleted");
        Ok(())
    }

    pub fn list(&self) -> Result<Vec<Note>, ServiceError> {
        self.store.get_all().ok_or_else(|| ServiceError::not_found("records"))
    }

    /// Drop every note and restart numbering.
    pub fn clear(&self) {
        let _guard = self.writes.lock();
        self.store.clear();
        self.store.print();
    }
}
