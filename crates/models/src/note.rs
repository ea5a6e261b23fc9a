use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Id value meaning "the client did not send one".
pub const NO_ID: i64 = -1;

fn no_id() -> i64 { NO_ID }

/// A single note record as exchanged with clients.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    #[serde(default = "no_id")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub note: String,
}

impl Default for Note {
    fn default() -> Self {
        Self { id: NO_ID, name: String::new(), last_name: String::new(), note: String::new() }
    }
}

impl Note {
    pub fn new(name: &str, last_name: &str, note: &str) -> Self {
        Self { id: NO_ID, name: name.into(), last_name: last_name.into(), note: note.into() }
    }

    /// All text fields must be present, as required on creation.
    pub fn validate_complete(&self) -> Result<(), ModelError> {
        validate_required("name", &self.name)?;
        validate_required("last_name", &self.last_name)?;
        validate_required("note", &self.note)?;
        Ok(())
    }

    /// At least one text field carries content.
    pub fn has_content(&self) -> bool {
        !(self.name.trim().is_empty() && self.last_name.trim().is_empty() && self.note.trim().is_empty())
    }

    /// Whether `id` is a usable record identifier.
    pub fn has_id(&self) -> bool {
        self.id > 0
    }
}

/// Request body for endpoints addressing a note by id only.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRequest {
    #[serde(default = "no_id")]
    pub id: i64,
}

pub fn validate_required(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("{field} required")));
    }
    Ok(())
}
