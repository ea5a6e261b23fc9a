//! Storage core and the note operations built on top of it.
//! - `storage`: the indexed storage contract and its two backends.
//! - `notes`: validation and id handling for the HTTP layer.

pub mod errors;
pub mod notes;
pub mod storage;

pub use errors::ServiceError;
pub use notes::NoteService;
