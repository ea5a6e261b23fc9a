//! Data-transfer shapes shared by the notes service and its HTTP layer.

pub mod errors;
pub mod note;
pub mod response;

pub use note::{IdRequest, Note, NO_ID};
pub use response::ApiResponse;
