// src/application/mod.rs
pub mod auth;
pub mod clock;
pub mod note_store;
pub mod operation;
pub mod storage;

pub use auth::Authenticator;
pub use clock::{Clock, SystemClock};
pub use note_store::{DeleteOutcome, NoteStore};
pub use operation::{Operation, QueryExecutor};
pub use storage::ObjectStorage;
