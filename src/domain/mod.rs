// src/domain/mod.rs
pub mod error;
pub mod image_key;
pub mod note;
pub mod session;

pub use error::{DomainError, ValidationError};
pub use note::{ImageFile, Note, NoteDraft, NoteImage, NoteRecord};
pub use session::Session;
