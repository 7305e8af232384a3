// src/ports/form.rs
use crate::domain::{ImageFile, ValidationError};

/// What a submitted creation form yields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSubmission {
    pub name: String,
    pub description: String,
    pub image: Option<ImageFile>,
}

/// Field state of the note creation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    pub name: String,
    pub description: String,
    pub image: Option<ImageFile>,
}

impl NoteForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract the field values. The fields keep their contents until the
    /// caller confirms the note was created and calls [`NoteForm::reset`].
    pub fn submit(&self) -> Result<NoteSubmission, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("Name"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyField("Description"));
        }
        Ok(NoteSubmission {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            image: self.image.clone(),
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
