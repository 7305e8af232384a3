// src/ports/mod.rs
pub mod form;
pub mod html;

pub use form::{NoteForm, NoteSubmission};
pub use html::{HtmlPresenter, PageModel};
