// src/application/operation.rs
use crate::domain::{DomainError, NoteDraft};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub const LIST_NOTES: &str = r#"query ListNotes {
  listNotes {
    items { id name description image createdAt updatedAt }
  }
}"#;

pub const CREATE_NOTE: &str = r#"mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) { id name description image createdAt updatedAt }
}"#;

pub const DELETE_NOTE: &str = r#"mutation DeleteNote($input: DeleteNoteInput!) {
  deleteNote(input: $input) { id }
}"#;

/// The GraphQL operations the client issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    ListNotes,
    CreateNote(NoteDraft),
    DeleteNote { id: String },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListNotes => "ListNotes",
            Operation::CreateNote(_) => "CreateNote",
            Operation::DeleteNote { .. } => "DeleteNote",
        }
    }

    pub fn document(&self) -> &'static str {
        match self {
            Operation::ListNotes => LIST_NOTES,
            Operation::CreateNote(_) => CREATE_NOTE,
            Operation::DeleteNote { .. } => DELETE_NOTE,
        }
    }

    pub fn variables(&self) -> Value {
        match self {
            Operation::ListNotes => json!({}),
            Operation::CreateNote(draft) => json!({ "input": draft }),
            Operation::DeleteNote { id } => json!({ "input": { "id": id } }),
        }
    }

    /// JSON pointer into the `data` object where this operation's result lives
    pub fn result_pointer(&self) -> &'static str {
        match self {
            Operation::ListNotes => "/listNotes/items",
            Operation::CreateNote(_) => "/createNote",
            Operation::DeleteNote { .. } => "/deleteNote/id",
        }
    }

    /// Pull this operation's result out of a `data` object
    pub fn decode<T: DeserializeOwned>(&self, data: &Value) -> Result<T, DomainError> {
        let pointer = self.result_pointer();
        let field = data.pointer(pointer).ok_or_else(|| {
            DomainError::Remote(format!("{} response is missing {}", self.name(), pointer))
        })?;
        serde_json::from_value(field.clone()).map_err(|e| {
            DomainError::Remote(format!("{} response is malformed: {}", self.name(), e))
        })
    }
}

/// Runs GraphQL operations against the backend and returns the `data` object.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, operation: &Operation) -> Result<Value, DomainError>;
}
