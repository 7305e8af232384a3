// src/application/note_store.rs
use crate::application::{Clock, ObjectStorage, Operation, QueryExecutor, SystemClock};
use crate::constants::DEFAULT_KEY_PREFIX;
use crate::domain::image_key::{decode_key_from_url, encode_upload_key, validate_image};
use crate::domain::{
    DomainError, ImageFile, Note, NoteDraft, NoteImage, NoteRecord, ValidationError,
};
use futures::future::try_join_all;
use tracing::{debug, info, instrument, warn};

/// What `delete` ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Removed locally and the delete mutation succeeded
    Deleted { image_removed: bool },
    /// No note with that id was in memory; nothing was sent
    AlreadyAbsent,
}

/// Client-side owner of the note list.
///
/// All mutating operations take `&mut self`, so updates to the list are
/// applied strictly in call order.
pub struct NoteStore<Q: QueryExecutor, S: ObjectStorage> {
    executor: Q,
    storage: S,
    clock: Box<dyn Clock>,
    key_prefix: String,
    notes: Vec<Note>,
}

impl<Q: QueryExecutor, S: ObjectStorage> NoteStore<Q, S> {
    pub fn new(executor: Q, storage: S) -> Self {
        Self {
            executor,
            storage,
            clock: Box::new(SystemClock),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            notes: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn executor(&self) -> &Q {
        &self.executor
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Replace the in-memory list with the backend's, resolving image keys
    /// to display URLs.
    ///
    /// Resolutions run concurrently. Nothing is replaced unless the list call
    /// and every resolution succeed.
    pub async fn fetch_all(&mut self) -> Result<&[Note], DomainError> {
        let operation = Operation::ListNotes;
        let data = self.executor.execute(&operation).await?;
        let records: Vec<NoteRecord> = operation.decode(&data)?;
        debug!(count = records.len(), "Fetched note records");

        let storage = &self.storage;
        let notes = try_join_all(records.into_iter().map(|record| async move {
            let mut note = Note::from(record);
            note.image = match note.image.take() {
                Some(NoteImage::Key(key)) => {
                    Some(NoteImage::DisplayUrl(storage.resolve_url(&key).await?))
                }
                other => other,
            };
            Ok::<_, DomainError>(note)
        }))
        .await?;

        self.notes = notes;
        Ok(self.notes.as_slice())
    }

    /// Create a note, uploading the image first if one is given, then
    /// refresh the list from the backend.
    #[instrument(level = "debug", skip(self, image))]
    pub async fn create(
        &mut self,
        name: &str,
        description: &str,
        image: Option<ImageFile>,
    ) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyField("Name").into());
        }
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyField("Description").into());
        }
        if let Some(file) = &image {
            validate_image(file)?;
        }

        let mut draft = NoteDraft {
            name: name.to_string(),
            description: description.to_string(),
            image: None,
        };

        if let Some(file) = image {
            let key = encode_upload_key(&self.key_prefix, self.clock.now_millis(), &file.filename);
            debug!(%key, size = file.size(), "Uploading image");
            self.storage
                .upload(&key, &file.content_type, file.bytes)
                .await?;
            draft.image = Some(key);
        }

        let operation = Operation::CreateNote(draft);
        let data = self.executor.execute(&operation).await?;
        let created: NoteRecord = operation.decode(&data)?;
        info!(note_id = %created.id, "Created note");

        self.fetch_all().await?;
        Ok(())
    }

    /// Remove a note locally, then clean up its image and delete it remotely.
    ///
    /// The local removal is not undone if the delete mutation fails.
    #[instrument(level = "debug", skip(self, note), fields(note_id = %note.id))]
    pub async fn delete(&mut self, note: &Note) -> Result<DeleteOutcome, DomainError> {
        let Some(position) = self.notes.iter().position(|n| n.id == note.id) else {
            debug!("Note not in memory, nothing to delete");
            return Ok(DeleteOutcome::AlreadyAbsent);
        };
        let removed = self.notes.remove(position);

        let key = match &removed.image {
            Some(NoteImage::DisplayUrl(url)) => decode_key_from_url(url),
            Some(NoteImage::Key(key)) => Some(key.clone()),
            None => None,
        };

        let mut image_removed = false;
        match key {
            Some(key) => match self.storage.remove(&key).await {
                Ok(()) => image_removed = true,
                Err(e) => warn!(%key, error = %e, "Failed to remove image, continuing"),
            },
            None if removed.image.is_some() => {
                warn!("Could not recover a storage key from the image URL, skipping cleanup")
            }
            None => {}
        }

        let operation = Operation::DeleteNote {
            id: removed.id.clone(),
        };
        let data = self.executor.execute(&operation).await?;
        let deleted_id: String = operation.decode(&data)?;
        info!(%deleted_id, image_removed, "Deleted note");

        Ok(DeleteOutcome::Deleted { image_removed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::clock::FixedClock;
    use crate::util::testing::{record, MockObjectStorage, MockQueryExecutor, StorageCall};

    fn store(
        executor: MockQueryExecutor,
        storage: MockObjectStorage,
    ) -> NoteStore<MockQueryExecutor, MockObjectStorage> {
        NoteStore::new(executor, storage).with_clock(FixedClock(1700000000000))
    }

    #[tokio::test]
    async fn given_note_with_image_when_fetching_then_replaces_key_with_display_url() {
        // Arrange
        let executor = MockQueryExecutor::builder()
            .with_note(record("1", "A", "d", Some("public/1_a.png")))
            .with_note(record("2", "B", "e", None))
            .build();
        let mut store = store(executor, MockObjectStorage::builder().build());

        // Act
        let notes = store.fetch_all().await.expect("fetch should succeed");

        // Assert
        assert_eq!(notes.len(), 2);
        assert_eq!(
            notes[0].image,
            Some(NoteImage::DisplayUrl(MockObjectStorage::url_for("public/1_a.png")))
        );
        assert_eq!(notes[1].image, None);
        assert_eq!(
            store.storage().calls(),
            vec![StorageCall::ResolveUrl("public/1_a.png".to_string())]
        );
    }

    #[tokio::test]
    async fn given_existing_list_when_fetch_fails_then_keeps_previous_list() {
        // Arrange
        let executor = MockQueryExecutor::builder()
            .with_note(record("1", "A", "d", Some("public/1_a.png")))
            .with_note(record("2", "B", "e", Some("public/2_b.png")))
            .build();
        let storage = MockObjectStorage::builder()
            .failing_resolve("public/2_b.png")
            .build();
        let mut store = store(executor, storage);
        store.notes = vec![Note::from(record("old", "Old", "x", None))];

        // Act
        let result = store.fetch_all().await;

        // Assert
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].id, "old");
    }

    #[tokio::test]
    async fn given_name_and_description_when_creating_then_one_mutation_and_one_refresh() {
        // Arrange
        let mut store = store(
            MockQueryExecutor::builder().build(),
            MockObjectStorage::builder().build(),
        );

        // Act
        store.create("A", "d", None).await.expect("create should succeed");

        // Assert
        let calls = store.executor().calls();
        assert_eq!(calls.len(), 2);
        match &calls[0] {
            Operation::CreateNote(draft) => assert_eq!(draft.image, None),
            other => panic!("Expected CreateNote, got {other:?}"),
        }
        assert_eq!(calls[1], Operation::ListNotes);
        assert!(store.storage().calls().is_empty());
        assert_eq!(store.notes().len(), 1);
    }

    #[tokio::test]
    async fn given_valid_image_when_creating_then_uploads_under_timestamped_key() {
        // Arrange
        let mut store = store(
            MockQueryExecutor::builder().build(),
            MockObjectStorage::builder().build(),
        );
        let file = ImageFile::new("a.png", "image/png", vec![7; 64]);

        // Act
        store
            .create("A", "d", Some(file))
            .await
            .expect("create should succeed");

        // Assert
        let key = "public/1700000000000_a.png";
        assert!(store.storage().contains(key));
        match &store.executor().calls()[0] {
            Operation::CreateNote(draft) => assert_eq!(draft.image.as_deref(), Some(key)),
            other => panic!("Expected CreateNote, got {other:?}"),
        }
        assert_eq!(
            store.notes()[0].image,
            Some(NoteImage::DisplayUrl(MockObjectStorage::url_for(key)))
        );
    }

    #[tokio::test]
    async fn given_blank_name_when_creating_then_rejects_without_calls() {
        let mut store = store(
            MockQueryExecutor::builder().build(),
            MockObjectStorage::builder().build(),
        );

        let result = store.create("  ", "d", None).await;

        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::EmptyField("Name")))
        ));
        assert!(store.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn given_upload_failure_when_creating_then_no_mutation_is_sent() {
        let mut store = store(
            MockQueryExecutor::builder().build(),
            MockObjectStorage::builder().failing_upload().build(),
        );
        let file = ImageFile::new("a.png", "image/png", vec![1]);

        let result = store.create("A", "d", Some(file)).await;

        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert!(store.executor().calls().is_empty());
    }

    #[tokio::test]
    async fn given_note_with_display_url_when_deleting_then_removes_object_by_key() {
        // Arrange
        let executor = MockQueryExecutor::builder()
            .with_note(record("1", "A", "d", Some("public/1_a b.png")))
            .build();
        let storage = MockObjectStorage::builder()
            .with_object("public/1_a b.png")
            .build();
        let mut store = store(executor, storage);
        let note = store.fetch_all().await.expect("fetch")[0].clone();

        // Act
        let outcome = store.delete(&note).await.expect("delete should succeed");

        // Assert
        assert_eq!(outcome, DeleteOutcome::Deleted { image_removed: true });
        assert!(store.notes().is_empty());
        assert!(!store.storage().contains("public/1_a b.png"));
        assert_eq!(
            store.executor().calls().last(),
            Some(&Operation::DeleteNote { id: "1".to_string() })
        );
    }

    #[tokio::test]
    async fn given_storage_remove_failure_when_deleting_then_still_deletes_note() {
        // Arrange
        let executor = MockQueryExecutor::builder()
            .with_note(record("1", "A", "d", Some("public/1_a.png")))
            .build();
        let storage = MockObjectStorage::builder().failing_remove().build();
        let mut store = store(executor, storage);
        let note = store.fetch_all().await.expect("fetch")[0].clone();

        // Act
        let outcome = store.delete(&note).await.expect("delete should succeed");

        // Assert
        assert_eq!(outcome, DeleteOutcome::Deleted { image_removed: false });
        assert_eq!(store.executor().count("DeleteNote"), 1);
        assert!(store.executor().stored_notes().is_empty());
    }

    #[tokio::test]
    async fn given_unrecoverable_url_when_deleting_then_skips_storage_cleanup() {
        let mut store = store(
            MockQueryExecutor::builder().build(),
            MockObjectStorage::builder().build(),
        );
        let mut note = Note::from(record("1", "A", "d", None));
        note.image = Some(NoteImage::DisplayUrl("https://cdn.example.com/x.png".to_string()));
        store.notes = vec![note.clone()];

        let outcome = store.delete(&note).await.expect("delete should succeed");

        assert_eq!(outcome, DeleteOutcome::Deleted { image_removed: false });
        assert!(store.storage().calls().is_empty());
        assert_eq!(store.executor().count("DeleteNote"), 1);
    }

    #[tokio::test]
    async fn given_mutation_failure_when_deleting_then_local_removal_is_kept() {
        // Arrange
        let executor = MockQueryExecutor::builder()
            .with_note(record("1", "A", "d", None))
            .failing("DeleteNote")
            .build();
        let mut store = store(executor, MockObjectStorage::builder().build());
        let note = store.fetch_all().await.expect("fetch")[0].clone();

        // Act
        let result = store.delete(&note).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Remote(_))));
        assert!(store.notes().is_empty());
        assert_eq!(store.executor().stored_notes().len(), 1);
    }
}
