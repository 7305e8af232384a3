// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{Authenticator, ObjectStorage, Operation, QueryExecutor};
use crate::domain::{DomainError, NoteRecord, Session};

// Common test environment variables
pub const TEST_ENV_VARS: &[&str] = &["RUST_LOG", "NO_CLEANUP"];

/// Host used by [`MockObjectStorage`] for resolved URLs
pub const MOCK_STORAGE_HOST: &str = "https://notes-bucket.s3.us-east-1.amazonaws.com";

const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// In-memory GraphQL backend recording every operation it receives
///
/// Create and delete mutate the backing list, so a list issued afterwards
/// sees the change, like the real API.
///
/// # Examples
///
/// ```
/// use cloudnotes::util::testing::{record, MockQueryExecutor};
///
/// let executor = MockQueryExecutor::builder()
///     .with_note(record("1", "A", "d", Some("public/1_a.png")))
///     .build();
/// assert!(executor.calls().is_empty());
/// ```
pub struct MockQueryExecutor {
    notes: Mutex<Vec<NoteRecord>>,
    failing: HashSet<&'static str>,
    calls: Mutex<Vec<Operation>>,
    next_id: Mutex<u64>,
}

impl MockQueryExecutor {
    pub fn builder() -> MockQueryExecutorBuilder {
        MockQueryExecutorBuilder::new()
    }

    /// Every operation executed so far, in order
    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|op| op.name() == name).count()
    }

    /// Current backend state
    pub fn stored_notes(&self) -> Vec<NoteRecord> {
        self.notes.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for MockQueryExecutor {
    async fn execute(&self, operation: &Operation) -> Result<Value, DomainError> {
        self.calls.lock().unwrap().push(operation.clone());

        if self.failing.contains(operation.name()) {
            return Err(DomainError::Remote(format!(
                "{} rejected by mock backend",
                operation.name()
            )));
        }

        let mut notes = self.notes.lock().unwrap();
        match operation {
            Operation::ListNotes => Ok(json!({ "listNotes": { "items": &*notes } })),
            Operation::CreateNote(draft) => {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                let created = NoteRecord {
                    id: format!("created-{}", *next_id),
                    name: draft.name.clone(),
                    description: draft.description.clone(),
                    image: draft.image.clone(),
                    created_at: None,
                    updated_at: None,
                };
                notes.push(created.clone());
                Ok(json!({ "createNote": created }))
            }
            Operation::DeleteNote { id } => {
                notes.retain(|n| &n.id != id);
                Ok(json!({ "deleteNote": { "id": id } }))
            }
        }
    }
}

/// Builder for MockQueryExecutor
pub struct MockQueryExecutorBuilder {
    notes: Vec<NoteRecord>,
    failing: HashSet<&'static str>,
}

impl MockQueryExecutorBuilder {
    pub fn new() -> Self {
        Self {
            notes: vec![],
            failing: HashSet::new(),
        }
    }

    /// Add a note the backend already stores
    pub fn with_note(mut self, note: NoteRecord) -> Self {
        self.notes.push(note);
        self
    }

    /// Make every call of the named operation fail, e.g. `"DeleteNote"`
    pub fn failing(mut self, operation_name: &'static str) -> Self {
        self.failing.insert(operation_name);
        self
    }

    pub fn build(self) -> MockQueryExecutor {
        MockQueryExecutor {
            notes: Mutex::new(self.notes),
            failing: self.failing,
            calls: Mutex::new(vec![]),
            next_id: Mutex::new(0),
        }
    }
}

impl Default for MockQueryExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Upload { key: String, content_type: String, size: usize },
    ResolveUrl(String),
    Remove(String),
}

/// In-memory object store recording every call it receives
pub struct MockObjectStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_upload: bool,
    fail_remove: bool,
    fail_resolve: HashSet<String>,
    resolve_delays: HashMap<String, Duration>,
    calls: Mutex<Vec<StorageCall>>,
}

impl MockObjectStorage {
    pub fn builder() -> MockObjectStorageBuilder {
        MockObjectStorageBuilder::new()
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    /// The URL this mock hands out for a key
    pub fn url_for(key: &str) -> String {
        format!(
            "{}/{}?X-Amz-Expires=900&X-Amz-Signature=mock",
            MOCK_STORAGE_HOST,
            utf8_percent_encode(key, KEY_ENCODE_SET)
        )
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), DomainError> {
        self.calls.lock().unwrap().push(StorageCall::Upload {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: bytes.len(),
        });
        if self.fail_upload {
            return Err(DomainError::Storage(format!("upload of {key} failed")));
        }
        self.objects.lock().unwrap().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn resolve_url(&self, key: &str) -> Result<String, DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(StorageCall::ResolveUrl(key.to_string()));
        if let Some(delay) = self.resolve_delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_resolve.contains(key) {
            return Err(DomainError::Storage(format!("cannot resolve {key}")));
        }
        Ok(Self::url_for(key))
    }

    async fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.calls
            .lock()
            .unwrap()
            .push(StorageCall::Remove(key.to_string()));
        if self.fail_remove {
            return Err(DomainError::Storage(format!("remove of {key} failed")));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Builder for MockObjectStorage
pub struct MockObjectStorageBuilder {
    objects: HashMap<String, Vec<u8>>,
    fail_upload: bool,
    fail_remove: bool,
    fail_resolve: HashSet<String>,
    resolve_delays: HashMap<String, Duration>,
}

impl MockObjectStorageBuilder {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            fail_upload: false,
            fail_remove: false,
            fail_resolve: HashSet::new(),
            resolve_delays: HashMap::new(),
        }
    }

    pub fn with_object(mut self, key: &str) -> Self {
        self.objects.insert(key.to_string(), vec![1, 2, 3]);
        self
    }

    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    pub fn failing_resolve(mut self, key: &str) -> Self {
        self.fail_resolve.insert(key.to_string());
        self
    }

    /// Delay resolution of one key, to reorder completions
    pub fn with_resolve_delay(mut self, key: &str, millis: u64) -> Self {
        self.resolve_delays
            .insert(key.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn build(self) -> MockObjectStorage {
        MockObjectStorage {
            objects: Mutex::new(self.objects),
            fail_upload: self.fail_upload,
            fail_remove: self.fail_remove,
            fail_resolve: self.fail_resolve,
            resolve_delays: self.resolve_delays,
            calls: Mutex::new(vec![]),
        }
    }
}

impl Default for MockObjectStorageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Session holder kept in memory
#[derive(Default)]
pub struct MockAuthenticator {
    session: Mutex<Option<Session>>,
}

impl MockAuthenticator {
    pub fn signed_in(username: &str) -> Self {
        Self {
            session: Mutex::new(Some(Session {
                username: username.to_string(),
                token: "test-token".to_string(),
            })),
        }
    }
}

impl Authenticator for MockAuthenticator {
    fn session(&self) -> Result<Session, DomainError> {
        self.session
            .lock()
            .unwrap()
            .clone()
            .ok_or(DomainError::NotAuthenticated)
    }

    fn sign_in(&self, session: &Session) -> Result<(), DomainError> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn sign_out(&self) -> Result<(), DomainError> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// Shorthand for a backend record
pub fn record(id: &str, name: &str, description: &str, image: Option<&str>) -> NoteRecord {
    NoteRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        image: image.map(str::to_string),
        created_at: None,
        updated_at: None,
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "mio", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

pub fn print_active_env_vars() {
    for var in TEST_ENV_VARS {
        if let Ok(value) = env::var(var) {
            println!("{var}={value}");
        } else {
            println!("{var} is not set");
        }
    }
}
