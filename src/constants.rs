// src/constants.rs
//
// Application-wide constants extracted from magic numbers throughout the codebase.
// Each constant is documented with its purpose and usage context.

/// Largest image accepted for upload: 5 MiB.
///
/// Used in: `domain/image_key.rs`
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for note images.
///
/// Used in: `domain/image_key.rs`
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Marker that precedes the object key in a resolved storage URL.
///
/// Display URLs look like `https://<bucket>.s3.<region>.amazonaws.com/<key>?<signature>`.
///
/// Used in: `domain/image_key.rs`
pub const STORAGE_HOST_MARKER: &str = ".amazonaws.com/";

/// Upper bound on a key recovered from a URL. Longer input is rejected.
///
/// Used in: `domain/image_key.rs`
pub const MAX_DECODED_KEY_LEN: usize = 1024;

/// Default namespace for uploaded objects.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_KEY_PREFIX: &str = "public";

/// Default lifetime of presigned display URLs, in seconds.
///
/// Used in: `infrastructure/config.rs`
pub const DEFAULT_URL_EXPIRY_SECS: u64 = 900;

/// Delay in milliseconds after launching the browser before the temp file may go away.
///
/// The browser needs a brief moment to read the file. Without this delay, the
/// temp directory can be dropped before the page has loaded.
///
/// Used in: `infrastructure/renderer.rs`
pub const BROWSER_LAUNCH_DELAY_MS: u64 = 500;
