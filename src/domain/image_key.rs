// src/domain/image_key.rs
//
// Mapping between uploaded files, storage keys and resolved display URLs.
use crate::constants::{
    ACCEPTED_IMAGE_TYPES, MAX_DECODED_KEY_LEN, MAX_IMAGE_BYTES, STORAGE_HOST_MARKER,
};
use crate::domain::{ImageFile, ValidationError};
use percent_encoding::percent_decode_str;

/// Check type and size of a file before anything is uploaded
pub fn validate_image(file: &ImageFile) -> Result<(), ValidationError> {
    let content_type = file.content_type.to_ascii_lowercase();
    if !ACCEPTED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(ValidationError::UnsupportedImageType(
            file.content_type.clone(),
        ));
    }
    if file.size() > MAX_IMAGE_BYTES {
        return Err(ValidationError::ImageTooLarge {
            size: file.size(),
            limit: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Build the storage key for an upload: `<prefix>/<millis>_<filename>`.
///
/// Two uploads of the same filename within one millisecond get the same key.
pub fn encode_upload_key(prefix: &str, timestamp_millis: i64, filename: &str) -> String {
    let filename: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let prefix = prefix.trim_matches('/');

    if prefix.is_empty() {
        format!("{timestamp_millis}_{filename}")
    } else {
        format!("{prefix}/{timestamp_millis}_{filename}")
    }
}

/// Recover the storage key embedded in a resolved display URL.
///
/// Takes everything between the storage host marker and the first `?`,
/// percent-decodes it and returns `None` for anything that does not yield a
/// plausible key.
pub fn decode_key_from_url(url: &str) -> Option<String> {
    let start = url.find(STORAGE_HOST_MARKER)? + STORAGE_HOST_MARKER.len();
    let rest = &url[start..];
    let encoded = rest.split_once('?').map_or(rest, |(path, _)| path);

    let key = percent_decode_str(encoded).decode_utf8().ok()?;
    if key.is_empty() || key.chars().count() > MAX_DECODED_KEY_LEN {
        return None;
    }
    Some(key.into_owned())
}
