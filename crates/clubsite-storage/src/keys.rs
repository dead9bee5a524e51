//! Reference classification and object name generation shared by all backends.

use percent_encoding::percent_decode_str;
use rand::Rng;

use crate::traits::{StorageError, StorageResult};

/// URL path prefix under which local uploads are served
pub const LOCAL_URL_PREFIX: &str = "/uploads/";

/// Folder used when the caller does not name one
pub const DEFAULT_FOLDER: &str = "uploads";

/// Host of unsigned public GCS object URLs
pub const GCS_PUBLIC_HOST: &str = "storage.googleapis.com";

const MAX_RANDOM_SUFFIX: u32 = 1_000_000_000;

/// What a stored reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Nothing stored (optional images, cleared fields)
    Empty,
    /// Absolute `http://` or `https://` URL: legacy or externally hosted assets
    External,
    /// Local upload path, already web-servable
    Local,
    /// Bucket-relative object key
    Cloud,
}

impl ReferenceKind {
    pub fn classify(reference: &str) -> Self {
        if reference.is_empty() {
            ReferenceKind::Empty
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            ReferenceKind::External
        } else if reference.starts_with(LOCAL_URL_PREFIX) {
            ReferenceKind::Local
        } else {
            ReferenceKind::Cloud
        }
    }
}

/// Extension of the file name, dot included. Empty when the base name has no
/// extension or is a dotfile.
pub fn extension_of(original_name: &str) -> &str {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[idx..],
        _ => "",
    }
}

/// `{unix millis}-{random 0..=1e9}{ext}`.
///
/// Unique in practice, not guaranteed: two uploads only collide when they land in
/// the same millisecond and draw the same random number.
pub fn generate_object_name(original_name: &str) -> String {
    let timestamp = chrono::Utc::now().timestamp_millis();
    let random_id = rand::rng().random_range(0..=MAX_RANDOM_SUFFIX);
    format!("{}-{}{}", timestamp, random_id, extension_of(original_name))
}

/// Validate a caller-supplied folder and strip trailing slashes.
///
/// Folders are not whitelisted, but they must stay inside the storage root and map
/// to the same key on every backend.
pub fn normalize_folder(folder: &str) -> StorageResult<&str> {
    if folder.starts_with('/') || folder.starts_with('\\') {
        return Err(StorageError::InvalidKey(format!(
            "Folder must be relative: {}",
            folder
        )));
    }

    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        return Ok(DEFAULT_FOLDER);
    }

    if folder
        .split(['/', '\\'])
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(StorageError::InvalidKey(format!(
            "Folder contains an empty or relative segment: {}",
            folder
        )));
    }

    Ok(folder)
}

/// Reduce a reference to the form the delete path understands: the decoded object
/// key for public or signed URLs of `bucket`, and no query string.
pub fn normalize_reference(reference: &str, bucket: Option<&str>) -> String {
    if let Some(bucket) = bucket {
        let marker = format!("{}/{}/", GCS_PUBLIC_HOST, bucket);
        if let Some((_, key)) = reference.split_once(marker.as_str()) {
            let key = strip_query(key);
            return match percent_decode_str(key).decode_utf8() {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => key.to_string(),
            };
        }
    }

    strip_query(reference).to_string()
}

fn strip_query(reference: &str) -> &str {
    match reference.split_once('?') {
        Some((path, _query)) => path,
        None => reference,
    }
}

/// Unsigned public URL of an object. Only works for publicly readable buckets.
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{}/{}/{}", GCS_PUBLIC_HOST, bucket, key)
}
