//! Uploaded file descriptors and upload checks.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]+(?:\.[0-9]+)?)\s*([BKMGT]?)(?:I?B)?\s*$")
        .expect("size pattern is valid")
});

/// Outcome of an upload as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// The file was received completely.
    #[default]
    Ok,
    /// The file exceeds the server-wide limit.
    IniSize,
    /// The file exceeds the limit declared by the form.
    FormSize,
    /// The file was only partially received.
    Partial,
    /// No file was sent.
    NoFile,
    /// No temporary directory was available.
    NoTmpDir,
    /// The file could not be written to disk.
    CantWrite,
    /// An extension stopped the upload.
    Extension,
}

/// One entry of a request's uploaded-file table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Filename as sent by the client.
    pub name: String,
    /// MIME type as declared by the client.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Location of the received bytes, if stored.
    pub tmp_path: Option<PathBuf>,
    /// Transfer status.
    pub status: UploadStatus,
}

impl UploadedFile {
    /// Creates a successfully received upload.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            tmp_path: None,
            status: UploadStatus::Ok,
        }
    }

    /// Creates the entry a browser sends for an empty file input.
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            mime_type: String::new(),
            size: 0,
            tmp_path: None,
            status: UploadStatus::NoFile,
        }
    }

    /// Sets where the received bytes are stored.
    #[must_use]
    pub fn tmp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.tmp_path = Some(path.into());
        self
    }

    /// Sets the transfer status.
    #[must_use]
    pub fn status(mut self, status: UploadStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the lowercase extension of the client filename.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
    }
}

/// Returns whether a file was actually received.
pub fn not_empty(file: &UploadedFile) -> bool {
    file.status == UploadStatus::Ok && !file.name.is_empty()
}

/// Returns whether the upload is an image.
///
/// The stored bytes are sniffed when available. Without them the declared
/// MIME type decides.
pub fn is_image(file: &UploadedFile) -> bool {
    if !not_empty(file) {
        return false;
    }

    match &file.tmp_path {
        Some(path) => read_signature(path).is_some_and(|head| image_signature(&head)),
        None => file.mime_type.starts_with("image/"),
    }
}

/// Returns whether the upload's extension is one of `allowed`.
pub fn type_allowed<S: AsRef<str>>(file: &UploadedFile, allowed: &[S]) -> bool {
    if !not_empty(file) {
        return true;
    }

    file.extension().is_some_and(|ext| {
        allowed
            .iter()
            .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(&ext))
    })
}

/// Returns whether the upload fits in `max_size` (e.g. `"2M"`).
///
/// An unparseable limit rejects the file.
pub fn size_allowed(file: &UploadedFile, max_size: &str) -> bool {
    if file.status == UploadStatus::IniSize {
        return false;
    }
    if file.status != UploadStatus::Ok {
        return true;
    }

    parse_size(max_size).is_some_and(|max| file.size <= max)
}

/// Converts a human readable size (`"512K"`, `"1.5M"`, `"2048"`) to bytes.
pub fn parse_size(size: &str) -> Option<u64> {
    let caps = SIZE_PATTERN.captures(size)?;
    let number: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps
        .get(2)
        .map(|m| m.as_str().to_ascii_uppercase())
        .unwrap_or_default();

    let exponent = match unit.as_str() {
        "" | "B" => 0,
        "K" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        _ => return None,
    };

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let bytes = (number * 1024f64.powi(exponent)).round() as u64;
    Some(bytes)
}

fn read_signature(path: &Path) -> Option<Vec<u8>> {
    let mut head = Vec::with_capacity(12);
    File::open(path)
        .ok()?
        .take(12)
        .read_to_end(&mut head)
        .ok()?;
    Some(head)
}

fn image_signature(head: &[u8]) -> bool {
    head.starts_with(b"\x89PNG\r\n\x1a\n")
        || head.starts_with(b"\xff\xd8\xff")
        || head.starts_with(b"GIF87a")
        || head.starts_with(b"GIF89a")
        || head.starts_with(b"BM")
        || (head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP")
}
