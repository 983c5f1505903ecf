//! Reader for the export archive.
//!
//! The export is a zip container whose interesting entries are JavaScript
//! files of the form `<assignment prefix><JSON value>`. The prefix is never
//! interpreted, only stripped.

pub mod models;

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::constants::{PAYLOAD_DETAILS_ENTRY, TWEET_INDEX_ENTRY, USER_DETAILS_ENTRY};
pub use models::{
    ArchivedPost, Entities, MediaEntity, PayloadDetails, Post, TimeIndexEntry, UrlEntity,
    UserDetails, UserRef, VideoInfo, VideoVariant,
};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("archive path is not a file: {path}")]
    NotAFile { path: PathBuf },
    #[error("corrupt archive {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
    #[error("archive entry not found: {name}")]
    MissingEntry { name: String },
    #[error("failed to read archive entry {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed archive entry {name}: {reason}")]
    MalformedEntry { name: String, reason: String },
}

/// A JSON value parsed out of a prefixed entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixedJson {
    pub prefix: String,
    pub value: Value,
}

/// Split `<prefix><JSON>` at the first `[`, `{` or `"` and parse the rest.
///
/// # Errors
///
/// Returns a description of the problem if no JSON start character exists or
/// the remainder is not valid JSON.
pub fn split_prefixed_json(data: &str) -> Result<PrefixedJson, String> {
    let start = data
        .find(&['[', '{', '"'][..])
        .ok_or_else(|| "no JSON value found".to_string())?;
    let (prefix, body) = data.split_at(start);
    let value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    Ok(PrefixedJson {
        prefix: prefix.to_string(),
        value,
    })
}

/// An open export archive.
pub struct ExportArchive<R = File> {
    inner: ZipArchive<R>,
    path: PathBuf,
}

impl ExportArchive<File> {
    /// Open the archive at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Open`] or [`ArchiveError::NotAFile`] if the file
    /// cannot be opened, and [`ArchiveError::Corrupt`] if it is not a valid zip.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let metadata = std::fs::metadata(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.is_dir() {
            return Err(ArchiveError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_path(file, path.to_path_buf())
    }
}

impl<R: Read + Seek> ExportArchive<R> {
    /// Wrap an in-memory or otherwise already-open container.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Corrupt`] if the reader is not a valid zip.
    pub fn from_reader(reader: R) -> Result<Self, ArchiveError> {
        Self::with_path(reader, PathBuf::from("<memory>"))
    }

    fn with_path(reader: R, path: PathBuf) -> Result<Self, ArchiveError> {
        // The reader is already open, so an I/O error here means a truncated
        // or damaged container.
        match ZipArchive::new(reader) {
            Ok(inner) => Ok(Self { inner, path }),
            Err(source) => Err(ArchiveError::Corrupt { path, source }),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read an entry's full contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or cannot be decompressed.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let mut file = match self.inner.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(ArchiveError::MissingEntry {
                    name: name.to_string(),
                })
            }
            Err(ZipError::Io(source)) => {
                return Err(ArchiveError::Read {
                    name: name.to_string(),
                    source,
                })
            }
            Err(e) => {
                return Err(ArchiveError::MalformedEntry {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            }
        };
        let mut buf = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut buf)
            .map_err(|source| ArchiveError::Read {
                name: name.to_string(),
                source,
            })?;
        Ok(buf)
    }

    /// Read an entry and parse it as prefixed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::MalformedEntry`] if the entry is not UTF-8, has
    /// no JSON start character, or does not parse.
    pub fn read_prefixed_json(&mut self, name: &str) -> Result<PrefixedJson, ArchiveError> {
        let bytes = self.read_entry(name)?;
        let text = String::from_utf8(bytes).map_err(|e| ArchiveError::MalformedEntry {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        let parsed = split_prefixed_json(&text).map_err(|reason| ArchiveError::MalformedEntry {
            name: name.to_string(),
            reason,
        })?;
        debug!(entry = %name, prefix = %parsed.prefix.trim(), "Parsed archive entry");
        Ok(parsed)
    }

    fn read_typed<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, ArchiveError> {
        let parsed = self.read_prefixed_json(name)?;
        serde_json::from_value(parsed.value).map_err(|e| ArchiveError::MalformedEntry {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// The month-indexed entry listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the index entry is missing or malformed.
    pub fn time_index(&mut self) -> Result<Vec<TimeIndexEntry>, ArchiveError> {
        self.read_typed(TWEET_INDEX_ENTRY)
    }

    /// Account owner details.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or malformed.
    pub fn user_details(&mut self) -> Result<UserDetails, ArchiveError> {
        self.read_typed(USER_DETAILS_ENTRY)
    }

    /// Export statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing or malformed.
    pub fn payload_details(&mut self) -> Result<PayloadDetails, ArchiveError> {
        self.read_typed(PAYLOAD_DETAILS_ENTRY)
    }

    /// All posts stored in one monthly entry, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing, is not a JSON array, or holds
    /// something that is not a post.
    pub fn posts(&mut self, file_name: &str) -> Result<Vec<ArchivedPost>, ArchiveError> {
        let parsed = self.read_prefixed_json(file_name)?;
        let Value::Array(items) = parsed.value else {
            return Err(ArchiveError::MalformedEntry {
                name: file_name.to_string(),
                reason: "expected an array of posts".to_string(),
            });
        };
        items
            .into_iter()
            .map(|item| {
                ArchivedPost::from_value(item).map_err(|e| ArchiveError::MalformedEntry {
                    name: file_name.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    /// Log the owner and export statistics, if the archive has them.
    pub fn log_summary(&mut self) {
        if let Ok(user) = self.user_details() {
            debug!(
                screen_name = user.screen_name.as_deref().unwrap_or("?"),
                id = ?user.id,
                "Archive owner"
            );
        }
        if let Ok(stats) = self.payload_details() {
            debug!(
                tweets = stats.tweets.unwrap_or(0),
                created_at = stats.created_at.as_deref().unwrap_or("?"),
                "Archive statistics"
            );
        }
    }
}

impl<R> std::fmt::Debug for ExportArchive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportArchive")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
