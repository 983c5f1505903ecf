//! Mapping of fatal errors to process exit codes.

use crate::archive::ArchiveError;
use crate::media::twitter_api::ApiError;

/// Missing or malformed command-line arguments, or any unclassified failure.
pub const EXIT_FAILURE: i32 = 1;
/// `USER_ID` is not an integer.
pub const EXIT_BAD_USER_ID: i32 = 2;
/// A file could not be read or written.
pub const EXIT_FILESYSTEM: i32 = 3;
/// The archive container or one of its entries is corrupt.
pub const EXIT_CORRUPT_ARCHIVE: i32 = 4;

impl ArchiveError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Open { .. } | Self::NotAFile { .. } => EXIT_FILESYSTEM,
            Self::Corrupt { .. }
            | Self::MissingEntry { .. }
            | Self::Read { .. }
            | Self::MalformedEntry { .. } => EXIT_CORRUPT_ARCHIVE,
        }
    }
}

/// Exit code for a fatal pipeline error, from the first recognised cause.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(archive_err) = cause.downcast_ref::<ArchiveError>() {
            return archive_err.exit_code();
        }
        if cause.downcast_ref::<ApiError>().is_some() {
            return EXIT_FAILURE;
        }
        if cause.downcast_ref::<std::io::Error>().is_some() {
            return EXIT_FILESYSTEM;
        }
    }
    EXIT_FAILURE
}
