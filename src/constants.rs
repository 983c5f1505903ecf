//! Shared constants used across the application.

/// User agent string used for media downloads and API requests.
pub const FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Account whose posts feed the media index.
///
/// Media scanning filters on this account rather than on the `USER_ID` given on
/// the command line. The two are kept separate on purpose; override with
/// `MEDIA_ACCOUNT_ID`.
pub const DEFAULT_MEDIA_ACCOUNT_ID: i64 = 2_415_471_974;

/// Maximum number of media downloads in flight at once.
pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 32;

/// Suffix requesting the largest rendition of an image.
pub const LARGE_RENDITION_SUFFIX: &str = ":large";

/// Public URL of a single status.
pub const STATUS_URL_BASE: &str = "https://twitter.com/i/status/";

pub const NO_TEXT_PLACEHOLDER: &str = "(no text)";
pub const NO_MEDIA_PLACEHOLDER: &str = "(no media)";
pub const NO_URLS_PLACEHOLDER: &str = "(no urls)";

/// Stylesheet path referenced by every page.
pub const STYLESHEET_PATH: &str = "/i/css/style.min.css";

/// Entry holding the month-indexed file listing.
pub const TWEET_INDEX_ENTRY: &str = "data/js/tweet_index.js";
/// Entry holding the account owner's details.
pub const USER_DETAILS_ENTRY: &str = "data/js/user_details.js";
/// Entry holding export statistics.
pub const PAYLOAD_DETAILS_ENTRY: &str = "data/js/payload_details.js";
