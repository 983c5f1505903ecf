//! Media index: which remote images and videos belong to which post, and
//! where each one is stored locally.

pub mod fetcher;
pub mod twitter_api;

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info, warn};
use url::Url;

use crate::archive::{ArchiveError, ExportArchive, Post};
use crate::constants::LARGE_RENDITION_SUFFIX;
use twitter_api::{ApiError, TwitterApiClient};

pub use fetcher::{FetchSummary, MediaFetcher};

/// A remote media file and the local path it is saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    pub source_url: String,
    pub local_path: PathBuf,
    /// Site-relative link used on post pages, e.g. `/i/images/media/abc.jpg`.
    pub site_path: String,
    /// Post this media belongs to. Unknown for refs read back from a media list.
    pub owner: Option<String>,
}

impl MediaRef {
    /// Build a ref for `source_url`, stored under `images_dir`.
    ///
    /// Returns `None` if no path can be derived from the URL.
    #[must_use]
    pub fn new(source_url: &str, images_dir: &Path, owner: Option<String>) -> Option<Self> {
        let path = media_url_path(source_url)?;
        Some(Self {
            source_url: source_url.to_string(),
            local_path: images_dir.join(path.trim_start_matches('/')),
            site_path: format!("/i/images{path}"),
            owner,
        })
    }
}

/// Path component of a media URL with any `:large` suffix removed.
///
/// Escaped slashes (`\/`) as found in the export's JavaScript are unescaped
/// first.
#[must_use]
pub fn media_url_path(url: &str) -> Option<String> {
    let unescaped = url.replace(r"\/", "/");
    let parsed = Url::parse(&unescaped).ok()?;
    let path = parsed.path();
    let path = path.strip_suffix(LARGE_RENDITION_SUFFIX).unwrap_or(path);
    if path.is_empty() || path == "/" {
        return None;
    }
    Some(path.to_string())
}

/// Options controlling the media scan.
#[derive(Debug, Clone)]
pub struct MediaIndexOptions {
    /// Account whose posts are scanned. Deliberately independent of the
    /// user id used for page rendering.
    pub media_account_id: i64,
    pub resolve_videos: bool,
}

/// Result of scanning the archive for media.
#[derive(Debug, Default)]
pub struct MediaScan {
    pub refs: Vec<MediaRef>,
    /// Posts whose media looks like a video thumbnail.
    pub video_post_ids: Vec<String>,
}

/// Whether a post contributes media to the index.
#[must_use]
pub fn post_has_indexable_media(post: &Post, media_account_id: i64) -> bool {
    let effective = post.effective();
    effective.user.id == media_account_id
        && !effective.entities.media.is_empty()
        && !effective.text.contains('@')
}

/// Walk every monthly entry and collect image refs in discovery order.
///
/// # Errors
///
/// Returns an error if the time index or any monthly entry cannot be read.
pub fn scan_archive_media<R: Read + Seek>(
    archive: &mut ExportArchive<R>,
    images_dir: &Path,
    media_account_id: i64,
) -> Result<MediaScan, ArchiveError> {
    let mut scan = MediaScan::default();

    for entry in archive.time_index()? {
        for archived in archive.posts(&entry.file_name)? {
            if !post_has_indexable_media(&archived.post, media_account_id) {
                continue;
            }
            let effective = archived.post.effective();
            for media in &effective.entities.media {
                let image_url = &media.media_url_https;
                if image_url.contains("video") {
                    debug!(post_id = %effective.id_str, "Found video thumbnail");
                    scan.video_post_ids.push(effective.id_str.clone());
                }
                let source_url = format!("{image_url}{LARGE_RENDITION_SUFFIX}");
                match MediaRef::new(&source_url, images_dir, Some(effective.id_str.clone())) {
                    Some(media_ref) => {
                        debug!(url = %source_url, "Indexed image");
                        scan.refs.push(media_ref);
                    }
                    None => {
                        warn!(post_id = %effective.id_str, url = %image_url, "Skipping media with unusable URL");
                    }
                }
            }
        }
    }

    Ok(scan)
}

/// Look up posts with video and return a ref for the best variant of each.
///
/// # Errors
///
/// Returns an error if the API lookup fails.
pub async fn resolve_video_refs(
    api: &TwitterApiClient,
    post_ids: &[String],
    images_dir: &Path,
) -> Result<Vec<MediaRef>, ApiError> {
    let mut refs = Vec::new();
    if post_ids.is_empty() {
        return Ok(refs);
    }

    for post in api.lookup_statuses(post_ids).await? {
        let effective = post.effective();
        let Some(extended) = &effective.extended_entities else {
            continue;
        };
        for media in &extended.media {
            let Some(variant) = media.video_info.as_ref().and_then(|v| v.best_variant()) else {
                continue;
            };
            if let Some(media_ref) =
                MediaRef::new(&variant.url, images_dir, Some(effective.id_str.clone()))
            {
                debug!(post_id = %effective.id_str, url = %variant.url, "Indexed video");
                refs.push(media_ref);
            }
        }
    }

    Ok(refs)
}

/// Build the full media index from the archive, optionally resolving videos.
///
/// # Errors
///
/// Returns an error if the archive cannot be read or the API lookup fails.
pub async fn build_media_index<R: Read + Seek>(
    archive: &mut ExportArchive<R>,
    images_dir: &Path,
    options: &MediaIndexOptions,
    api: Option<&TwitterApiClient>,
) -> Result<Vec<MediaRef>> {
    let scan = scan_archive_media(archive, images_dir, options.media_account_id)?;
    let mut refs = scan.refs;
    info!(
        images = refs.len(),
        videos = scan.video_post_ids.len(),
        "Scanned archive for media"
    );

    if options.resolve_videos {
        if let Some(api) = api {
            let videos = resolve_video_refs(api, &scan.video_post_ids, images_dir).await?;
            info!(count = videos.len(), "Resolved video variants");
            refs.extend(videos);
        }
    }

    Ok(refs)
}

/// Write the media list checkpoint: one source URL per line.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn write_media_list(path: &Path, refs: &[MediaRef]) -> std::io::Result<()> {
    let body = refs
        .iter()
        .map(|r| r.source_url.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    tokio::fs::write(path, body).await
}

/// Read a media list checkpoint. Blank lines are ignored.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub async fn read_media_list(path: &Path, images_dir: &Path) -> std::io::Result<Vec<MediaRef>> {
    let body = tokio::fs::read_to_string(path).await?;
    Ok(parse_media_list(&body, images_dir))
}

fn parse_media_list(body: &str, images_dir: &Path) -> Vec<MediaRef> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let media_ref = MediaRef::new(line, images_dir, None);
            if media_ref.is_none() {
                warn!(line = %line, "Ignoring unusable media list line");
            }
            media_ref
        })
        .collect()
}
