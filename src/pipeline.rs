//! One end-to-end conversion run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{info, info_span, warn, Instrument};

use crate::archive::ExportArchive;
use crate::config::Config;
use crate::credentials::Credentials;
use crate::media::twitter_api::TwitterApiClient;
use crate::media::{self, FetchSummary, MediaFetcher, MediaIndexOptions, MediaRef};
use crate::site::assets::install_css_dir;
use crate::site::templates::PageContext;
use crate::site::{SiteMaterializer, SiteSummary};

/// Positional inputs of a run.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub archive_path: PathBuf,
    pub user_id: i64,
    pub canonical_root: String,
    pub media_list_path: PathBuf,
}

/// What a run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub site: SiteSummary,
    pub media: usize,
    pub fetch: FetchSummary,
}

/// Random 8-character lowercase hex token appended to the stylesheet URL.
#[must_use]
pub fn css_version_stamp() -> String {
    const HEX: &[u8] = b"0123456789abcdef";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| char::from(HEX[rng.gen_range(0..HEX.len())]))
        .collect()
}

/// Run the whole conversion.
///
/// Download failures are logged and counted, never returned.
///
/// # Errors
///
/// Returns an error if the archive is unusable, the media index cannot be
/// built or loaded, or any page cannot be written.
pub async fn run(
    config: &Config,
    args: &RunArgs,
    credentials: Option<Credentials>,
) -> Result<RunSummary> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                config.output_dir.display()
            )
        })?;

    install_css_dir(&config.css_dir, &config.output_dir.join("i").join("css")).await?;

    let css_stamp = css_version_stamp();
    info!(stamp = %css_stamp, "Generated stylesheet version stamp");

    let mut archive = ExportArchive::open(&args.archive_path)?;
    archive.log_summary();

    let images_dir = config.images_dir();
    let media_refs = load_media_index(
        config,
        &mut archive,
        &images_dir,
        credentials,
        &args.media_list_path,
    )
    .instrument(info_span!("media_index"))
    .await?;

    let ctx = PageContext {
        lang: &config.site_lang,
        site_name: &config.site_name,
        site_title: &config.site_title,
        canonical_root: &args.canonical_root,
        css_stamp: &css_stamp,
        text_escaping: config.text_escaping,
    };
    let site = info_span!("render_site", user_id = args.user_id).in_scope(|| {
        SiteMaterializer::new(&config.output_dir, ctx).render(
            &mut archive,
            args.user_id,
            &media_refs,
        )
    })?;

    let fetcher = MediaFetcher::new(config.download_concurrency, config.download_timeout)
        .context("Failed to create HTTP client")?;
    let fetch = fetcher
        .fetch_all(&media_refs)
        .instrument(info_span!("fetch_media"))
        .await;
    if fetch.failed > 0 {
        warn!(failed = fetch.failed, "Some media could not be downloaded");
    }

    Ok(RunSummary {
        site,
        media: media_refs.len(),
        fetch,
    })
}

/// Build the media index from the archive when credentials are available,
/// otherwise read it from the media list checkpoint.
async fn load_media_index(
    config: &Config,
    archive: &mut ExportArchive,
    images_dir: &Path,
    credentials: Option<Credentials>,
    media_list_path: &Path,
) -> Result<Vec<MediaRef>> {
    if let Some(credentials) = credentials {
        let api = TwitterApiClient::new(
            &config.twitter_api_base,
            credentials,
            config.download_timeout,
        )?;
        let options = MediaIndexOptions {
            media_account_id: config.media_account_id,
            resolve_videos: config.resolve_videos,
        };
        let refs = media::build_media_index(archive, images_dir, &options, Some(&api)).await?;
        media::write_media_list(media_list_path, &refs)
            .await
            .with_context(|| {
                format!(
                    "Cannot open media list for write: {}",
                    media_list_path.display()
                )
            })?;
        info!(path = %media_list_path.display(), count = refs.len(), "Wrote media list");
        Ok(refs)
    } else {
        let refs = media::read_media_list(media_list_path, images_dir)
            .await
            .with_context(|| {
                format!(
                    "Cannot open media list for read: {}",
                    media_list_path.display()
                )
            })?;
        info!(path = %media_list_path.display(), count = refs.len(), "Read media list");
        Ok(refs)
    }
}
