//! Site materializer: one page per qualifying post plus month, year and
//! all-time index pages.
//!
//! Output layout under the output root:
//!
//! - `i/status/<id>/index.html`
//! - `i/list/<YYYY>/<MM>/index.html`
//! - `i/list/<YYYY>/index.html`
//! - `i/index.html`

pub mod assets;
pub mod templates;

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::archive::ExportArchive;
use crate::media::MediaRef;
use templates::{
    render_index_page, render_month_page, render_status_page, render_year_page, MonthItem,
    PageContext, StatusPage,
};

/// Counts of what a render wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteSummary {
    pub posts: usize,
    pub months: usize,
    pub years: usize,
}

/// Qualifying posts of one `(year, month)`, in discovery order.
#[derive(Debug)]
struct MonthGroup {
    year: i32,
    month: u32,
    items: Vec<MonthItem>,
}

/// Month groups keyed by `(year, month)`, keeping first-seen order.
#[derive(Debug, Default)]
struct Calendar {
    months: Vec<MonthGroup>,
    slots: HashMap<(i32, u32), usize>,
}

impl Calendar {
    fn month_mut(&mut self, year: i32, month: u32) -> &mut MonthGroup {
        let idx = if let Some(&idx) = self.slots.get(&(year, month)) {
            idx
        } else {
            self.months.push(MonthGroup {
                year,
                month,
                items: Vec::new(),
            });
            let idx = self.months.len() - 1;
            self.slots.insert((year, month), idx);
            idx
        };
        &mut self.months[idx]
    }

    /// `(year, [(month, count)])` in first-seen order.
    fn years(&self) -> Vec<(i32, Vec<(u32, usize)>)> {
        let mut years: Vec<(i32, Vec<(u32, usize)>)> = Vec::new();
        for group in &self.months {
            let entry = (group.month, group.items.len());
            match years.iter_mut().find(|(y, _)| *y == group.year) {
                Some((_, months)) => months.push(entry),
                None => years.push((group.year, vec![entry])),
            }
        }
        years
    }
}

/// Writes the static pages for one archive.
#[derive(Debug)]
pub struct SiteMaterializer<'a> {
    output_root: PathBuf,
    ctx: PageContext<'a>,
}

impl<'a> SiteMaterializer<'a> {
    #[must_use]
    pub fn new(output_root: &Path, ctx: PageContext<'a>) -> Self {
        Self {
            output_root: output_root.to_path_buf(),
            ctx,
        }
    }

    /// Render every page for posts whose effective author is `user_id`.
    ///
    /// Posts are cross-linked to the media refs that name them as owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read or a page cannot be
    /// written.
    pub fn render<R: Read + Seek>(
        &self,
        archive: &mut ExportArchive<R>,
        user_id: i64,
        media: &[MediaRef],
    ) -> Result<SiteSummary> {
        let media_by_post = group_media(media);
        let mut calendar = Calendar::default();
        let mut summary = SiteSummary::default();

        for entry in archive.time_index()? {
            let posts = archive.posts(&entry.file_name)?;
            let date_key = entry.date_key();
            let group = calendar.month_mut(entry.year, entry.month);

            for archived in &posts {
                if archived.post.effective_user_id() != user_id {
                    continue;
                }
                let post = archived.post.effective();
                let payload = serde_json::to_string_pretty(archived.effective_raw())
                    .context("Failed to serialize post payload")?;
                let media_links = media_by_post
                    .get(post.id_str.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or_default();

                let html = render_status_page(
                    &self.ctx,
                    &StatusPage {
                        id_str: &post.id_str,
                        date_key: &date_key,
                        text: &post.text,
                        urls: &post.entities.urls,
                        media_links,
                        payload: &payload,
                    },
                );
                let path = self.status_path(&post.id_str);
                write_page(&path, &html)?;
                debug!(post_id = %post.id_str, "Wrote post page");

                group.items.push(MonthItem {
                    id_str: post.id_str.clone(),
                    text: post.text.clone(),
                });
                summary.posts += 1;
            }
        }

        for group in &calendar.months {
            let html = render_month_page(&self.ctx, group.year, group.month, &group.items);
            write_page(&self.month_path(group.year, group.month), &html)?;
            info!(
                date = %format!("{:04}/{:02}", group.year, group.month),
                posts = group.items.len(),
                "Wrote month list"
            );
        }
        summary.months = calendar.months.len();

        let years = calendar.years();
        for (year, months) in &years {
            let html = render_year_page(&self.ctx, *year, months);
            write_page(&self.year_path(*year), &html)?;
            info!(year, months = months.len(), "Wrote year list");
        }
        summary.years = years.len();

        let totals: Vec<(i32, usize)> = years
            .iter()
            .map(|(year, months)| (*year, months.iter().map(|(_, count)| count).sum()))
            .collect();
        write_page(
            &self.output_root.join("i").join("index.html"),
            &render_index_page(&self.ctx, &totals),
        )?;
        info!(
            posts = summary.posts,
            months = summary.months,
            years = summary.years,
            "Wrote site index"
        );

        Ok(summary)
    }

    fn status_path(&self, id_str: &str) -> PathBuf {
        self.output_root
            .join("i")
            .join("status")
            .join(id_str)
            .join("index.html")
    }

    fn month_path(&self, year: i32, month: u32) -> PathBuf {
        self.output_root
            .join("i")
            .join("list")
            .join(format!("{year:04}"))
            .join(format!("{month:02}"))
            .join("index.html")
    }

    fn year_path(&self, year: i32) -> PathBuf {
        self.output_root
            .join("i")
            .join("list")
            .join(format!("{year:04}"))
            .join("index.html")
    }
}

/// Site links per owning post, in index order.
fn group_media(media: &[MediaRef]) -> HashMap<&str, Vec<&str>> {
    let mut grouped: HashMap<&str, Vec<&str>> = HashMap::new();
    for media_ref in media {
        if let Some(owner) = media_ref.owner.as_deref() {
            grouped
                .entry(owner)
                .or_default()
                .push(media_ref.site_path.as_str());
        }
    }
    grouped
}

fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("Failed to write page: {}", path.display()))
}
