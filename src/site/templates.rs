//! Pure page renderers.
//!
//! Each page kind is one function from plain data to an HTML string. All
//! pages share [`layout`], which emits the language, title, canonical link
//! and cache-busted stylesheet link.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::archive::UrlEntity;
use crate::constants::{
    NO_MEDIA_PLACEHOLDER, NO_TEXT_PLACEHOLDER, NO_URLS_PLACEHOLDER, STATUS_URL_BASE,
    STYLESHEET_PATH,
};

/// How post text is inserted into pages.
///
/// Export text arrives already entity-encoded, so `Raw` inserts it verbatim.
/// `Escaped` HTML-escapes it everywhere it appears. The JSON payload block is
/// escaped in both modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEscaping {
    #[default]
    Raw,
    Escaped,
}

/// Values shared by every page of one run.
#[derive(Debug, Clone)]
pub struct PageContext<'a> {
    pub lang: &'a str,
    pub site_name: &'a str,
    pub site_title: &'a str,
    pub canonical_root: &'a str,
    pub css_stamp: &'a str,
    pub text_escaping: TextEscaping,
}

/// Data for a single post page.
#[derive(Debug, Clone)]
pub struct StatusPage<'a> {
    pub id_str: &'a str,
    /// `YYYY/MM` of the month the post was listed under.
    pub date_key: &'a str,
    pub text: &'a str,
    pub urls: &'a [UrlEntity],
    pub media_links: &'a [&'a str],
    /// Pretty-printed JSON of the post.
    pub payload: &'a str,
}

/// One post line on a month page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthItem {
    pub id_str: String,
    pub text: String,
}

#[must_use]
pub fn status_href(id_str: &str) -> String {
    format!("/i/status/{id_str}/")
}

#[must_use]
pub fn list_href(key: &str) -> String {
    format!("/i/list/{key}/")
}

fn layout(
    ctx: &PageContext<'_>,
    title: &str,
    canonical_path: &str,
    heading: &str,
    content: &Markup,
) -> String {
    let canonical = format!("{}{canonical_path}", ctx.canonical_root);
    let stylesheet = format!("{STYLESHEET_PATH}?{}", ctx.css_stamp);
    html! {
        (DOCTYPE)
        html lang=(ctx.lang) {
            head {
                meta charset="utf-8";
                meta http-equiv="X-UA-Compatible" content="IE=edge";
                title { (title) }
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                link rel="canonical" href=(canonical);
                link rel="stylesheet" href=(stylesheet);
            }
            body {
                section id="content" {
                    header {
                        h1 class="entry-title" { (heading) }
                    }
                    div class="entry-content entry-content-main" {
                        (content)
                    }
                }
            }
        }
    }
    .into_string()
}

/// Post text, or an italic placeholder when it is blank.
fn post_text(text: &str, escaping: TextEscaping, line_breaks: bool) -> Markup {
    let text = text.trim();
    if text.is_empty() {
        return html! { i { (NO_TEXT_PLACEHOLDER) } };
    }
    match escaping {
        TextEscaping::Raw if line_breaks => PreEscaped(text.replace('\n', "<br>")),
        TextEscaping::Raw => PreEscaped(text.to_string()),
        TextEscaping::Escaped if line_breaks => html! {
            @for (i, line) in text.split('\n').enumerate() {
                @if i > 0 { br; }
                (line)
            }
        },
        TextEscaping::Escaped => html! { (text) },
    }
}

#[must_use]
pub fn render_status_page(ctx: &PageContext<'_>, page: &StatusPage<'_>) -> String {
    let name = format!("status/{}", page.id_str);
    let tw_url = format!("{STATUS_URL_BASE}{}", page.id_str);
    let content = html! {
        h2 { "body" }
        blockquote {
            p { (post_text(page.text, ctx.text_escaping, true)) }
            p { a href=(tw_url) { cite { (tw_url) } } }
        }
        h2 { "media" }
        ul {
            @if page.media_links.is_empty() {
                li { (NO_MEDIA_PLACEHOLDER) }
            }
            @for link in page.media_links {
                li { a href=(link) { (link) } }
            }
        }
        h2 { "urls" }
        ul {
            @if page.urls.is_empty() {
                li { (NO_URLS_PLACEHOLDER) }
            }
            @for url in page.urls {
                li { a href=(url.expanded_url) { (url.display_url) } }
            }
        }
        h2 { "json" }
        pre { (page.payload) }
        a href=(list_href(page.date_key)) { "More information..." }
    };
    layout(
        ctx,
        &format!("{}:{name}", ctx.site_name),
        &status_href(page.id_str),
        &name,
        &content,
    )
}

#[must_use]
pub fn render_month_page(
    ctx: &PageContext<'_>,
    year: i32,
    month: u32,
    items: &[MonthItem],
) -> String {
    let date_key = format!("{year:04}/{month:02}");
    let name = format!("list/{date_key}");
    let content = html! {
        @for item in items {
            h2 { a href=(status_href(&item.id_str)) { "status/" (item.id_str) } }
            blockquote {
                p { (post_text(&item.text, ctx.text_escaping, false)) }
            }
        }
        a href=(list_href(&format!("{year:04}"))) { "More information..." }
    };
    layout(
        ctx,
        &format!("{}:{name}", ctx.site_name),
        &list_href(&date_key),
        &name,
        &content,
    )
}

/// Year page listing `(month, post count)` pairs in the given order.
#[must_use]
pub fn render_year_page(ctx: &PageContext<'_>, year: i32, months: &[(u32, usize)]) -> String {
    let year_key = format!("{year:04}");
    let name = format!("list/{year_key}");
    let content = html! {
        @for (month, count) in months {
            @let date_key = format!("{year:04}/{month:02}");
            h2 { a href=(list_href(&date_key)) { "list/" (date_key) } }
            p { (count) " tweets ..." }
        }
        a href="/i/" { "More information..." }
    };
    layout(
        ctx,
        &format!("{}:{name}", ctx.site_name),
        &list_href(&year_key),
        &name,
        &content,
    )
}

/// Top-level page listing `(year, post count)` pairs, newest year first.
#[must_use]
pub fn render_index_page(ctx: &PageContext<'_>, years: &[(i32, usize)]) -> String {
    let mut years = years.to_vec();
    years.sort_by(|a, b| b.0.cmp(&a.0));
    let content = html! {
        @for (year, count) in &years {
            @let year_key = format!("{year:04}");
            h2 { a href=(list_href(&year_key)) { "list/" (year_key) } }
            p { (count) " tweets ..." }
        }
        a href=".." { "More information..." }
    };
    layout(ctx, ctx.site_title, "/i/", ctx.site_title, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(text_escaping: TextEscaping) -> PageContext<'static> {
        PageContext {
            lang: "ja",
            site_name: "BIRD",
            site_title: "BIRD: Archive",
            canonical_root: "https://example.com",
            css_stamp: "0a1b2c3d",
            text_escaping,
        }
    }

    fn status<'a>(text: &'a str, media: &'a [&'a str], urls: &'a [UrlEntity]) -> StatusPage<'a> {
        StatusPage {
            id_str: "100",
            date_key: "2021/05",
            text,
            urls,
            media_links: media,
            payload: r#"{"text": "<b>hi</b>"}"#,
        }
    }

    #[test]
    fn test_layout_header_block() {
        let html = render_status_page(&ctx(TextEscaping::Raw), &status("hello", &[], &[]));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="ja">"#));
        assert!(html.contains("<title>BIRD:status/100</title>"));
        assert!(html.contains(r#"<link rel="canonical" href="https://example.com/i/status/100/">"#));
        assert!(html.contains(r#"<link rel="stylesheet" href="/i/css/style.min.css?0a1b2c3d">"#));
    }

    #[test]
    fn test_status_page_placeholders() {
        let html = render_status_page(&ctx(TextEscaping::Raw), &status("   \n ", &[], &[]));
        assert!(html.contains("<i>(no text)</i>"));
        assert!(html.contains("<li>(no media)</li>"));
        assert!(html.contains("<li>(no urls)</li>"));
    }

    #[test]
    fn test_status_page_links() {
        let urls = [UrlEntity {
            expanded_url: "https://example.org/page".to_string(),
            display_url: "example.org/page".to_string(),
        }];
        let media = ["/i/images/media/a.jpg"];
        let html = render_status_page(&ctx(TextEscaping::Raw), &status("hello", &media, &urls));
        assert!(html.contains(r#"<a href="/i/images/media/a.jpg">/i/images/media/a.jpg</a>"#));
        assert!(html.contains(r#"<a href="https://example.org/page">example.org/page</a>"#));
        assert!(html.contains(r#"<a href="https://twitter.com/i/status/100"><cite>https://twitter.com/i/status/100</cite></a>"#));
        assert!(html.contains(r#"<a href="/i/list/2021/05/">More information...</a>"#));
        assert!(!html.contains("(no media)"));
        assert!(!html.contains("(no urls)"));
    }

    #[test]
    fn test_payload_is_always_escaped() {
        for mode in [TextEscaping::Raw, TextEscaping::Escaped] {
            let html = render_status_page(&ctx(mode), &status("hello", &[], &[]));
            assert!(html.contains("<pre>{&quot;text&quot;: &quot;&lt;b&gt;hi&lt;/b&gt;&quot;}</pre>"));
        }
    }

    #[test]
    fn test_raw_text_is_inserted_verbatim() {
        let html = render_status_page(
            &ctx(TextEscaping::Raw),
            &status("a &amp; <b>b</b>\nline", &[], &[]),
        );
        assert!(html.contains("<p>a &amp; <b>b</b><br>line</p>"));

        let items = [MonthItem {
            id_str: "1".to_string(),
            text: "<b>bold</b>\nnext".to_string(),
        }];
        let html = render_month_page(&ctx(TextEscaping::Raw), 2021, 5, &items);
        assert!(html.contains("<p><b>bold</b>\nnext</p>"));
    }

    #[test]
    fn test_escaped_text_is_escaped_in_both_places() {
        let html = render_status_page(
            &ctx(TextEscaping::Escaped),
            &status("<b>b</b>\nline", &[], &[]),
        );
        assert!(html.contains("<p>&lt;b&gt;b&lt;/b&gt;<br>line</p>"));

        let items = [MonthItem {
            id_str: "1".to_string(),
            text: "<b>bold</b>".to_string(),
        }];
        let html = render_month_page(&ctx(TextEscaping::Escaped), 2021, 5, &items);
        assert!(html.contains("<p>&lt;b&gt;bold&lt;/b&gt;</p>"));
    }

    #[test]
    fn test_month_page() {
        let items = [
            MonthItem {
                id_str: "2".to_string(),
                text: "second".to_string(),
            },
            MonthItem {
                id_str: "1".to_string(),
                text: String::new(),
            },
        ];
        let html = render_month_page(&ctx(TextEscaping::Raw), 2021, 5, &items);
        assert!(html.contains("<title>BIRD:list/2021/05</title>"));
        assert!(html.contains(r#"href="https://example.com/i/list/2021/05/""#));
        let second = html.find(r#"<a href="/i/status/2/">status/2</a>"#).unwrap();
        let first = html.find(r#"<a href="/i/status/1/">status/1</a>"#).unwrap();
        assert!(second < first);
        assert!(html.contains("<i>(no text)</i>"));
        assert!(html.contains(r#"<a href="/i/list/2021/">More information...</a>"#));
    }

    #[test]
    fn test_year_page() {
        let html = render_year_page(&ctx(TextEscaping::Raw), 2021, &[(5, 1), (4, 0)]);
        assert!(html.contains(r#"<a href="/i/list/2021/05/">list/2021/05</a>"#));
        assert!(html.contains("<p>1 tweets ...</p>"));
        assert!(html.contains("<p>0 tweets ...</p>"));
        assert!(html.contains(r#"<a href="/i/">More information...</a>"#));
    }

    #[test]
    fn test_index_page_sorts_years_descending() {
        let html = render_index_page(&ctx(TextEscaping::Raw), &[(2019, 3), (2021, 1), (2020, 2)]);
        let y2021 = html.find("list/2021<").unwrap();
        let y2020 = html.find("list/2020<").unwrap();
        let y2019 = html.find("list/2019<").unwrap();
        assert!(y2021 < y2020 && y2020 < y2019);
        assert!(html.contains("<title>BIRD: Archive</title>"));
        assert!(html.contains(r#"href="https://example.com/i/""#));
    }
}
