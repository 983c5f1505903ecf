//! Helpers for building export archives in tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use serde_json::{json, Value};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Builder for an export zip with a time index and monthly post entries.
#[derive(Debug, Default)]
pub struct ExportBuilder {
    index: Vec<Value>,
    entries: Vec<(String, String)>,
}

impl ExportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a monthly entry. Adding the same month twice creates a second file.
    pub fn month(mut self, year: i32, month: u32, posts: &[Value]) -> Self {
        let file_name = format!("data/js/tweets/{year:04}_{month:02}_{}.js", self.entries.len());
        self.index.push(json!({
            "file_name": file_name,
            "year": year,
            "month": month,
            "var_name": format!("tweets_{year:04}_{month:02}"),
            "tweet_count": posts.len(),
        }));
        self.entries.push((
            file_name,
            format!(
                "Grailbird.data.tweets_{year:04}_{month:02} = \n{}",
                serde_json::to_string_pretty(&Value::Array(posts.to_vec())).unwrap()
            ),
        ));
        self
    }

    pub fn write(self, path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let mut add = |name: &str, body: &str| {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        };
        add(
            "data/js/user_details.js",
            r#"var user_details =  {"screen_name": "bird", "id": "7", "created_at": "2014-01-01"}"#,
        );
        add(
            "data/js/payload_details.js",
            r#"var payload_details =  {"tweets": 3, "created_at": "2021-06-01 00:00:00 +0000", "lang": "ja"}"#,
        );
        add(
            "data/js/tweet_index.js",
            &format!(
                "var tweet_index =  {}",
                serde_json::to_string(&self.index).unwrap()
            ),
        );
        for (name, body) in &self.entries {
            add(name, body);
        }
        zip.finish().unwrap();
    }
}

/// A post by `user_id` with optional image URLs.
pub fn post(id: &str, user_id: i64, text: &str, images: &[&str]) -> Value {
    let media: Vec<Value> = images
        .iter()
        .map(|url| json!({"media_url_https": url, "id_str": format!("m{id}")}))
        .collect();
    json!({
        "id_str": id,
        "user": {"id": user_id, "screen_name": "bird"},
        "text": text,
        "entities": {"urls": [], "media": media},
    })
}

/// A retweet by `carrier_id` of a post by `author_id`.
pub fn retweet(id: &str, carrier_id: i64, inner_id: &str, author_id: i64, text: &str) -> Value {
    json!({
        "id_str": id,
        "user": {"id": carrier_id},
        "text": format!("RT: {text}"),
        "entities": {"urls": []},
        "retweeted_status": {
            "id_str": inner_id,
            "user": {"id": author_id},
            "text": text,
            "entities": {"urls": [{"expanded_url": "https://example.org/a", "display_url": "example.org/a"}]}
        }
    })
}
