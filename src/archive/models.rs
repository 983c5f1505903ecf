//! Typed records for the JSON payloads found inside an export archive.
//!
//! Every collection field defaults to empty so that posts missing `entities`,
//! `media` or `retweeted_status` deserialize cleanly. Older posts carry
//! explicit `null`s (`"expanded_url": null`), which read as the same default.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One month of posts listed in the time index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeIndexEntry {
    pub year: i32,
    pub month: u32,
    pub file_name: String,
    #[serde(default)]
    pub tweet_count: Option<u64>,
}

impl TimeIndexEntry {
    /// `YYYY/MM` key used for month page paths.
    #[must_use]
    pub fn date_key(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }
}

/// Owner details from `user_details.js`. Only logged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserDetails {
    #[serde(default)]
    pub screen_name: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
}

/// Export statistics from `payload_details.js`. Only logged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayloadDetails {
    #[serde(default)]
    pub tweets: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserRef {
    pub id: i64,
    #[serde(default)]
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UrlEntity {
    #[serde(default, deserialize_with = "null_as_default")]
    pub expanded_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoVariant {
    #[serde(default)]
    pub bitrate: Option<i64>,
    #[serde(default)]
    pub content_type: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub variants: Vec<VideoVariant>,
}

impl VideoInfo {
    /// Variant with the highest bitrate. A missing bitrate ranks as `-1`.
    #[must_use]
    pub fn best_variant(&self) -> Option<&VideoVariant> {
        // max_by_key keeps the last maximum; ties should keep the first listed.
        self.variants
            .iter()
            .rev()
            .max_by_key(|v| v.bitrate.unwrap_or(-1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MediaEntity {
    #[serde(default)]
    pub id_str: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_url_https: String,
    #[serde(default)]
    pub video_info: Option<VideoInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Entities {
    #[serde(default, deserialize_with = "null_as_default")]
    pub urls: Vec<UrlEntity>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub media: Vec<MediaEntity>,
}

/// A post ("tweet") as stored in a monthly entry or returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Post {
    pub id_str: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: UserRef,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Entities,
    #[serde(default)]
    pub extended_entities: Option<Entities>,
    #[serde(default)]
    pub retweeted_status: Option<Box<Post>>,
}

impl Post {
    /// The post whose author, text and entities are authoritative.
    ///
    /// A retweet is only a carrier for the embedded original.
    #[must_use]
    pub fn effective(&self) -> &Post {
        self.retweeted_status.as_deref().unwrap_or(self)
    }

    #[must_use]
    pub fn effective_user_id(&self) -> i64 {
        self.effective().user.id
    }
}

/// A post together with the JSON it was parsed from.
#[derive(Debug, Clone)]
pub struct ArchivedPost {
    pub post: Post,
    pub raw: Value,
}

impl ArchivedPost {
    /// Parse a single post, keeping its raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not have the shape of a post.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let post = Post::deserialize(&raw)?;
        Ok(Self { post, raw })
    }

    /// Raw JSON of the effective post.
    #[must_use]
    pub fn effective_raw(&self) -> &Value {
        self.raw.get("retweeted_status").unwrap_or(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_effective_prefers_retweeted_status() {
        let post: Post = serde_json::from_value(json!({
            "id_str": "1",
            "user": {"id": 1},
            "text": "RT carrier",
            "retweeted_status": {"id_str": "2", "user": {"id": 2}, "text": "x"}
        }))
        .unwrap();

        assert_eq!(post.effective_user_id(), 2);
        assert_eq!(post.effective().text, "x");
        assert_eq!(post.effective().id_str, "2");
    }

    #[test]
    fn test_missing_entities_default_to_empty() {
        let post: Post =
            serde_json::from_value(json!({"id_str": "5", "user": {"id": 9}, "text": "hi"}))
                .unwrap();
        assert!(post.entities.urls.is_empty());
        assert!(post.entities.media.is_empty());
        assert!(post.extended_entities.is_none());
        assert_eq!(post.effective_user_id(), 9);
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let post: Post = serde_json::from_value(json!({
            "id_str": "5",
            "user": {"id": 9},
            "text": null,
            "entities": {
                "urls": [{"expanded_url": null, "display_url": null, "url": "http://t.co/x"}],
                "media": null
            }
        }))
        .unwrap();
        assert_eq!(post.text, "");
        assert_eq!(post.entities.urls, vec![UrlEntity::default()]);
        assert!(post.entities.media.is_empty());

        let null_entities: Post =
            serde_json::from_value(json!({"id_str": "6", "user": {"id": 9}, "entities": null}))
                .unwrap();
        assert_eq!(null_entities.entities, Entities::default());
    }

    #[test]
    fn test_best_variant_prefers_highest_bitrate() {
        let info: VideoInfo = serde_json::from_value(json!({
            "variants": [
                {"content_type": "application/x-mpegURL", "url": "https://v/playlist.m3u8"},
                {"bitrate": 832000, "url": "https://v/low.mp4"},
                {"bitrate": 2176000, "url": "https://v/high.mp4"}
            ]
        }))
        .unwrap();
        assert_eq!(info.best_variant().unwrap().url, "https://v/high.mp4");
    }

    #[test]
    fn test_best_variant_without_bitrates_keeps_first() {
        let info: VideoInfo = serde_json::from_value(json!({
            "variants": [{"url": "https://v/a.m3u8"}, {"url": "https://v/b.m3u8"}]
        }))
        .unwrap();
        assert_eq!(info.best_variant().unwrap().url, "https://v/a.m3u8");
        assert!(VideoInfo::default().best_variant().is_none());
    }

    #[test]
    fn test_effective_raw() {
        let archived = ArchivedPost::from_value(json!({
            "id_str": "1",
            "user": {"id": 1},
            "retweeted_status": {"id_str": "2", "user": {"id": 2}, "extra": true}
        }))
        .unwrap();
        assert_eq!(archived.effective_raw()["extra"], json!(true));
    }

    #[test]
    fn test_date_key_is_zero_padded() {
        let entry = TimeIndexEntry {
            year: 2021,
            month: 5,
            file_name: "data/js/tweets/2021_05.js".to_string(),
            tweet_count: None,
        };
        assert_eq!(entry.date_key(), "2021/05");
    }
}
