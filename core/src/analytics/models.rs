use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::duration::deserialize_seconds;

/// Videos at or under this many seconds count as Shorts.
pub const SHORT_MAX_SECONDS: u64 = 60;

/// Snapshot of the video being analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(alias = "duration", default, deserialize_with = "deserialize_seconds")]
    pub duration_seconds: u64,
}

impl VideoRecord {
    pub fn is_short(&self) -> bool {
        self.duration_seconds <= SHORT_MAX_SECONDS
    }
}

/// Channel-level totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRecord {
    pub title: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub subscriber_count: u64,
    #[serde(default)]
    pub video_count: u64,
    #[serde(alias = "viewCount", default)]
    pub total_view_count: u64,
}

/// Lightweight projection of a [`VideoRecord`] used for history aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideo {
    pub id: String,
    pub title: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(alias = "duration", default, deserialize_with = "deserialize_seconds")]
    pub duration_seconds: u64,
}

impl ChannelVideo {
    pub fn is_short(&self) -> bool {
        self.duration_seconds <= SHORT_MAX_SECONDS
    }

    /// (likes + comments) / views, or `None` for an unwatched video.
    pub fn engagement_rate(&self) -> Option<f64> {
        if self.view_count == 0 {
            None
        } else {
            Some((self.like_count + self.comment_count) as f64 / self.view_count as f64)
        }
    }

    pub fn like_ratio(&self) -> Option<f64> {
        if self.view_count == 0 {
            None
        } else {
            Some(self.like_count as f64 / self.view_count as f64)
        }
    }
}

impl From<&VideoRecord> for ChannelVideo {
    fn from(video: &VideoRecord) -> Self {
        Self {
            id: video.id.clone(),
            title: video.title.clone(),
            published_at: video.published_at,
            view_count: video.view_count,
            like_count: video.like_count,
            comment_count: video.comment_count,
            duration_seconds: video.duration_seconds,
        }
    }
}

/// Records for one "analyze" action: the video, its channel, recent uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecords {
    pub video: VideoRecord,
    pub channel: ChannelRecord,
    #[serde(default)]
    pub history: Vec<ChannelVideo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_accepts_iso_duration() {
        let video: VideoRecord = serde_json::from_str(
            r#"{
                "id": "abc",
                "title": "Test",
                "publishedAt": "2024-01-02T03:04:05Z",
                "viewCount": 10,
                "duration": "PT1M5S"
            }"#,
        )
        .unwrap();
        assert_eq!(video.duration_seconds, 65);
        assert!(!video.is_short());
    }

    #[test]
    fn channel_video_accepts_numeric_duration() {
        let video: ChannelVideo = serde_json::from_str(
            r#"{"id": "x", "title": "Short", "publishedAt": "2024-01-02T00:00:00Z", "durationSeconds": 60}"#,
        )
        .unwrap();
        assert!(video.is_short());
        assert_eq!(video.engagement_rate(), None);
    }

    #[test]
    fn engagement_rate_sums_likes_and_comments() {
        let video = ChannelVideo {
            id: "v".into(),
            title: "t".into(),
            published_at: Utc::now(),
            view_count: 1000,
            like_count: 40,
            comment_count: 10,
            duration_seconds: 300,
        };
        assert_eq!(video.engagement_rate(), Some(0.05));
        assert_eq!(video.like_ratio(), Some(0.04));
    }
}
