use chrono::{DateTime, Utc};

use crate::analytics::catalog::VideoType;
use crate::analytics::models::{ChannelRecord, ChannelVideo, VideoRecord};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Borrowed view of one analysis request with a pinned "now".
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsInput<'a> {
    pub video: &'a VideoRecord,
    pub channel: &'a ChannelRecord,
    pub history: &'a [ChannelVideo],
    pub now: DateTime<Utc>,
}

impl<'a> AnalyticsInput<'a> {
    pub fn new(
        video: &'a VideoRecord,
        channel: &'a ChannelRecord,
        history: &'a [ChannelVideo],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            video,
            channel,
            history,
            now,
        }
    }

    pub fn videos(&self, kind: VideoType) -> Vec<&'a ChannelVideo> {
        self.history
            .iter()
            .filter(|v| kind.matches(v.is_short()))
            .collect()
    }

    /// Oldest first, by publish timestamp.
    pub fn chronological(&self, kind: VideoType) -> Vec<&'a ChannelVideo> {
        let mut videos = self.videos(kind);
        videos.sort_by_key(|v| v.published_at);
        videos
    }

    /// Fractional days since the channel was created, never negative.
    pub fn channel_age_days(&self) -> f64 {
        self.days_since(self.channel.published_at)
    }

    pub fn days_since(&self, at: DateTime<Utc>) -> f64 {
        let seconds = (self.now - at).num_seconds().max(0);
        seconds as f64 / SECONDS_PER_DAY
    }
}

/// Fractional days between two timestamps, `later - earlier`.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_seconds() as f64 / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn clip(id: &str, days_ago: i64, duration: u64, now: DateTime<Utc>) -> ChannelVideo {
        ChannelVideo {
            id: id.into(),
            title: id.into(),
            published_at: now - Duration::days(days_ago),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            duration_seconds: duration,
        }
    }

    #[test]
    fn chronological_sorts_oldest_first_and_filters() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let history = vec![
            clip("a", 10, 30, now),
            clip("b", 100, 600, now),
            clip("c", 20, 45, now),
        ];
        let video = VideoRecord {
            id: "a".into(),
            title: "a".into(),
            description: String::new(),
            published_at: now,
            channel_id: String::new(),
            tags: Vec::new(),
            category_id: String::new(),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            duration_seconds: 30,
        };
        let channel = ChannelRecord {
            title: "chan".into(),
            published_at: now - Duration::days(365),
            subscriber_count: 0,
            video_count: 3,
            total_view_count: 0,
        };
        let input = AnalyticsInput::new(&video, &channel, &history, now);

        let ids: Vec<_> = input.chronological(VideoType::Both).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(input.videos(VideoType::Shorts).len(), 2);
        assert_eq!(input.channel_age_days(), 365.0);
        assert_eq!(days_between(history[1].published_at, history[2].published_at), 80.0);
    }
}
