use chrono::{DateTime, Duration, Utc};
use creatorcore::analytics::{ChannelRecord, ChannelVideo, SessionRecords, VideoRecord};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const TOPICS: &[&str] = &[
    "Budget", "Camera", "Editing", "Lighting", "Studio", "Workflow", "Audio", "Gear",
];
const FORMATS: &[&str] = &[
    "Review", "Tutorial", "Tips", "Setup Tour", "Mistakes to Avoid", "Challenge",
];

/// Shape of a synthetic channel for demos and load tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelProfile {
    pub seed: u64,
    pub title: String,
    pub uploads: usize,
    pub age_days: i64,
    pub subscribers: u64,
    pub base_views: u64,
    /// Fraction of uploads that are Shorts.
    pub shorts_share: f64,
    pub noise: f64,
}

impl Default for ChannelProfile {
    fn default() -> Self {
        Self {
            seed: 0,
            title: "Demo Creator".into(),
            uploads: 30,
            age_days: 900,
            subscribers: 48_000,
            base_views: 12_000,
            shorts_share: 0.3,
            noise: 0.6,
        }
    }
}

fn synth_title(rng: &mut StdRng, index: usize) -> String {
    let topic = TOPICS[rng.gen_range(0..TOPICS.len())];
    let format = FORMATS[rng.gen_range(0..FORMATS.len())];
    match index % 4 {
        0 => format!("{} {} in {} Minutes", topic, format, rng.gen_range(5..30)),
        1 => format!("Is This the Best {} {}?", topic, format),
        2 => format!("{} {}: Everything You Need", topic, format),
        _ => format!("My {} {}", topic, format),
    }
}

fn synth_video(
    rng: &mut StdRng,
    profile: &ChannelProfile,
    index: usize,
    published_at: DateTime<Utc>,
) -> ChannelVideo {
    let is_short = rng.gen_bool(profile.shorts_share.clamp(0.0, 1.0));
    let duration_seconds = if is_short {
        rng.gen_range(12..=60)
    } else {
        rng.gen_range(240..2_700)
    };
    let noise = profile.noise.abs().max(f64::EPSILON);
    let swing = 1.0 + rng.gen_range(-noise..=noise);
    let view_count = (profile.base_views as f64 * swing.max(0.05)) as u64;
    let like_count = (view_count as f64 * rng.gen_range(0.01..0.06)) as u64;
    let comment_count = if rng.gen_bool(0.05) {
        0
    } else {
        (view_count as f64 * rng.gen_range(0.001..0.01)) as u64
    };

    ChannelVideo {
        id: format!("vid{:03}", index),
        title: synth_title(rng, index),
        published_at,
        view_count,
        like_count,
        comment_count,
        duration_seconds,
    }
}

/// Seeded channel snapshot; the newest upload doubles as the analyzed video.
pub fn build_session_records(profile: &ChannelProfile, now: DateTime<Utc>) -> SessionRecords {
    let mut rng = StdRng::seed_from_u64(profile.seed);
    let uploads = profile.uploads.max(1);
    let span_days = profile.age_days.max(1);
    let step = (span_days as f64 / uploads as f64).max(0.5);

    let history: Vec<ChannelVideo> = (0..uploads)
        .map(|i| {
            let jitter_hours = rng.gen_range(0..24);
            let days_ago = span_days as f64 - step * (i as f64 + 0.5);
            let published_at = now
                - Duration::minutes((days_ago.max(0.0) * 24.0 * 60.0) as i64)
                - Duration::hours(jitter_hours);
            synth_video(&mut rng, profile, i, published_at)
        })
        .collect();

    let latest = &history[history.len() - 1];
    let video = VideoRecord {
        id: latest.id.clone(),
        title: latest.title.clone(),
        description: format!(
            "{}\n\nGear list: https://example.com/gear\n#creator #{}",
            latest.title,
            TOPICS[rng.gen_range(0..TOPICS.len())].to_lowercase()
        ),
        published_at: latest.published_at,
        channel_id: "demo-channel".into(),
        tags: vec!["creator".into(), "tutorial".into(), "youtube tips".into()],
        category_id: "28".into(),
        view_count: latest.view_count,
        like_count: latest.like_count,
        comment_count: latest.comment_count,
        duration_seconds: latest.duration_seconds,
    };
    let total_views: u64 = history.iter().map(|v| v.view_count).sum();
    let channel = ChannelRecord {
        title: profile.title.clone(),
        published_at: now - Duration::days(span_days),
        subscriber_count: profile.subscribers,
        video_count: (uploads as u64) * 2,
        total_view_count: total_views * 2,
    };

    SessionRecords {
        video,
        channel,
        history,
    }
}
