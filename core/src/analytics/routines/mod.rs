//! Question routines, one pure function per catalog id.
//!
//! Each family module exposes a `ROUTINES` table; the calculator chains
//! them into a single dispatch map.

pub mod content;
pub mod engagement;
pub mod growth;
pub mod performance;
pub mod posting;

use chrono::Weekday;

use crate::analytics::input::AnalyticsInput;
use crate::analytics::models::ChannelVideo;
use crate::analytics::result::{Answer, CalcResult};
use crate::math::{StatsHelper, Trend};

pub type Routine = fn(&AnalyticsInput) -> CalcResult<Answer>;

/// Percent change inside this band counts as "stayed consistent".
pub const TREND_DEADBAND_PERCENT: f64 = 10.0;
/// Outliers sit beyond this many standard deviations from the mean.
pub const OUTLIER_SIGMA: f64 = 1.5;
/// Gaps longer than this many days are reported as hiatuses.
pub const HIATUS_DAYS: f64 = 90.0;

const WEEKS_PER_MONTH: f64 = 4.345;
const WEEKS_PER_YEAR: f64 = 52.0;

/// Every registered routine across the five families.
pub fn registry() -> impl Iterator<Item = &'static (&'static str, Routine)> {
    posting::ROUTINES
        .iter()
        .chain(content::ROUTINES)
        .chain(performance::ROUTINES)
        .chain(engagement::ROUTINES)
        .chain(growth::ROUTINES)
}

/// `1234567` -> `"1,234,567"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1530.0` -> `"1.5K"`, `2_400_000.0` -> `"2.4M"`.
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.1}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{:.0}", value)
    }
}

/// Weekly when at least one per week, else monthly, else yearly.
pub fn format_frequency(per_week: f64, noun: &str) -> String {
    if per_week >= 1.0 {
        format!("{:.1} {} per week", per_week, noun)
    } else if per_week * WEEKS_PER_MONTH >= 1.0 {
        format!("{:.1} {} per month", per_week * WEEKS_PER_MONTH, noun)
    } else {
        format!("{:.1} {} per year", per_week * WEEKS_PER_YEAR, noun)
    }
}

pub fn pct(part: f64, whole: f64) -> f64 {
    if whole.abs() < f64::EPSILON {
        0.0
    } else {
        part / whole * 100.0
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Splits at the midpoint; the later half takes the extra item on odd lengths.
pub fn split_halves<T>(items: &[T]) -> (&[T], &[T]) {
    items.split_at(items.len() / 2)
}

/// Videos flagged by a per-video metric.
pub struct Outliers<'a> {
    pub mean: f64,
    pub std_dev: f64,
    pub high: Vec<(&'a ChannelVideo, f64)>,
    pub low: Vec<(&'a ChannelVideo, f64)>,
}

pub fn find_outliers<'a>(samples: &[(&'a ChannelVideo, f64)]) -> Outliers<'a> {
    let values: Vec<f64> = samples.iter().map(|(_, v)| *v).collect();
    let mean = StatsHelper::mean(&values);
    let std_dev = StatsHelper::std_dev(&values);
    let upper = mean + OUTLIER_SIGMA * std_dev;
    let lower = mean - OUTLIER_SIGMA * std_dev;
    let high = samples.iter().filter(|(_, v)| *v > upper).copied().collect();
    let low = samples.iter().filter(|(_, v)| *v < lower).copied().collect();
    Outliers {
        mean,
        std_dev,
        high,
        low,
    }
}

/// Shared shape for every earlier-vs-later comparison.
pub fn trend_answer(
    metric: &str,
    earlier: f64,
    later: f64,
    show: impl Fn(f64) -> String,
) -> Answer {
    let percent = StatsHelper::percent_change(earlier, later);
    let trend = match percent {
        Some(p) => StatsHelper::classify_change(p, TREND_DEADBAND_PERCENT),
        None if later > 0.0 => Trend::Increased,
        None => Trend::Consistent,
    };
    let change = percent
        .map(|p| format!(" ({:+.1}%)", p))
        .unwrap_or_default();

    let answer = Answer::new(
        format!("{} has {}{}.", metric, trend.describe(), change),
        serde_json::json!({
            "earlier": round1(earlier),
            "later": round1(later),
            "percentChange": percent.map(round1),
            "trend": trend,
        }),
    )
    .detail(format!("Earlier half: {}", show(earlier)))
    .detail(format!("Later half: {}", show(later)))
    .detail(format!(
        "Changes within ±{:.0}% are treated as consistent.",
        TREND_DEADBAND_PERCENT
    ));

    match trend {
        Trend::Increased => answer.insight(format!("{} is moving up; keep doing what works.", metric)),
        Trend::Decreased => answer.insight(format!(
            "{} is slipping; compare recent uploads with older ones to see what changed.",
            metric
        )),
        Trend::Consistent => answer.insight(format!("{} is holding steady.", metric)),
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub const SHORTS_BUCKETS: [&str; 3] = ["Under 20s", "20-40s", "40-60s"];
pub const LONG_FORM_BUCKETS: [&str; 4] = ["Under 5 min", "5-15 min", "15-30 min", "30+ min"];
/// Shorts first, then the long-form buckets.
pub const LENGTH_BUCKETS: [&str; 5] = ["Shorts", "Under 5 min", "5-15 min", "15-30 min", "30+ min"];

pub fn shorts_bucket(seconds: u64) -> usize {
    match seconds {
        0..=19 => 0,
        20..=39 => 1,
        _ => 2,
    }
}

pub fn long_form_bucket(seconds: u64) -> usize {
    match seconds {
        0..=299 => 0,
        300..=899 => 1,
        900..=1799 => 2,
        _ => 3,
    }
}

/// Index into [`LENGTH_BUCKETS`].
pub fn length_bucket(video: &ChannelVideo) -> usize {
    if video.is_short() {
        0
    } else {
        1 + long_form_bucket(video.duration_seconds)
    }
}

/// Index of the fullest bucket; the first wins a tie.
pub fn fullest(counts: &[usize]) -> usize {
    counts
        .iter()
        .enumerate()
        .fold((0, 0), |best, (i, &c)| if c > best.1 { (i, c) } else { best })
        .0
}

pub fn describe_video(video: &ChannelVideo) -> String {
    format!("\"{}\" ({} views)", video.title, format_count(video.view_count))
}

pub fn views(videos: &[&ChannelVideo]) -> Vec<f64> {
    videos.iter().map(|v| v.view_count as f64).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::analytics::input::AnalyticsInput;
    use crate::analytics::models::{ChannelRecord, ChannelVideo, VideoRecord};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    pub fn clip(id: &str, days_ago: i64, views: u64, duration: u64) -> ChannelVideo {
        ChannelVideo {
            id: id.into(),
            title: format!("Video {}", id),
            published_at: now() - Duration::days(days_ago),
            view_count: views,
            like_count: views / 20,
            comment_count: views / 200,
            duration_seconds: duration,
        }
    }

    /// `count` long-form uploads, one every 7 days, views rising by 100.
    pub fn weekly_history(count: usize) -> Vec<ChannelVideo> {
        (0..count)
            .map(|i| clip(&format!("h{}", i), 7 * (count - i) as i64, 1_000 + 100 * i as u64, 600))
            .collect()
    }

    pub fn video() -> VideoRecord {
        VideoRecord {
            id: "current".into(),
            title: "How to Edit 10x Faster?".into(),
            description: "Learn editing. https://example.com #editing #tips".into(),
            published_at: now() - Duration::days(4),
            channel_id: "chan".into(),
            tags: vec!["editing".into(), "tutorial".into()],
            category_id: "27".into(),
            view_count: 2_000,
            like_count: 120,
            comment_count: 30,
            duration_seconds: 630,
        }
    }

    pub fn channel() -> ChannelRecord {
        ChannelRecord {
            title: "Edit Lab".into(),
            published_at: now() - Duration::days(730),
            subscriber_count: 5_000,
            video_count: 40,
            total_view_count: 200_000,
        }
    }

    pub fn input<'a>(
        video: &'a VideoRecord,
        channel: &'a ChannelRecord,
        history: &'a [ChannelVideo],
    ) -> AnalyticsInput<'a> {
        AnalyticsInput::new(video, channel, history, now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_grouped_by_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn compact_numbers_use_suffixes() {
        assert_eq!(format_compact(950.0), "950");
        assert_eq!(format_compact(1_530.0), "1.5K");
        assert_eq!(format_compact(2_400_000.0), "2.4M");
    }

    #[test]
    fn frequency_picks_the_readable_unit() {
        assert_eq!(format_frequency(2.0, "videos"), "2.0 videos per week");
        assert_eq!(format_frequency(0.5, "videos"), "2.2 videos per month");
        assert_eq!(format_frequency(0.1, "videos"), "5.2 videos per year");
    }

    #[test]
    fn halves_split_at_midpoint() {
        let (a, b) = split_halves(&[1, 2, 3, 4, 5]);
        assert_eq!(a, &[1, 2]);
        assert_eq!(b, &[3, 4, 5]);
    }

    #[test]
    fn buckets_follow_duration_edges() {
        assert_eq!(shorts_bucket(19), 0);
        assert_eq!(shorts_bucket(20), 1);
        assert_eq!(shorts_bucket(60), 2);
        assert_eq!(long_form_bucket(299), 0);
        assert_eq!(long_form_bucket(900), 2);
        assert_eq!(long_form_bucket(1800), 3);
        assert_eq!(fullest(&[1, 3, 3]), 1);
    }

    #[test]
    fn trend_uses_deadband() {
        let steady = trend_answer("Views", 100.0, 105.0, |v| format!("{}", v));
        assert_eq!(steady.value["trend"], "consistent");
        let up = trend_answer("Views", 100.0, 150.0, |v| format!("{}", v));
        assert_eq!(up.value["trend"], "increased");
        assert!(up.answer.contains("+50.0%"));
    }

    #[test]
    fn outliers_flag_both_tails() {
        let vids: Vec<_> = (0..10)
            .map(|i| fixtures::clip(&i.to_string(), i, 100, 600))
            .collect();
        let mut samples: Vec<_> = vids.iter().map(|v| (v, 1.0)).collect();
        samples[0].1 = 10.0;
        let found = find_outliers(&samples);
        assert_eq!(found.high.len(), 1);
        assert!(found.low.is_empty());
    }
}
