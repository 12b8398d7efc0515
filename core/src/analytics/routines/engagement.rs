use serde_json::json;

use crate::analytics::catalog::VideoType;
use crate::analytics::input::AnalyticsInput;
use crate::analytics::models::ChannelVideo;
use crate::analytics::result::{ensure_samples, finite, Answer, CalcResult, Chart, ChartType};
use crate::analytics::routines::{
    describe_video, find_outliers, format_count, length_bucket, pct, round1, split_halves,
    trend_answer, Routine, LENGTH_BUCKETS,
};
use crate::math::StatsHelper;

pub const ROUTINES: &[(&str, Routine)] = &[
    ("engagement-rate", engagement_rate),
    ("channel-engagement-rate", channel_engagement_rate),
    ("like-ratio", like_ratio),
    ("like-ratio-outliers", like_ratio_outliers),
    ("engagement-outliers", engagement_outliers),
    ("comment-rate", comment_rate),
    ("comments-per-like", comments_per_like),
    ("engagement-trend", engagement_trend),
    ("shorts-vs-long-form-engagement", shorts_vs_long_form_engagement),
    ("engagement-by-length", engagement_by_length),
    ("comments-disabled-estimate", comments_disabled_estimate),
    ("most-discussed-videos", most_discussed_videos),
    ("top-engaged-videos", top_engaged_videos),
];

/// Engagement above this percentage is excellent.
pub const EXCELLENT_ENGAGEMENT: f64 = 5.0;
/// Engagement above this percentage is good.
pub const GOOD_ENGAGEMENT: f64 = 2.0;
/// Views a video needs before zero comments looks deliberate.
pub const COMMENTS_DISABLED_MIN_VIEWS: u64 = 1_000;
const RANKED_LIMIT: usize = 5;

fn tier(rate_pct: f64) -> &'static str {
    if rate_pct > EXCELLENT_ENGAGEMENT {
        "excellent"
    } else if rate_pct >= GOOD_ENGAGEMENT {
        "good"
    } else {
        "below average"
    }
}

fn watched<'a>(input: &AnalyticsInput<'a>, kind: VideoType) -> Vec<&'a ChannelVideo> {
    input
        .videos(kind)
        .into_iter()
        .filter(|v| v.view_count > 0)
        .collect()
}

struct Totals {
    views: u64,
    likes: u64,
    comments: u64,
}

fn totals(videos: &[&ChannelVideo]) -> Totals {
    videos.iter().fold(
        Totals {
            views: 0,
            likes: 0,
            comments: 0,
        },
        |acc, v| Totals {
            views: acc.views + v.view_count,
            likes: acc.likes + v.like_count,
            comments: acc.comments + v.comment_count,
        },
    )
}

/// Aggregate (likes + comments) / views as a percentage.
fn aggregate_rate(videos: &[&ChannelVideo]) -> f64 {
    let t = totals(videos);
    pct((t.likes + t.comments) as f64, t.views as f64)
}

fn engagement_pct(video: &ChannelVideo) -> f64 {
    video.engagement_rate().unwrap_or(0.0) * 100.0
}

fn engagement_rate(input: &AnalyticsInput) -> CalcResult<Answer> {
    let video = input.video;
    ensure_samples(video.view_count as usize, 1, "views on this video")?;
    let rate = finite(
        pct((video.like_count + video.comment_count) as f64, video.view_count as f64),
        "engagement rate",
    )?;
    let level = tier(rate);

    let answer = Answer::new(
        format!("This video's engagement rate is {:.2}% ({}).", rate, level),
        json!({ "rate": round1(rate * 10.0) / 10.0, "tier": level }),
    )
    .detail(format!("{} likes", format_count(video.like_count)))
    .detail(format!("{} comments", format_count(video.comment_count)))
    .detail(format!("{} views", format_count(video.view_count)));

    Ok(match level {
        "excellent" => answer.insight("Viewers are highly engaged; this format resonates."),
        "good" => answer.insight("Healthy engagement; a clear call to action could push it higher."),
        _ => answer.insight("Ask a question in the video to invite more comments."),
    })
}

fn channel_engagement_rate(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = watched(input, VideoType::Both);
    ensure_samples(videos.len(), 1, "watched videos")?;
    let rate = aggregate_rate(&videos);
    let level = tier(rate);
    Ok(Answer::new(
        format!("Across recent uploads engagement is {:.2}% ({}).", rate, level),
        json!({ "rate": round1(rate * 10.0) / 10.0, "tier": level }),
    )
    .detail(format!("Based on {} videos with views", videos.len()))
    .insight("Engagement rates between 2% and 5% are typical for healthy channels."))
}

fn like_ratio(input: &AnalyticsInput) -> CalcResult<Answer> {
    let video = input.video;
    ensure_samples(video.view_count as usize, 1, "views on this video")?;
    let ratio = pct(video.like_count as f64, video.view_count as f64);
    Ok(Answer::new(
        format!("{:.2}% of viewers liked this video.", ratio),
        json!({ "ratio": round1(ratio * 10.0) / 10.0 }),
    )
    .detail(format!(
        "{} likes from {} views",
        format_count(video.like_count),
        format_count(video.view_count)
    ))
    .insight(if ratio >= 4.0 {
        "A strong like ratio signals viewers enjoyed the video."
    } else {
        "Reminding viewers to like can nudge the ratio up."
    }))
}

fn outlier_answer(samples: &[(&ChannelVideo, f64)], metric: &str) -> Answer {
    let found = find_outliers(samples);
    Answer::new(
        format!(
            "{} video(s) have unusually high and {} unusually low {}.",
            found.high.len(),
            found.low.len(),
            metric
        ),
        json!({
            "meanPercent": round1(found.mean),
            "stdDevPercent": round1(found.std_dev),
            "high": found.high.iter().map(|(v, _)| &v.id).collect::<Vec<_>>(),
            "low": found.low.iter().map(|(v, _)| &v.id).collect::<Vec<_>>(),
        }),
    )
    .detail(format!("Average {}: {:.2}%", metric, found.mean))
    .details(
        found
            .high
            .iter()
            .map(|(v, r)| format!("High: {} at {:.2}%", describe_video(v), r)),
    )
    .details(
        found
            .low
            .iter()
            .map(|(v, r)| format!("Low: {} at {:.2}%", describe_video(v), r)),
    )
    .insight("Outliers are flagged beyond 1.5 standard deviations from the average.")
}

fn like_ratio_outliers(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = watched(input, VideoType::Both);
    ensure_samples(videos.len(), 10, "watched videos")?;
    let samples: Vec<_> = videos
        .iter()
        .map(|v| (*v, v.like_ratio().unwrap_or(0.0) * 100.0))
        .collect();
    Ok(outlier_answer(&samples, "like ratio"))
}

fn engagement_outliers(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = watched(input, VideoType::Both);
    ensure_samples(videos.len(), 10, "watched videos")?;
    let samples: Vec<_> = videos.iter().map(|v| (*v, engagement_pct(v))).collect();
    Ok(outlier_answer(&samples, "engagement"))
}

fn comment_rate(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = watched(input, VideoType::Both);
    ensure_samples(videos.len(), 1, "watched videos")?;
    let t = totals(&videos);
    let per_thousand = t.comments as f64 / t.views as f64 * 1_000.0;
    Ok(Answer::new(
        format!("Videos get {:.1} comments per 1,000 views.", per_thousand),
        json!({ "perThousandViews": round1(per_thousand) }),
    )
    .detail(format!(
        "{} comments across {} views",
        format_count(t.comments),
        format_count(t.views)
    ))
    .insight(if per_thousand >= 5.0 {
        "An active comment section; replying keeps the conversation going."
    } else {
        "Pinning a question as the first comment can spark discussion."
    }))
}

fn comments_per_like(input: &AnalyticsInput) -> CalcResult<Answer> {
    let liked: Vec<&ChannelVideo> = input.history.iter().filter(|v| v.like_count > 0).collect();
    ensure_samples(liked.len(), 1, "liked videos")?;
    let t = totals(&liked);
    let ratio = t.comments as f64 / t.likes as f64;
    Ok(Answer::new(
        format!("There is roughly one comment for every {:.1} likes.", 1.0 / ratio.max(f64::EPSILON)),
        json!({ "commentsPerLike": (ratio * 1000.0).round() / 1000.0 }),
    )
    .detail(format!("{} comments, {} likes", format_count(t.comments), format_count(t.likes)))
    .insight("A higher comment share means viewers want to talk, not just react."))
}

fn engagement_trend(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos: Vec<&ChannelVideo> = input
        .chronological(VideoType::Both)
        .into_iter()
        .filter(|v| v.view_count > 0)
        .collect();
    ensure_samples(videos.len(), 10, "watched videos")?;
    let (earlier, later) = split_halves(&videos);
    let mean_rate = |slice: &[&ChannelVideo]| {
        StatsHelper::mean(&slice.iter().map(|v| engagement_pct(v)).collect::<Vec<_>>())
    };
    Ok(trend_answer(
        "Engagement rate",
        mean_rate(earlier),
        mean_rate(later),
        |r| format!("{:.2}% engagement", r),
    ))
}

fn shorts_vs_long_form_engagement(input: &AnalyticsInput) -> CalcResult<Answer> {
    let shorts = watched(input, VideoType::Shorts);
    let long_form = watched(input, VideoType::LongForm);
    ensure_samples(shorts.len(), 1, VideoType::Shorts.noun())?;
    ensure_samples(long_form.len(), 1, VideoType::LongForm.noun())?;
    let shorts_rate = aggregate_rate(&shorts);
    let long_rate = aggregate_rate(&long_form);
    let leader = if shorts_rate >= long_rate { "Shorts" } else { "Long-form videos" };

    Ok(Answer::new(
        format!(
            "{} engage better ({:.2}% vs {:.2}%).",
            leader,
            shorts_rate.max(long_rate),
            shorts_rate.min(long_rate)
        ),
        json!({
            "shortsRate": round1(shorts_rate * 10.0) / 10.0,
            "longFormRate": round1(long_rate * 10.0) / 10.0,
        }),
    )
    .detail(format!("Shorts: {:.2}% across {} videos", shorts_rate, shorts.len()))
    .detail(format!("Long-form: {:.2}% across {} videos", long_rate, long_form.len()))
    .chart(Chart::new(
        ChartType::Bar,
        vec![("Shorts".into(), shorts_rate), ("Long-form".into(), long_rate)],
    ))
    .insight("Lean on the stronger format for community building."))
}

fn engagement_by_length(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = watched(input, VideoType::Both);
    ensure_samples(videos.len(), 10, "watched videos")?;
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); LENGTH_BUCKETS.len()];
    for video in &videos {
        buckets[length_bucket(video)].push(engagement_pct(video));
    }
    let averages: Vec<(usize, f64)> = buckets
        .iter()
        .enumerate()
        .filter(|(_, rates)| !rates.is_empty())
        .map(|(i, rates)| (i, StatsHelper::mean(rates)))
        .collect();
    let (best, best_rate) = averages
        .iter()
        .copied()
        .fold((0, f64::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

    Ok(Answer::new(
        format!(
            "{} videos engage best at {:.2}% on average.",
            LENGTH_BUCKETS[best], best_rate
        ),
        json!({ "bestBucket": LENGTH_BUCKETS[best], "rate": round1(best_rate * 10.0) / 10.0 }),
    )
    .details(averages.iter().map(|(i, rate)| {
        format!("{}: {:.2}% ({} videos)", LENGTH_BUCKETS[*i], rate, buckets[*i].len())
    }))
    .chart(Chart::new(
        ChartType::Bar,
        averages
            .iter()
            .map(|(i, rate)| (LENGTH_BUCKETS[*i].to_string(), *rate))
            .collect(),
    ))
    .insight("Engagement by length shows which formats keep viewers involved, not just watching."))
}

/// Zero comments on a liked video with meaningful reach.
pub fn looks_comments_disabled(video: &ChannelVideo) -> bool {
    video.comment_count == 0
        && video.view_count >= COMMENTS_DISABLED_MIN_VIEWS
        && video.like_count > 0
}

fn comments_disabled_estimate(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 5, "videos")?;
    let flagged: Vec<&ChannelVideo> = input
        .history
        .iter()
        .filter(|v| looks_comments_disabled(v))
        .collect();
    let share = pct(flagged.len() as f64, input.history.len() as f64);

    let answer = Answer::new(
        format!(
            "Estimated: {} of {} recent uploads ({:.0}%) appear to have comments turned off.",
            flagged.len(),
            input.history.len(),
            share
        ),
        json!({ "estimated": true, "count": flagged.len(), "percent": round1(share) }),
    )
    .detail(format!(
        "Estimated: the comment setting is not available in the data, so a video is flagged when it has zero comments, at least {} views and some likes.",
        format_count(COMMENTS_DISABLED_MIN_VIEWS)
    ))
    .details(flagged.iter().map(|v| format!("Likely disabled: {}", describe_video(v))));

    Ok(if flagged.is_empty() {
        answer.insight("Comments appear to be open across recent uploads.")
    } else {
        answer.insight("Disabled comments remove a key engagement signal; consider enabling them where possible.")
    })
}

fn most_discussed_videos(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 3, "videos")?;
    let mut videos: Vec<&ChannelVideo> = input.history.iter().collect();
    videos.sort_by(|a, b| b.comment_count.cmp(&a.comment_count).then_with(|| a.id.cmp(&b.id)));
    videos.truncate(RANKED_LIMIT);

    Ok(Answer::new(
        format!(
            "The most discussed upload is \"{}\" with {} comments.",
            videos[0].title,
            format_count(videos[0].comment_count)
        ),
        json!(videos
            .iter()
            .map(|v| json!({ "id": v.id, "title": v.title, "comments": v.comment_count }))
            .collect::<Vec<_>>()),
    )
    .details(videos.iter().enumerate().map(|(i, v)| {
        format!("{}. \"{}\": {} comments", i + 1, v.title, format_count(v.comment_count))
    }))
    .chart(Chart::new(
        ChartType::Bar,
        videos
            .iter()
            .map(|v| (v.title.clone(), v.comment_count as f64))
            .collect(),
    ))
    .insight("Topics that spark discussion are good candidates for follow-up videos."))
}

fn top_engaged_videos(input: &AnalyticsInput) -> CalcResult<Answer> {
    let mut videos = watched(input, VideoType::Both);
    ensure_samples(videos.len(), 5, "watched videos")?;
    videos.sort_by(|a, b| {
        engagement_pct(b)
            .total_cmp(&engagement_pct(a))
            .then_with(|| a.id.cmp(&b.id))
    });
    videos.truncate(RANKED_LIMIT);

    Ok(Answer::new(
        format!(
            "\"{}\" has the highest engagement at {:.2}%.",
            videos[0].title,
            engagement_pct(videos[0])
        ),
        json!(videos
            .iter()
            .map(|v| json!({ "id": v.id, "title": v.title, "ratePercent": round1(engagement_pct(v) * 10.0) / 10.0 }))
            .collect::<Vec<_>>()),
    )
    .details(
        videos
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}. \"{}\": {:.2}%", i + 1, v.title, engagement_pct(v))),
    )
    .insight("High-engagement videos often make the best community posts and playlist anchors."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::routines::fixtures::{channel, clip, input, video, weekly_history};

    #[test]
    fn engagement_tiers_follow_thresholds() {
        assert_eq!(tier(6.0), "excellent");
        assert_eq!(tier(5.0), "good");
        assert_eq!(tier(2.0), "good");
        assert_eq!(tier(1.9), "below average");
    }

    #[test]
    fn current_video_engagement_is_excellent() {
        let (video, channel) = (video(), channel());
        let history = Vec::new();
        let answer = engagement_rate(&input(&video, &channel, &history)).unwrap();
        // (120 + 30) / 2000
        assert_eq!(answer.value["rate"], 7.5);
        assert_eq!(answer.value["tier"], "excellent");
    }

    #[test]
    fn disabled_comment_estimate_is_disclosed() {
        let mut history = weekly_history(5);
        history[0].comment_count = 0;
        history[1].comment_count = 0;
        history[1].view_count = 500;
        let (video, channel) = (video(), channel());
        let answer = comments_disabled_estimate(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value["count"], 1);
        assert!(answer.answer.starts_with("Estimated"));
        assert!(answer.details[0].starts_with("Estimated"));
    }

    #[test]
    fn unwatched_videos_do_not_count_toward_rates() {
        let history = vec![clip("a", 1, 0, 600)];
        let (video, channel) = (video(), channel());
        assert!(channel_engagement_rate(&input(&video, &channel, &history)).is_err());
    }

    #[test]
    fn most_discussed_orders_by_comments() {
        let history = weekly_history(4);
        let (video, channel) = (video(), channel());
        let answer = most_discussed_videos(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value[0]["id"], "h2");
    }
}
