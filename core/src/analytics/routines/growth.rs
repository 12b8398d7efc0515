use std::collections::BTreeMap;

use chrono::Datelike;
use serde_json::json;

use crate::analytics::catalog::VideoType;
use crate::analytics::input::AnalyticsInput;
use crate::analytics::result::{ensure_samples, finite, Answer, CalcResult, Chart, ChartType};
use crate::analytics::routines::{
    format_compact, format_count, pct, round1, trend_answer, views, Routine,
};
use crate::math::StatsHelper;

pub const ROUTINES: &[(&str, Routine)] = &[
    ("channel-age", channel_age),
    ("subscriber-growth-estimate", subscriber_growth_estimate),
    ("views-per-subscriber", views_per_subscriber),
    ("subscriber-conversion", subscriber_conversion),
    ("next-subscriber-milestone", next_subscriber_milestone),
    ("recent-momentum", recent_momentum),
    ("yearly-upload-volume", yearly_upload_volume),
    ("current-video-reach", current_video_reach),
    ("catalog-coverage", catalog_coverage),
];

pub const SUBSCRIBER_MILESTONES: [u64; 7] = [
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
];
const DAYS_PER_MONTH: f64 = 30.44;
const DAYS_PER_YEAR: f64 = 365.25;
/// Size of each window compared by the momentum routine.
const MOMENTUM_WINDOW: usize = 10;

const LINEAR_ESTIMATE_NOTE: &str = "Estimated: subscriber history is not available, so growth is assumed to be linear since the channel was created.";

fn channel_age(input: &AnalyticsInput) -> CalcResult<Answer> {
    let days = input.channel_age_days();
    let years = (days / DAYS_PER_YEAR).floor();
    let months = ((days - years * DAYS_PER_YEAR) / DAYS_PER_MONTH).floor();
    let readable = if years >= 1.0 {
        format!("{:.0} year(s) and {:.0} month(s)", years, months)
    } else if months >= 1.0 {
        format!("{:.0} month(s)", months)
    } else {
        format!("{:.0} day(s)", days.floor())
    };

    let answer = Answer::new(
        format!("The channel is {} old.", readable),
        json!({ "days": days.floor(), "years": years, "months": months }),
    )
    .detail(format!("Created {}", input.channel.published_at.format("%Y-%m-%d")));

    Ok(if years >= 5.0 {
        answer.insight("An established channel with a deep back catalog.")
    } else if years >= 1.0 {
        answer.insight("Past the first year; consistency now compounds.")
    } else {
        answer.insight("A young channel; early uploads set the audience's expectations.")
    })
}

/// Subscribers per day assuming linear growth since creation.
fn daily_subscriber_rate(input: &AnalyticsInput) -> f64 {
    input.channel.subscriber_count as f64 / input.channel_age_days().max(1.0)
}

fn subscriber_growth_estimate(input: &AnalyticsInput) -> CalcResult<Answer> {
    let per_day = finite(daily_subscriber_rate(input), "subscribers per day")?;
    let per_month = per_day * DAYS_PER_MONTH;
    Ok(Answer::new(
        format!(
            "Estimated growth: about {} subscribers per month ({:.1} per day).",
            format_compact(per_month),
            per_day
        ),
        json!({ "estimated": true, "perDay": round1(per_day), "perMonth": per_month.round() }),
    )
    .detail(LINEAR_ESTIMATE_NOTE)
    .detail(format!(
        "{} subscribers over {:.0} days",
        format_count(input.channel.subscriber_count),
        input.channel_age_days()
    ))
    .insight("Real growth is rarely linear; recent months may be faster or slower than this average."))
}

fn views_per_subscriber(input: &AnalyticsInput) -> CalcResult<Answer> {
    let channel = input.channel;
    ensure_samples(channel.subscriber_count as usize, 1, "subscribers")?;
    let ratio = channel.total_view_count as f64 / channel.subscriber_count as f64;
    Ok(Answer::new(
        format!("The channel has {:.1} lifetime views per subscriber.", ratio),
        json!({ "viewsPerSubscriber": round1(ratio) }),
    )
    .detail(format!("{} views", format_count(channel.total_view_count)))
    .detail(format!("{} subscribers", format_count(channel.subscriber_count)))
    .insight(if ratio > 100.0 {
        "Most views come from non-subscribers; discovery is doing the heavy lifting."
    } else {
        "A loyal subscriber base drives a large share of views."
    }))
}

fn subscriber_conversion(input: &AnalyticsInput) -> CalcResult<Answer> {
    let channel = input.channel;
    ensure_samples(channel.total_view_count as usize, 1, "channel views")?;
    let per_thousand = channel.subscriber_count as f64 / channel.total_view_count as f64 * 1_000.0;
    Ok(Answer::new(
        format!("The channel gains {:.1} subscribers per 1,000 views.", per_thousand),
        json!({ "subscribersPerThousandViews": round1(per_thousand) }),
    )
    .detail(format!(
        "{} subscribers from {} lifetime views",
        format_count(channel.subscriber_count),
        format_count(channel.total_view_count)
    ))
    .insight(if per_thousand >= 10.0 {
        "Viewers convert to subscribers readily."
    } else {
        "An end-screen subscribe prompt could convert more viewers."
    }))
}

/// First milestone strictly above `subscribers`.
pub fn next_milestone(subscribers: u64) -> Option<u64> {
    SUBSCRIBER_MILESTONES
        .iter()
        .copied()
        .find(|&m| m > subscribers)
}

fn next_subscriber_milestone(input: &AnalyticsInput) -> CalcResult<Answer> {
    let subscribers = input.channel.subscriber_count;
    let Some(target) = next_milestone(subscribers) else {
        return Ok(Answer::new(
            format!("With {} subscribers the channel is past every tracked milestone.", format_compact(subscribers as f64)),
            json!({ "estimated": true, "milestone": null }),
        ));
    };
    ensure_samples(subscribers as usize, 1, "subscribers")?;
    let per_day = finite(daily_subscriber_rate(input), "subscribers per day")?;
    let remaining = target - subscribers;
    let days = (remaining as f64 / per_day).ceil();
    let eta = input.now + chrono::Duration::days(days.min(36_500.0) as i64);

    Ok(Answer::new(
        format!(
            "Estimated: {} subscribers in about {:.0} days at the historical pace.",
            format_compact(target as f64),
            days
        ),
        json!({
            "estimated": true,
            "milestone": target,
            "remaining": remaining,
            "days": days,
            "eta": eta.format("%Y-%m-%d").to_string(),
        }),
    )
    .detail(LINEAR_ESTIMATE_NOTE)
    .detail(format!("{} subscribers to go", format_count(remaining)))
    .detail(format!("Average pace: {:.1} subscribers per day", per_day))
    .insight("Collaborations and a breakout video can shorten this considerably."))
}

fn recent_momentum(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = input.chronological(VideoType::Both);
    ensure_samples(videos.len(), MOMENTUM_WINDOW * 2, "videos")?;
    let recent = &videos[videos.len() - MOMENTUM_WINDOW..];
    let previous = &videos[videos.len() - MOMENTUM_WINDOW * 2..videos.len() - MOMENTUM_WINDOW];
    Ok(trend_answer(
        "Momentum over the last 10 uploads",
        StatsHelper::mean(&views(previous)),
        StatsHelper::mean(&views(recent)),
        |v| format!("{} average views", format_compact(v)),
    ))
}

fn yearly_upload_volume(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 2, "videos")?;
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for video in input.history {
        *by_year.entry(video.published_at.year()).or_default() += 1;
    }
    let (busiest, count) = by_year
        .iter()
        .fold((0, 0), |best, (&year, &n)| if n > best.1 { (year, n) } else { best });

    Ok(Answer::new(
        format!(
            "{} was the busiest year with {} upload(s) across {} year(s) of analyzed history.",
            busiest,
            count,
            by_year.len()
        ),
        json!({ "byYear": by_year.iter().map(|(y, n)| json!({ "year": y, "count": n })).collect::<Vec<_>>() }),
    )
    .details(by_year.iter().map(|(year, n)| format!("{}: {} upload(s)", year, n)))
    .chart(Chart::new(
        ChartType::Line,
        by_year
            .iter()
            .map(|(year, n)| (year.to_string(), *n as f64))
            .collect(),
    ))
    .insight("Only recent uploads are analyzed, so older years may be undercounted."))
}

fn current_video_reach(input: &AnalyticsInput) -> CalcResult<Answer> {
    let subscribers = input.channel.subscriber_count;
    ensure_samples(subscribers as usize, 1, "subscribers")?;
    let reach = pct(input.video.view_count as f64, subscribers as f64);
    let answer = Answer::new(
        format!("This video's views equal {:.0}% of the subscriber count.", reach),
        json!({ "reachPercent": round1(reach) }),
    )
    .detail(format!(
        "{} views vs {} subscribers",
        format_count(input.video.view_count),
        format_count(subscribers)
    ));
    Ok(if reach >= 100.0 {
        answer.insight("The video reached beyond the subscriber base.")
    } else {
        answer.insight("Most viewers so far are likely existing subscribers.")
    })
}

fn catalog_coverage(input: &AnalyticsInput) -> CalcResult<Answer> {
    let total = input.channel.video_count;
    ensure_samples(total as usize, 1, "channel videos")?;
    let analyzed = input.history.len();
    let coverage = pct(analyzed as f64, total as f64).min(100.0);
    Ok(Answer::new(
        format!(
            "This analysis covers {} of {} videos ({:.0}%).",
            analyzed,
            format_count(total),
            coverage
        ),
        json!({ "analyzed": analyzed, "total": total, "coveragePercent": round1(coverage) }),
    )
    .insight(if coverage < 50.0 {
        "History-based answers reflect recent uploads rather than the whole channel."
    } else {
        "Most of the channel's library is included."
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::result::CalcError;
    use crate::analytics::routines::fixtures::{channel, input, video, weekly_history};

    #[test]
    fn milestone_lookup_skips_reached_ones() {
        assert_eq!(next_milestone(0), Some(100));
        assert_eq!(next_milestone(100), Some(1_000));
        assert_eq!(next_milestone(5_000), Some(10_000));
        assert_eq!(next_milestone(200_000_000), None);
    }

    #[test]
    fn milestone_projection_is_labelled_estimated() {
        let (video, channel) = (video(), channel());
        let history = Vec::new();
        let answer = next_subscriber_milestone(&input(&video, &channel, &history)).unwrap();
        // 5000 subscribers over 730 days, 5000 to go
        let days = answer.value["days"].as_f64().unwrap();
        assert!((730.0..=731.0).contains(&days));
        assert_eq!(answer.value["estimated"], true);
        assert!(answer.details[0].starts_with("Estimated"));
    }

    #[test]
    fn momentum_needs_twenty_uploads() {
        let (video, channel) = (video(), channel());
        let history = weekly_history(19);
        assert!(matches!(
            recent_momentum(&input(&video, &channel, &history)),
            Err(CalcError::InsufficientData { required: 20, available: 19, .. })
        ));
        let history = weekly_history(20);
        let answer = recent_momentum(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value["earlier"], 1_450.0);
        assert_eq!(answer.value["later"], 2_450.0);
    }

    #[test]
    fn channel_age_reads_in_years() {
        let (video, channel) = (video(), channel());
        let history = Vec::new();
        let answer = channel_age(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value["days"], 730.0);
        assert_eq!(answer.value["years"], 1.0);
    }

    #[test]
    fn coverage_is_capped() {
        let (video, mut channel) = (video(), channel());
        channel.video_count = 5;
        let history = weekly_history(8);
        let answer = catalog_coverage(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value["coveragePercent"], 100.0);
    }
}
