use serde_json::json;

use crate::analytics::catalog::VideoType;
use crate::analytics::input::AnalyticsInput;
use crate::analytics::models::ChannelVideo;
use crate::analytics::result::{ensure_samples, finite, Answer, CalcResult, Chart, ChartType};
use crate::analytics::routines::{
    describe_video, find_outliers, format_compact, format_count, pct, round1, split_halves,
    trend_answer, views, Routine,
};
use crate::math::StatsHelper;

pub const ROUTINES: &[(&str, Routine)] = &[
    ("average-views", average_views),
    ("median-views", median_views),
    ("view-milestones", view_milestones),
    ("current-video-vs-average", current_video_vs_average),
    ("current-video-percentile", current_video_percentile),
    ("top-videos", top_videos),
    ("bottom-videos", bottom_videos),
    ("view-outliers", view_outliers),
    ("views-trend", views_trend),
    ("shorts-vs-long-form-views", shorts_vs_long_form_views),
    ("current-video-daily-views", current_video_daily_views),
    ("view-consistency", view_consistency),
    ("breakout-rate", breakout_rate),
    ("lifetime-views-per-video", lifetime_views_per_video),
];

pub const VIEW_MILESTONES: [u64; 4] = [1_000, 10_000, 100_000, 1_000_000];
/// A breakout earns more than this multiple of the median.
pub const BREAKOUT_MULTIPLE: f64 = 3.0;
const RANKED_LIMIT: usize = 5;

/// Percentage of `views` at or above each threshold.
pub fn milestone_shares(views: &[u64], thresholds: &[u64]) -> Vec<f64> {
    thresholds
        .iter()
        .map(|&threshold| {
            let reached = views.iter().filter(|&&v| v >= threshold).count();
            pct(reached as f64, views.len() as f64)
        })
        .collect()
}

fn average_views(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = input.videos(VideoType::Both);
    ensure_samples(videos.len(), 1, "videos")?;
    let samples = views(&videos);
    let mean = StatsHelper::mean(&samples);
    let median = StatsHelper::median(&samples);

    let answer = Answer::new(
        format!("Videos average {} views.", format_compact(mean)),
        json!({ "average": mean.round(), "median": median.round(), "count": videos.len() }),
    )
    .detail(format!("Median: {} views", format_compact(median)))
    .detail(format!("Based on {} recent uploads", videos.len()));

    Ok(if mean > median * 2.0 {
        answer.insight("A few big hits pull the average well above the typical video.")
    } else {
        answer.insight("Views are fairly evenly spread across uploads.")
    })
}

fn median_views(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = input.videos(VideoType::Both);
    ensure_samples(videos.len(), 1, "videos")?;
    let median = StatsHelper::median(&views(&videos));
    Ok(Answer::new(
        format!("The typical (median) video gets {} views.", format_compact(median)),
        json!({ "median": median.round() }),
    )
    .detail("The median ignores how far viral outliers stretch the average.")
    .insight("Use the median as the benchmark for a normal upload."))
}

fn view_milestones(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 1, "videos")?;
    let counts: Vec<u64> = input.history.iter().map(|v| v.view_count).collect();
    let shares = milestone_shares(&counts, &VIEW_MILESTONES);
    let labels: Vec<String> = VIEW_MILESTONES
        .iter()
        .map(|m| format!("{}+", format_compact(*m as f64)))
        .collect();

    let reached: Vec<String> = labels
        .iter()
        .zip(&shares)
        .filter(|(_, share)| **share > 0.0)
        .map(|(label, share)| format!("{:.0}% reach {}", share, label))
        .collect();
    let headline = if reached.is_empty() {
        "No recent uploads have reached 1K views yet.".to_string()
    } else {
        format!("{}.", reached.join(", "))
    };

    Ok(Answer::new(
        headline,
        json!({ "thresholds": VIEW_MILESTONES, "percentages": shares.iter().map(|s| round1(*s)).collect::<Vec<_>>() }),
    )
    .details(
        labels
            .iter()
            .zip(&shares)
            .map(|(label, share)| format!("{}: {:.1}% of videos", label, share)),
    )
    .chart(Chart::new(
        ChartType::Bar,
        labels.into_iter().zip(shares.iter().map(|s| round1(*s))).collect(),
    )))
}

/// Recent uploads other than the analyzed video.
fn baseline<'a>(input: &AnalyticsInput<'a>) -> Vec<&'a ChannelVideo> {
    input
        .history
        .iter()
        .filter(|v| v.id != input.video.id)
        .collect()
}

fn current_video_vs_average(input: &AnalyticsInput) -> CalcResult<Answer> {
    let others = baseline(input);
    ensure_samples(others.len(), 5, "other videos")?;
    let mean = StatsHelper::mean(&views(&others));
    let own = input.video.view_count as f64;
    let ratio = finite(own / mean.max(1.0), "view ratio")?;
    let diff = pct(own - mean, mean);

    let answer = Answer::new(
        format!(
            "This video has {} views, {:.1}x the channel average of {}.",
            format_count(input.video.view_count),
            ratio,
            format_compact(mean)
        ),
        json!({ "views": input.video.view_count, "channelAverage": mean.round(), "ratio": round1(ratio), "percentDifference": round1(diff) }),
    )
    .detail(format!("Compared against {} other recent uploads", others.len()));

    Ok(if ratio >= 1.5 {
        answer.insight("This video is clearly outperforming; its topic or packaging is worth repeating.")
    } else if ratio >= 0.8 {
        answer.insight("Performance is in line with the channel's usual results.")
    } else {
        answer.insight("Below the usual level; a new thumbnail or title test might help.")
    })
}

fn current_video_percentile(input: &AnalyticsInput) -> CalcResult<Answer> {
    let others = baseline(input);
    ensure_samples(others.len(), 5, "other videos")?;
    let rank = StatsHelper::percentile_rank(&views(&others), input.video.view_count as f64);
    Ok(Answer::new(
        format!("This video outperforms {:.0}% of recent uploads.", rank),
        json!({ "percentile": round1(rank) }),
    )
    .detail(format!("Ranked against {} other uploads", others.len()))
    .insight(if rank >= 75.0 {
        "A top-quartile performer for the channel."
    } else if rank >= 25.0 {
        "A mid-pack result for the channel."
    } else {
        "In the bottom quartile of recent uploads."
    }))
}

fn ranked<'a>(input: &AnalyticsInput<'a>, descending: bool) -> Vec<&'a ChannelVideo> {
    let mut videos = input.videos(VideoType::Both);
    videos.sort_by(|a, b| {
        let order = a.view_count.cmp(&b.view_count).then_with(|| a.id.cmp(&b.id));
        if descending {
            order.reverse()
        } else {
            order
        }
    });
    videos.truncate(RANKED_LIMIT);
    videos
}

fn ranking_answer(videos: &[&ChannelVideo], heading: &str) -> Answer {
    let chart = Chart::new(
        ChartType::Bar,
        videos
            .iter()
            .map(|v| (v.title.clone(), v.view_count as f64))
            .collect(),
    );
    Answer::new(
        format!("{}: {}", heading, describe_video(videos[0])),
        json!(videos
            .iter()
            .map(|v| json!({ "id": v.id, "title": v.title, "views": v.view_count }))
            .collect::<Vec<_>>()),
    )
    .details(
        videos
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{}. {}", i + 1, describe_video(v))),
    )
    .chart(chart)
}

fn top_videos(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 3, "videos")?;
    let videos = ranked(input, true);
    Ok(ranking_answer(&videos, "Most viewed")
        .insight("Study what the top videos share in topic, title and thumbnail."))
}

fn bottom_videos(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 5, "videos")?;
    let videos = ranked(input, false);
    Ok(ranking_answer(&videos, "Least viewed")
        .insight("Low performers often share a topic or format the audience did not expect."))
}

fn view_outliers(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 10, "videos")?;
    let samples: Vec<(&ChannelVideo, f64)> = input
        .history
        .iter()
        .map(|v| (v, v.view_count as f64))
        .collect();
    let found = find_outliers(&samples);

    Ok(Answer::new(
        format!(
            "{} breakout hit(s) and {} underperformer(s) among recent uploads.",
            found.high.len(),
            found.low.len()
        ),
        json!({
            "mean": found.mean.round(),
            "stdDev": found.std_dev.round(),
            "high": found.high.iter().map(|(v, _)| &v.id).collect::<Vec<_>>(),
            "low": found.low.iter().map(|(v, _)| &v.id).collect::<Vec<_>>(),
        }),
    )
    .detail(format!(
        "Average {} views, standard deviation {}",
        format_compact(found.mean),
        format_compact(found.std_dev)
    ))
    .details(found.high.iter().map(|(v, _)| format!("High: {}", describe_video(v))))
    .details(found.low.iter().map(|(v, _)| format!("Low: {}", describe_video(v))))
    .insight("Outliers are flagged beyond 1.5 standard deviations from the average."))
}

fn views_trend(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = input.chronological(VideoType::Both);
    ensure_samples(videos.len(), 10, "videos")?;
    let (earlier, later) = split_halves(&videos);
    Ok(trend_answer(
        "Average views",
        StatsHelper::mean(&views(earlier)),
        StatsHelper::mean(&views(later)),
        |v| format!("{} views per video", format_compact(v)),
    ))
}

fn shorts_vs_long_form_views(input: &AnalyticsInput) -> CalcResult<Answer> {
    let shorts = input.videos(VideoType::Shorts);
    let long_form = input.videos(VideoType::LongForm);
    ensure_samples(shorts.len(), 1, VideoType::Shorts.noun())?;
    ensure_samples(long_form.len(), 1, VideoType::LongForm.noun())?;
    let shorts_avg = StatsHelper::mean(&views(&shorts));
    let long_avg = StatsHelper::mean(&views(&long_form));
    let leader = if shorts_avg >= long_avg { "Shorts" } else { "Long-form videos" };
    let (hi, lo) = if shorts_avg >= long_avg {
        (shorts_avg, long_avg)
    } else {
        (long_avg, shorts_avg)
    };

    Ok(Answer::new(
        format!(
            "{} get more views on average ({} vs {}).",
            leader,
            format_compact(hi),
            format_compact(lo)
        ),
        json!({
            "shortsAverage": shorts_avg.round(),
            "longFormAverage": long_avg.round(),
            "percentDifference": StatsHelper::percent_change(lo, hi).map(round1),
        }),
    )
    .detail(format!("{} Shorts averaging {} views", shorts.len(), format_compact(shorts_avg)))
    .detail(format!("{} long-form videos averaging {} views", long_form.len(), format_compact(long_avg)))
    .chart(Chart::new(
        ChartType::Bar,
        vec![("Shorts".into(), shorts_avg.round()), ("Long-form".into(), long_avg.round())],
    ))
    .insight("Shorts views are counted differently, so compare engagement as well as reach."))
}

fn current_video_daily_views(input: &AnalyticsInput) -> CalcResult<Answer> {
    let days = input.days_since(input.video.published_at).max(1.0);
    let per_day = finite(input.video.view_count as f64 / days, "daily views")?;
    Ok(Answer::new(
        format!("This video averages {} views per day.", format_compact(per_day)),
        json!({ "perDay": round1(per_day), "daysLive": days.floor() }),
    )
    .detail(format!("{} views over {:.0} day(s)", format_count(input.video.view_count), days))
    .insight("Most videos collect the bulk of their views in the first weeks; older videos naturally slow down."))
}

fn view_consistency(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 5, "videos")?;
    let samples = views(&input.videos(VideoType::Both));
    let cv = finite(StatsHelper::coefficient_of_variation(&samples), "view variation")?;
    let label = if cv < 0.5 {
        "very consistent"
    } else if cv < 1.0 {
        "moderately consistent"
    } else {
        "highly variable"
    };
    Ok(Answer::new(
        format!("View counts are {} (variation {:.0}%).", label, cv * 100.0),
        json!({ "coefficientOfVariation": round1(cv * 100.0) / 100.0, "label": label }),
    )
    .detail(format!("Standard deviation: {} views", format_compact(StatsHelper::std_dev(&samples))))
    .insight(if cv < 1.0 {
        "The audience shows up reliably for each upload."
    } else {
        "Results swing widely; a few videos carry most of the views."
    }))
}

fn breakout_rate(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 10, "videos")?;
    let samples = views(&input.videos(VideoType::Both));
    let median = StatsHelper::median(&samples);
    let threshold = median * BREAKOUT_MULTIPLE;
    let breakouts: Vec<&ChannelVideo> = input
        .history
        .iter()
        .filter(|v| v.view_count as f64 > threshold)
        .collect();
    let rate = pct(breakouts.len() as f64, samples.len() as f64);

    Ok(Answer::new(
        format!(
            "{:.0}% of recent uploads broke out past {:.0}x the median.",
            rate, BREAKOUT_MULTIPLE
        ),
        json!({ "rate": round1(rate), "count": breakouts.len(), "threshold": threshold.round() }),
    )
    .detail(format!("Median views: {}", format_compact(median)))
    .details(breakouts.iter().map(|v| format!("Breakout: {}", describe_video(v))))
    .insight(if breakouts.is_empty() {
        "No breakouts yet; experimenting with trending topics can create one."
    } else {
        "Breakouts are the channel's best clues for what to make next."
    }))
}

fn lifetime_views_per_video(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.channel.video_count as usize, 1, "channel videos")?;
    let per_video = input.channel.total_view_count as f64 / input.channel.video_count as f64;
    Ok(Answer::new(
        format!(
            "Across its lifetime the channel earns {} views per video.",
            format_compact(per_video)
        ),
        json!({ "perVideo": per_video.round() }),
    )
    .detail(format!("{} total views", format_count(input.channel.total_view_count)))
    .detail(format!("{} public videos", format_count(input.channel.video_count)))
    .insight("Compare this with recent averages to see whether new uploads keep pace with the back catalog."))
}
