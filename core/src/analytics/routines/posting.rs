use chrono::{Datelike, Duration, Timelike};
use serde_json::json;

use crate::analytics::catalog::VideoType;
use crate::analytics::input::{days_between, AnalyticsInput};
use crate::analytics::models::ChannelVideo;
use crate::analytics::result::{
    ensure_samples, finite, Answer, CalcError, CalcResult, Chart, ChartType,
};
use crate::analytics::routines::{
    format_compact, format_frequency, fullest, pct, round1, split_halves, trend_answer, views,
    weekday_name, Routine, HIATUS_DAYS, WEEKDAYS,
};
use crate::math::StatsHelper;

pub const ROUTINES: &[(&str, Routine)] = &[
    ("posting-frequency", posting_frequency),
    ("shorts-posting-frequency", shorts_posting_frequency),
    ("long-form-posting-frequency", long_form_posting_frequency),
    ("upload-gaps", upload_gaps),
    ("hiatus-history", hiatus_history),
    ("posting-frequency-trend", posting_frequency_trend),
    ("posting-consistency", posting_consistency),
    ("upload-weekday-distribution", upload_weekday_distribution),
    ("best-upload-weekday", best_upload_weekday),
    ("upload-time-of-day", upload_time_of_day),
    ("days-since-last-upload", days_since_last_upload),
    ("recent-upload-activity", recent_upload_activity),
];

fn frequency_for(input: &AnalyticsInput, kind: VideoType) -> CalcResult<Answer> {
    let videos = input.videos(kind);
    ensure_samples(videos.len(), 1, kind.noun())?;

    let age_days = input.channel_age_days().max(1.0);
    let per_week = finite(videos.len() as f64 / (age_days / 7.0), "uploads per week")?;
    let readable = format_frequency(per_week, kind.noun());

    let answer = Answer::new(
        format!("This channel posts about {}.", readable),
        json!({ "perWeek": round1(per_week), "count": videos.len(), "channelAgeDays": age_days.floor() }),
    )
    .detail(format!("{} {} analyzed", videos.len(), kind.noun()))
    .detail(format!("Channel age: {:.0} days", age_days));

    Ok(if per_week >= 2.0 {
        answer.insight("A high upload cadence keeps the channel in front of subscribers.")
    } else if per_week >= 1.0 {
        answer.insight("A weekly rhythm is a solid baseline for steady growth.")
    } else {
        answer.insight("Uploading at least weekly tends to help recommendations pick the channel up.")
    })
}

fn posting_frequency(input: &AnalyticsInput) -> CalcResult<Answer> {
    frequency_for(input, VideoType::Both)
}

fn shorts_posting_frequency(input: &AnalyticsInput) -> CalcResult<Answer> {
    frequency_for(input, VideoType::Shorts)
}

fn long_form_posting_frequency(input: &AnalyticsInput) -> CalcResult<Answer> {
    frequency_for(input, VideoType::LongForm)
}

/// Day deltas between consecutive uploads, oldest first.
fn gaps(input: &AnalyticsInput) -> Vec<f64> {
    input
        .chronological(VideoType::Both)
        .windows(2)
        .map(|pair| days_between(pair[0].published_at, pair[1].published_at))
        .collect()
}

fn upload_gaps(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 2, "videos")?;
    let gaps = gaps(input);
    let shortest = gaps.iter().copied().fold(f64::INFINITY, f64::min);
    let longest = gaps.iter().copied().fold(0.0, f64::max);
    let average = StatsHelper::mean(&gaps);
    let hiatuses = gaps.iter().filter(|&&g| g > HIATUS_DAYS).count();

    let mut answer = Answer::new(
        format!(
            "Gaps between uploads range from {:.0} to {:.0} days, averaging {:.1} days.",
            shortest, longest, average
        ),
        json!({
            "shortestDays": round1(shortest),
            "longestDays": round1(longest),
            "averageDays": round1(average),
            "hiatusCount": hiatuses,
        }),
    )
    .detail(format!("Shortest gap: {:.1} days", shortest))
    .detail(format!("Longest gap: {:.1} days", longest))
    .detail(format!("Average gap: {:.1} days", average));

    if hiatuses > 0 {
        answer = answer
            .detail(format!("{} gap(s) longer than {:.0} days", hiatuses, HIATUS_DAYS))
            .insight("Long breaks can cost momentum; a backlog of scheduled uploads helps bridge them.");
    } else {
        answer = answer.insight("No extended hiatuses in the analyzed uploads.");
    }
    Ok(answer)
}

fn hiatus_history(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 2, "videos")?;
    let videos = input.chronological(VideoType::Both);
    let breaks: Vec<_> = videos
        .windows(2)
        .filter_map(|pair| {
            let days = days_between(pair[0].published_at, pair[1].published_at);
            (days > HIATUS_DAYS).then_some((pair[1].published_at, days))
        })
        .collect();

    if breaks.is_empty() {
        return Ok(Answer::new(
            format!("No breaks longer than {:.0} days between uploads.", HIATUS_DAYS),
            json!({ "hiatusCount": 0 }),
        )
        .insight("Consistent presence without long breaks."));
    }

    let longest = breaks.iter().map(|(_, d)| *d).fold(0.0, f64::max);
    let details = breaks.iter().map(|(resumed, days)| {
        format!("{:.0} days without uploads, resumed {}", days, resumed.format("%Y-%m-%d"))
    });
    let chart = Chart::new(
        ChartType::Timeline,
        breaks
            .iter()
            .map(|(resumed, days)| (resumed.format("%Y-%m-%d").to_string(), round1(*days)))
            .collect(),
    );
    Ok(Answer::new(
        format!(
            "The channel took {} break(s) longer than {:.0} days; the longest lasted {:.0} days.",
            breaks.len(),
            HIATUS_DAYS,
            longest
        ),
        json!({ "hiatusCount": breaks.len(), "longestDays": round1(longest) }),
    )
    .details(details)
    .chart(chart)
    .insight("Returning after a break with a strong upload can help re-engage subscribers."))
}

/// Uploads per week across a chronological slice.
fn weekly_rate(videos: &[&ChannelVideo]) -> f64 {
    match (videos.first(), videos.last()) {
        (Some(first), Some(last)) => {
            let span = days_between(first.published_at, last.published_at).max(1.0);
            videos.len() as f64 / span * 7.0
        }
        _ => 0.0,
    }
}

fn posting_frequency_trend(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = input.chronological(VideoType::Both);
    ensure_samples(videos.len(), 4, "videos")?;
    let (earlier, later) = split_halves(&videos);
    Ok(trend_answer(
        "Upload frequency",
        weekly_rate(earlier),
        weekly_rate(later),
        |rate| format_frequency(rate, "videos"),
    ))
}

fn posting_consistency(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 5, "videos")?;
    let gaps = gaps(input);
    let cv = finite(StatsHelper::coefficient_of_variation(&gaps), "gap variation")?;
    let score = (100.0 - cv * 50.0).clamp(0.0, 100.0).round();
    let label = match score as u32 {
        80..=100 => "very consistent",
        60..=79 => "fairly consistent",
        40..=59 => "irregular",
        _ => "highly irregular",
    };

    let answer = Answer::new(
        format!("The upload schedule is {} (consistency score {:.0}/100).", label, score),
        json!({ "score": score, "coefficientOfVariation": round1(cv * 100.0) / 100.0 }),
    )
    .detail(format!("Average gap: {:.1} days", StatsHelper::mean(&gaps)))
    .detail(format!("Gap standard deviation: {:.1} days", StatsHelper::std_dev(&gaps)));

    Ok(if score >= 60.0 {
        answer.insight("Predictable uploads help viewers build a habit around the channel.")
    } else {
        answer.insight("Setting a fixed publishing schedule could make uploads more predictable.")
    })
}

fn weekday_index(video: &ChannelVideo) -> usize {
    video.published_at.weekday().num_days_from_monday() as usize
}

fn upload_weekday_distribution(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 5, "videos")?;
    let mut counts = [0usize; 7];
    for video in input.history {
        counts[weekday_index(video)] += 1;
    }
    let busiest = fullest(&counts);
    let total = input.history.len() as f64;
    let chart = Chart::new(
        ChartType::Bar,
        WEEKDAYS
            .iter()
            .zip(counts)
            .map(|(day, count)| (weekday_name(*day).to_string(), count as f64))
            .collect(),
    );

    Ok(Answer::new(
        format!(
            "{} is the most common upload day ({:.0}% of uploads).",
            weekday_name(WEEKDAYS[busiest]),
            pct(counts[busiest] as f64, total)
        ),
        json!({ "busiestDay": weekday_name(WEEKDAYS[busiest]), "counts": counts }),
    )
    .details(
        WEEKDAYS
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(day, count)| format!("{}: {} upload(s)", weekday_name(*day), count)),
    )
    .chart(chart))
}

fn best_upload_weekday(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 10, "videos")?;
    let mut by_day: [Vec<&ChannelVideo>; 7] = Default::default();
    for video in input.history {
        by_day[weekday_index(video)].push(video);
    }
    let averages: Vec<(usize, f64)> = by_day
        .iter()
        .enumerate()
        .filter(|(_, vids)| !vids.is_empty())
        .map(|(day, vids)| (day, StatsHelper::mean(&views(vids))))
        .collect();
    let (best, best_avg) = averages
        .iter()
        .copied()
        .fold((0, f64::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
    let overall = StatsHelper::mean(&views(&input.videos(VideoType::Both)));

    let chart = Chart::new(
        ChartType::Bar,
        averages
            .iter()
            .map(|(day, avg)| (weekday_name(WEEKDAYS[*day]).to_string(), avg.round()))
            .collect(),
    );
    Ok(Answer::new(
        format!(
            "Uploads published on {} average the most views ({} per video).",
            weekday_name(WEEKDAYS[best]),
            format_compact(best_avg)
        ),
        json!({ "bestDay": weekday_name(WEEKDAYS[best]), "averageViews": best_avg.round() }),
    )
    .details(averages.iter().map(|(day, avg)| {
        format!(
            "{}: {} average views over {} upload(s)",
            weekday_name(WEEKDAYS[*day]),
            format_compact(*avg),
            by_day[*day].len()
        )
    }))
    .detail(format!("Channel average: {} views", format_compact(overall)))
    .chart(chart)
    .insight("Day-of-week effects are small on most channels; treat this as a hint, not a rule."))
}

const DAY_PARTS: [&str; 4] = [
    "Night (00-06 UTC)",
    "Morning (06-12 UTC)",
    "Afternoon (12-18 UTC)",
    "Evening (18-24 UTC)",
];

fn upload_time_of_day(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 5, "videos")?;
    let mut counts = [0usize; 4];
    for video in input.history {
        counts[(video.published_at.hour() / 6) as usize] += 1;
    }
    let busiest = fullest(&counts);
    let total = input.history.len() as f64;

    Ok(Answer::new(
        format!(
            "Most uploads go out in the {} window ({:.0}%).",
            DAY_PARTS[busiest],
            pct(counts[busiest] as f64, total)
        ),
        json!({ "busiestWindow": DAY_PARTS[busiest], "counts": counts }),
    )
    .details(
        DAY_PARTS
            .iter()
            .zip(counts)
            .map(|(part, count)| format!("{}: {} upload(s)", part, count)),
    )
    .chart(Chart::new(
        ChartType::Pie,
        DAY_PARTS
            .iter()
            .zip(counts)
            .map(|(part, count)| (part.to_string(), count as f64))
            .collect(),
    ))
    .insight("Publishing a couple of hours before the audience's peak time gives videos a head start."))
}

fn days_since_last_upload(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 1, "videos")?;
    let latest = input
        .history
        .iter()
        .map(|v| v.published_at)
        .max()
        .ok_or(CalcError::InsufficientData {
            required: 1,
            available: 0,
            subject: "videos",
        })?;
    let days = input.days_since(latest).floor();

    let answer = Answer::new(
        format!("The last upload was {:.0} day(s) ago.", days),
        json!({ "days": days, "lastUpload": latest }),
    )
    .detail(format!("Most recent upload: {}", latest.format("%Y-%m-%d")));

    Ok(if days > 30.0 {
        answer.insight("It has been over a month since the last upload; a new video could re-engage subscribers.")
    } else if days <= 7.0 {
        answer.insight("The channel is actively uploading.")
    } else {
        answer.insight("Uploads are reasonably recent.")
    })
}

fn recent_upload_activity(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 1, "videos")?;
    let within = |days: i64| {
        let cutoff = input.now - Duration::days(days);
        input.history.iter().filter(|v| v.published_at >= cutoff).count()
    };
    let last_30 = within(30);
    let last_90 = within(90);

    let answer = Answer::new(
        format!(
            "{} upload(s) in the last 30 days and {} in the last 90 days.",
            last_30, last_90
        ),
        json!({ "last30Days": last_30, "last90Days": last_90 }),
    )
    .detail(format!("Analyzed {} recent uploads", input.history.len()));

    Ok(if last_90 == 0 {
        answer.insight("No uploads in the last three months; the channel looks inactive.")
    } else if last_30 >= 4 {
        answer.insight("Roughly weekly or better over the past month.")
    } else {
        answer.insight("Activity has been light recently.")
    })
}
