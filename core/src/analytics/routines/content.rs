use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::analytics::catalog::VideoType;
use crate::analytics::duration::format_duration;
use crate::analytics::input::AnalyticsInput;
use crate::analytics::models::ChannelVideo;
use crate::analytics::result::{ensure_samples, Answer, CalcResult, Chart, ChartType};
use crate::analytics::routines::{
    format_compact, fullest, length_bucket, long_form_bucket, pct, round1, shorts_bucket,
    split_halves, trend_answer, views, Routine, LENGTH_BUCKETS, LONG_FORM_BUCKETS, SHORTS_BUCKETS,
};
use crate::math::StatsHelper;

pub const ROUTINES: &[(&str, Routine)] = &[
    ("average-video-length", average_video_length),
    ("shorts-length-distribution", shorts_length_distribution),
    ("long-form-length-distribution", long_form_length_distribution),
    ("content-mix", content_mix),
    ("video-length-trend", video_length_trend),
    ("length-vs-views", length_vs_views),
    ("current-video-length", current_video_length),
    ("title-length", title_length),
    ("title-questions", title_questions),
    ("title-numbers", title_numbers),
    ("common-title-words", common_title_words),
    ("tag-usage", tag_usage),
    ("description-length", description_length),
];

/// Combined character budget the platform allows for tags.
pub const TAG_CHARACTER_LIMIT: usize = 500;
const MIN_DESCRIPTION_CHARS: usize = 200;
const TOP_WORDS: usize = 5;

static TITLE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9']+").expect("title word pattern compiles"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("link pattern compiles"));
static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("hashtag pattern compiles"));

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "you", "your", "with", "this", "that", "are", "was", "how", "what",
    "why", "who", "when", "from", "have", "has", "not", "but", "all", "can", "our", "out",
    "get", "its", "it's", "just", "into", "about", "will", "them", "they", "his", "her",
    "than", "then", "video", "official",
];

fn durations(videos: &[&ChannelVideo]) -> Vec<f64> {
    videos.iter().map(|v| v.duration_seconds as f64).collect()
}

fn average_video_length(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = input.videos(VideoType::Both);
    ensure_samples(videos.len(), 1, "videos")?;
    let mean = StatsHelper::mean(&durations(&videos));
    let shorts = videos.iter().filter(|v| v.is_short()).count();

    let answer = Answer::new(
        format!("The average video runs {}.", format_duration(mean.round() as u64)),
        json!({ "averageSeconds": mean.round(), "shorts": shorts, "longForm": videos.len() - shorts }),
    )
    .detail(format!("{} Shorts and {} long-form videos analyzed", shorts, videos.len() - shorts))
    .detail(format!(
        "Median length: {}",
        format_duration(StatsHelper::median(&durations(&videos)).round() as u64)
    ));
    Ok(if mean > 1200.0 {
        answer.insight("Long runtimes suit deep-dive content; strong chaptering keeps viewers oriented.")
    } else {
        answer.insight("Compact runtimes make videos easy to finish.")
    })
}

fn distribution(
    input: &AnalyticsInput,
    kind: VideoType,
    labels: &[&str],
    bucket: fn(u64) -> usize,
) -> CalcResult<Answer> {
    let videos = input.videos(kind);
    ensure_samples(videos.len(), 3, kind.noun())?;
    let mut counts = vec![0usize; labels.len()];
    for video in &videos {
        counts[bucket(video.duration_seconds)] += 1;
    }
    let preferred = fullest(&counts);
    let total = videos.len() as f64;

    Ok(Answer::new(
        format!(
            "Most {} fall in the {} range ({:.0}%).",
            kind.noun(),
            labels[preferred],
            pct(counts[preferred] as f64, total)
        ),
        json!({ "preference": labels[preferred], "counts": counts }),
    )
    .details(labels.iter().zip(&counts).map(|(label, count)| {
        format!("{}: {} ({:.0}%)", label, count, pct(*count as f64, total))
    }))
    .chart(Chart::new(
        ChartType::Bar,
        labels
            .iter()
            .zip(&counts)
            .map(|(label, count)| (label.to_string(), *count as f64))
            .collect(),
    ))
    .insight(format!(
        "The {} range is this channel's preferred length for {}.",
        labels[preferred],
        kind.noun()
    )))
}

fn shorts_length_distribution(input: &AnalyticsInput) -> CalcResult<Answer> {
    distribution(input, VideoType::Shorts, &SHORTS_BUCKETS, shorts_bucket)
}

fn long_form_length_distribution(input: &AnalyticsInput) -> CalcResult<Answer> {
    distribution(input, VideoType::LongForm, &LONG_FORM_BUCKETS, long_form_bucket)
}

fn content_mix(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 1, "videos")?;
    let shorts = input.videos(VideoType::Shorts).len() as f64;
    let total = input.history.len() as f64;
    let long_form = total - shorts;
    let shorts_pct = pct(shorts, total);

    let answer = Answer::new(
        format!(
            "{:.0}% Shorts and {:.0}% long-form videos.",
            shorts_pct,
            100.0 - shorts_pct
        ),
        json!({ "shortsPercent": round1(shorts_pct), "longFormPercent": round1(100.0 - shorts_pct) }),
    )
    .detail(format!("{} Shorts", shorts))
    .detail(format!("{} long-form videos", long_form))
    .chart(Chart::new(
        ChartType::Pie,
        vec![("Shorts".into(), shorts), ("Long-form".into(), long_form)],
    ));

    Ok(if shorts == 0.0 {
        answer.insight("No Shorts yet; Shorts can be a low-cost way to reach new viewers.")
    } else if long_form == 0.0 {
        answer.insight("Shorts only; long-form videos tend to build deeper audience loyalty.")
    } else {
        answer.insight("A mix of formats reaches both browsing and binge-watching audiences.")
    })
}

fn video_length_trend(input: &AnalyticsInput) -> CalcResult<Answer> {
    let videos = input.chronological(VideoType::Both);
    ensure_samples(videos.len(), 10, "videos")?;
    let (earlier, later) = split_halves(&videos);
    Ok(trend_answer(
        "Average video length",
        StatsHelper::mean(&durations(earlier)),
        StatsHelper::mean(&durations(later)),
        |secs| format_duration(secs.round() as u64),
    ))
}

fn length_vs_views(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 10, "videos")?;
    let mut buckets: Vec<Vec<&ChannelVideo>> = vec![Vec::new(); LENGTH_BUCKETS.len()];
    for video in input.history {
        buckets[length_bucket(video)].push(video);
    }
    let averages: Vec<(usize, f64)> = buckets
        .iter()
        .enumerate()
        .filter(|(_, vids)| !vids.is_empty())
        .map(|(i, vids)| (i, StatsHelper::mean(&views(vids))))
        .collect();
    let (best, best_avg) = averages
        .iter()
        .copied()
        .fold((0, f64::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });

    Ok(Answer::new(
        format!(
            "{} videos perform best, averaging {} views.",
            LENGTH_BUCKETS[best],
            format_compact(best_avg)
        ),
        json!({ "bestBucket": LENGTH_BUCKETS[best], "averageViews": best_avg.round() }),
    )
    .details(averages.iter().map(|(i, avg)| {
        format!(
            "{}: {} average views ({} videos)",
            LENGTH_BUCKETS[*i],
            format_compact(*avg),
            buckets[*i].len()
        )
    }))
    .chart(Chart::new(
        ChartType::Bar,
        averages
            .iter()
            .map(|(i, avg)| (LENGTH_BUCKETS[*i].to_string(), avg.round()))
            .collect(),
    ))
    .insight(format!(
        "Leaning into {} content could lift average views.",
        LENGTH_BUCKETS[best].to_lowercase()
    )))
}

fn current_video_length(input: &AnalyticsInput) -> CalcResult<Answer> {
    let baseline: Vec<&ChannelVideo> = input
        .history
        .iter()
        .filter(|v| v.id != input.video.id)
        .collect();
    ensure_samples(baseline.len(), 5, "other videos")?;
    let lengths = durations(&baseline);
    let mean = StatsHelper::mean(&lengths);
    let own = input.video.duration_seconds as f64;
    let rank = StatsHelper::percentile_rank(&lengths, own);
    let relation = if own > mean * 1.1 {
        "longer than"
    } else if own < mean * 0.9 {
        "shorter than"
    } else {
        "about the same as"
    };

    Ok(Answer::new(
        format!(
            "At {}, this video is {} the channel average of {}.",
            format_duration(input.video.duration_seconds),
            relation,
            format_duration(mean.round() as u64)
        ),
        json!({ "seconds": input.video.duration_seconds, "channelAverageSeconds": mean.round(), "percentile": round1(rank) }),
    )
    .detail(format!("Longer than {:.0}% of recent uploads", rank))
    .insight("Matching the length viewers expect from the channel helps retention."))
}

fn title_length(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 5, "videos")?;
    let chars = |v: &&ChannelVideo| v.title.chars().count() as f64;
    let all: Vec<f64> = input.history.iter().map(|v| chars(&v)).collect();
    let mut ranked: Vec<&ChannelVideo> = input.history.iter().collect();
    ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    let top_n = (ranked.len() / 4).max(1);
    let top: Vec<f64> = ranked[..top_n].iter().map(chars).collect();
    let average = StatsHelper::mean(&all);
    let top_average = StatsHelper::mean(&top);

    let answer = Answer::new(
        format!(
            "Titles average {:.0} characters; the top {} video(s) average {:.0}.",
            average, top_n, top_average
        ),
        json!({ "averageChars": round1(average), "topAverageChars": round1(top_average) }),
    )
    .detail(format!("This video's title: {} characters", input.video.title.chars().count()));

    Ok(if average > 70.0 {
        answer.insight("Titles over about 70 characters get truncated in search results.")
    } else {
        answer.insight("Title lengths fit comfortably in search and suggested feeds.")
    })
}

fn split_by_title(
    input: &AnalyticsInput,
    feature: &str,
    has: impl Fn(&str) -> bool,
) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 10, "videos")?;
    let (with, without): (Vec<&ChannelVideo>, Vec<&ChannelVideo>) =
        input.history.iter().partition(|v| has(v.title.as_str()));
    if with.is_empty() || without.is_empty() {
        let share = if with.is_empty() { "None" } else { "All" };
        return Ok(Answer::new(
            format!("{} of the recent titles use {}, so there is nothing to compare.", share, feature),
            json!({ "withCount": with.len(), "withoutCount": without.len() }),
        )
        .insight(format!("Try a few titles with {} to see how viewers respond.", feature)));
    }
    let with_avg = StatsHelper::mean(&views(&with));
    let without_avg = StatsHelper::mean(&views(&without));
    let lift = StatsHelper::percent_change(without_avg, with_avg);
    let verdict = match lift {
        Some(p) if p > 10.0 => "outperform",
        Some(p) if p < -10.0 => "underperform",
        _ => "perform about the same as",
    };

    Ok(Answer::new(
        format!("Titles with {} {} the rest.", feature, verdict),
        json!({
            "withAverage": with_avg.round(),
            "withoutAverage": without_avg.round(),
            "percentDifference": lift.map(round1),
        }),
    )
    .detail(format!("With {}: {} videos, {} average views", feature, with.len(), format_compact(with_avg)))
    .detail(format!("Without: {} videos, {} average views", without.len(), format_compact(without_avg)))
    .chart(Chart::new(
        ChartType::Bar,
        vec![
            (format!("With {}", feature), with_avg.round()),
            ("Without".into(), without_avg.round()),
        ],
    ))
    .insight("Small samples make title effects noisy; look for consistent patterns over time."))
}

fn title_questions(input: &AnalyticsInput) -> CalcResult<Answer> {
    split_by_title(input, "a question", |title| title.contains('?'))
}

fn title_numbers(input: &AnalyticsInput) -> CalcResult<Answer> {
    split_by_title(input, "numbers", |title| title.chars().any(|c| c.is_ascii_digit()))
}

/// Most frequent non-stop words; ties break alphabetically.
pub fn top_title_words<'a, I>(titles: I, limit: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for title in titles {
        let lower = title.to_lowercase();
        for word in TITLE_WORD.find_iter(&lower) {
            let word = word.as_str().trim_matches('\'');
            if word.len() < 3 || STOP_WORDS.contains(&word) || word.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            *counts.entry(word.to_string()).or_default() += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

fn common_title_words(input: &AnalyticsInput) -> CalcResult<Answer> {
    ensure_samples(input.history.len(), 10, "videos")?;
    let words = top_title_words(input.history.iter().map(|v| v.title.as_str()), TOP_WORDS);
    if words.is_empty() {
        return Ok(Answer::new(
            "No recurring title words stand out.",
            json!({ "words": [] }),
        ));
    }
    let listed: Vec<&str> = words.iter().map(|(w, _)| w.as_str()).collect();

    Ok(Answer::new(
        format!("Recurring title themes: {}.", listed.join(", ")),
        json!({ "words": words.iter().map(|(w, c)| json!({ "word": w, "count": c })).collect::<Vec<_>>() }),
    )
    .details(words.iter().map(|(w, c)| format!("\"{}\" appears in {} title(s)", w, c)))
    .chart(Chart::new(
        ChartType::Bar,
        words.iter().map(|(w, c)| (w.clone(), *c as f64)).collect(),
    ))
    .insight("Recurring words show which topics the channel is known for."))
}

fn tag_usage(input: &AnalyticsInput) -> CalcResult<Answer> {
    let tags = &input.video.tags;
    let characters: usize = tags.iter().map(|t| t.chars().count()).sum();
    let answer = Answer::new(
        format!(
            "This video uses {} tag(s) totalling {} of {} characters.",
            tags.len(),
            characters,
            TAG_CHARACTER_LIMIT
        ),
        json!({ "count": tags.len(), "characters": characters }),
    )
    .details(tags.iter().map(|t| format!("Tag: {}", t)));

    Ok(if tags.is_empty() {
        answer.insight("No tags set; a few accurate tags help with misspelled searches.")
    } else if characters > TAG_CHARACTER_LIMIT {
        answer.insight("Tags exceed the character limit and may be rejected on save.")
    } else {
        answer.insight("Tags are within limits; titles and descriptions matter more for discovery.")
    })
}

fn description_length(input: &AnalyticsInput) -> CalcResult<Answer> {
    let description = &input.video.description;
    let chars = description.chars().count();
    let words = description.split_whitespace().count();
    let links = LINK.find_iter(description).count();
    let hashtags = HASHTAG.find_iter(description).count();

    let answer = Answer::new(
        format!("The description has {} characters ({} words).", chars, words),
        json!({ "characters": chars, "words": words, "links": links, "hashtags": hashtags }),
    )
    .detail(format!("{} link(s)", links))
    .detail(format!("{} hashtag(s)", hashtags));

    Ok(if chars < MIN_DESCRIPTION_CHARS {
        answer.insight("A longer description with keywords and timestamps helps search discovery.")
    } else {
        answer.insight("The description has enough detail for search to work with.")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::routines::fixtures::{channel, clip, input, video, weekly_history};

    #[test]
    fn title_words_skip_stop_words_and_break_ties_alphabetically() {
        let titles = ["The Zebra Guide", "Apple and Zebra", "Apple pie for you"];
        let words = top_title_words(titles.iter().copied(), 3);
        assert_eq!(
            words,
            vec![("apple".to_string(), 2), ("zebra".to_string(), 2), ("guide".to_string(), 1)]
        );
    }

    #[test]
    fn shorts_distribution_reports_preference() {
        let history = vec![
            clip("a", 1, 10, 15),
            clip("b", 2, 10, 25),
            clip("c", 3, 10, 30),
            clip("d", 4, 10, 600),
        ];
        let (video, channel) = (video(), channel());
        let answer = shorts_length_distribution(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value["preference"], "20-40s");
        assert_eq!(answer.value["counts"], json!([1, 2, 0]));
    }

    #[test]
    fn content_mix_splits_percentages() {
        let history = vec![clip("a", 1, 10, 30), clip("b", 2, 10, 600), clip("c", 3, 10, 700), clip("d", 4, 10, 800)];
        let (video, channel) = (video(), channel());
        let answer = content_mix(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value["shortsPercent"], 25.0);
    }

    #[test]
    fn description_counts_links_and_hashtags() {
        let (video, channel) = (video(), channel());
        let history = Vec::new();
        let answer = description_length(&input(&video, &channel, &history)).unwrap();
        assert_eq!(answer.value["links"], 1);
        assert_eq!(answer.value["hashtags"], 2);
    }

    #[test]
    fn title_feature_without_examples_is_still_answered() {
        let history = weekly_history(10);
        let (video, channel) = (video(), channel());
        let answer = title_questions(&input(&video, &channel, &history)).unwrap();
        assert!(answer.answer.starts_with("None of the recent titles"));
    }
}
