use serde::Serialize;

use self::Complexity::{Advanced, Basic, Intermediate};
use self::QuestionCategory::{ContentMix, Engagement, Growth, Performance, PostingFrequency};
use self::VideoType::{Both, LongForm, Shorts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionCategory {
    PostingFrequency,
    ContentMix,
    Performance,
    Engagement,
    Growth,
}

impl QuestionCategory {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionCategory::PostingFrequency => "Posting Frequency & Consistency",
            QuestionCategory::ContentMix => "Video Length & Content",
            QuestionCategory::Performance => "Viewership & Performance",
            QuestionCategory::Engagement => "Audience Engagement",
            QuestionCategory::Growth => "Channel Growth",
        }
    }
}

/// Which uploads a question applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoType {
    Both,
    LongForm,
    Shorts,
}

impl VideoType {
    pub fn matches(&self, is_short: bool) -> bool {
        match self {
            VideoType::Both => true,
            VideoType::LongForm => !is_short,
            VideoType::Shorts => is_short,
        }
    }

    /// Plural noun used in answers and insufficient-data messages.
    pub fn noun(&self) -> &'static str {
        match self {
            VideoType::Both => "videos",
            VideoType::LongForm => "long-form videos",
            VideoType::Shorts => "Shorts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Basic,
    Intermediate,
    Advanced,
}

/// Static catalog entry; never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuestion {
    pub id: &'static str,
    pub question_text: &'static str,
    pub category: QuestionCategory,
    pub description: &'static str,
    pub video_type: VideoType,
    pub complexity: Complexity,
    pub tags: &'static [&'static str],
}

const fn question(
    id: &'static str,
    category: QuestionCategory,
    video_type: VideoType,
    complexity: Complexity,
    question_text: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
) -> AnalyticsQuestion {
    AnalyticsQuestion {
        id,
        question_text,
        category,
        description,
        video_type,
        complexity,
        tags,
    }
}

pub static QUESTIONS: &[AnalyticsQuestion] = &[
    // Posting frequency & consistency
    question(
        "posting-frequency",
        PostingFrequency,
        Both,
        Basic,
        "How often does this channel upload?",
        "Average uploads per week across the channel's lifetime.",
        &["frequency", "schedule"],
    ),
    question(
        "shorts-posting-frequency",
        PostingFrequency,
        Shorts,
        Basic,
        "How often does this channel post Shorts?",
        "Average Shorts uploads per week across the channel's lifetime.",
        &["frequency", "shorts"],
    ),
    question(
        "long-form-posting-frequency",
        PostingFrequency,
        LongForm,
        Basic,
        "How often does this channel post long-form videos?",
        "Average long-form uploads per week across the channel's lifetime.",
        &["frequency", "long-form"],
    ),
    question(
        "upload-gaps",
        PostingFrequency,
        Both,
        Intermediate,
        "How long are the gaps between uploads?",
        "Shortest, longest and average days between consecutive uploads, with hiatuses.",
        &["gaps", "consistency"],
    ),
    question(
        "hiatus-history",
        PostingFrequency,
        Both,
        Intermediate,
        "Has this channel taken any long breaks?",
        "Every gap longer than 90 days between consecutive uploads.",
        &["hiatus", "consistency"],
    ),
    question(
        "posting-frequency-trend",
        PostingFrequency,
        Both,
        Advanced,
        "Is the channel uploading more or less often than before?",
        "Upload rate in the earlier half of recent uploads versus the later half.",
        &["trend", "frequency"],
    ),
    question(
        "posting-consistency",
        PostingFrequency,
        Both,
        Intermediate,
        "How consistent is the upload schedule?",
        "Variation of the gaps between uploads, scored 0-100.",
        &["consistency", "schedule"],
    ),
    question(
        "upload-weekday-distribution",
        PostingFrequency,
        Both,
        Basic,
        "Which days of the week does the channel upload on?",
        "Upload counts per weekday.",
        &["schedule", "weekday"],
    ),
    question(
        "best-upload-weekday",
        PostingFrequency,
        Both,
        Intermediate,
        "Which upload day gets the most views?",
        "Average views of uploads grouped by publish weekday.",
        &["schedule", "weekday", "views"],
    ),
    question(
        "upload-time-of-day",
        PostingFrequency,
        Both,
        Basic,
        "What time of day does the channel usually publish?",
        "Upload counts by UTC time-of-day window.",
        &["schedule", "time"],
    ),
    question(
        "days-since-last-upload",
        PostingFrequency,
        Both,
        Basic,
        "How long ago was the last upload?",
        "Days elapsed since the most recent upload.",
        &["recency"],
    ),
    question(
        "recent-upload-activity",
        PostingFrequency,
        Both,
        Basic,
        "How active has the channel been recently?",
        "Uploads in the last 30 and 90 days.",
        &["recency", "frequency"],
    ),
    // Video length & content mix
    question(
        "average-video-length",
        ContentMix,
        Both,
        Basic,
        "How long are this channel's videos on average?",
        "Mean duration across recent uploads.",
        &["length"],
    ),
    question(
        "shorts-length-distribution",
        ContentMix,
        Shorts,
        Intermediate,
        "How long are this channel's Shorts?",
        "Shorts grouped into under 20s, 20-40s and 40-60s buckets.",
        &["length", "shorts"],
    ),
    question(
        "long-form-length-distribution",
        ContentMix,
        LongForm,
        Intermediate,
        "How long are this channel's long-form videos?",
        "Long-form uploads grouped into under 5, 5-15, 15-30 and 30+ minute buckets.",
        &["length", "long-form"],
    ),
    question(
        "content-mix",
        ContentMix,
        Both,
        Basic,
        "What share of uploads are Shorts versus long-form?",
        "Percentage split between Shorts and long-form uploads.",
        &["shorts", "long-form", "mix"],
    ),
    question(
        "video-length-trend",
        ContentMix,
        Both,
        Advanced,
        "Are videos getting longer or shorter?",
        "Average duration in the earlier half of uploads versus the later half.",
        &["length", "trend"],
    ),
    question(
        "length-vs-views",
        ContentMix,
        Both,
        Advanced,
        "Which video length performs best?",
        "Average views per duration bucket.",
        &["length", "views"],
    ),
    question(
        "current-video-length",
        ContentMix,
        Both,
        Basic,
        "How does this video's length compare to the channel?",
        "This video's duration against the channel average and distribution.",
        &["length", "comparison"],
    ),
    question(
        "title-length",
        ContentMix,
        Both,
        Intermediate,
        "How long are the titles, and do top videos differ?",
        "Average title length overall and among the top quarter by views.",
        &["titles"],
    ),
    question(
        "title-questions",
        ContentMix,
        Both,
        Intermediate,
        "Do question titles get more views?",
        "Average views of titles containing a question mark versus the rest.",
        &["titles", "views"],
    ),
    question(
        "title-numbers",
        ContentMix,
        Both,
        Intermediate,
        "Do titles with numbers perform better?",
        "Average views of titles containing digits versus the rest.",
        &["titles", "views"],
    ),
    question(
        "common-title-words",
        ContentMix,
        Both,
        Advanced,
        "What themes come up most in titles?",
        "Most frequent meaningful words across recent titles.",
        &["titles", "themes"],
    ),
    question(
        "tag-usage",
        ContentMix,
        Both,
        Basic,
        "How well tagged is this video?",
        "Tag count and total tag length for the analyzed video.",
        &["tags", "seo"],
    ),
    question(
        "description-length",
        ContentMix,
        Both,
        Basic,
        "Is this video's description detailed enough?",
        "Description length, links and hashtags for the analyzed video.",
        &["description", "seo"],
    ),
    // Viewership & performance
    question(
        "average-views",
        Performance,
        Both,
        Basic,
        "How many views does a typical video get?",
        "Mean views across recent uploads.",
        &["views"],
    ),
    question(
        "median-views",
        Performance,
        Both,
        Basic,
        "What is the median view count?",
        "Median views, which resists skew from a few viral hits.",
        &["views"],
    ),
    question(
        "view-milestones",
        Performance,
        Both,
        Basic,
        "What share of videos pass key view milestones?",
        "Percentage of uploads reaching 1K, 10K, 100K and 1M views.",
        &["views", "milestones"],
    ),
    question(
        "current-video-vs-average",
        Performance,
        Both,
        Basic,
        "Is this video doing better than the channel average?",
        "This video's views relative to the channel's other recent uploads.",
        &["views", "comparison"],
    ),
    question(
        "current-video-percentile",
        Performance,
        Both,
        Intermediate,
        "Where does this video rank among recent uploads?",
        "Percentile of this video's views within the channel's recent uploads.",
        &["views", "ranking"],
    ),
    question(
        "top-videos",
        Performance,
        Both,
        Basic,
        "What are the best performing videos?",
        "The five most viewed recent uploads.",
        &["views", "ranking"],
    ),
    question(
        "bottom-videos",
        Performance,
        Both,
        Basic,
        "Which videos underperformed?",
        "The five least viewed recent uploads.",
        &["views", "ranking"],
    ),
    question(
        "view-outliers",
        Performance,
        Both,
        Advanced,
        "Which videos are unusual hits or misses?",
        "Uploads beyond 1.5 standard deviations from the mean view count.",
        &["views", "outliers"],
    ),
    question(
        "views-trend",
        Performance,
        Both,
        Advanced,
        "Are views growing or declining?",
        "Average views in the earlier half of uploads versus the later half.",
        &["views", "trend"],
    ),
    question(
        "shorts-vs-long-form-views",
        Performance,
        Both,
        Intermediate,
        "Do Shorts or long-form videos get more views?",
        "Average views of Shorts compared with long-form uploads.",
        &["views", "shorts", "long-form"],
    ),
    question(
        "current-video-daily-views",
        Performance,
        Both,
        Basic,
        "How many views per day is this video getting?",
        "Lifetime views divided by days since publishing.",
        &["views", "velocity"],
    ),
    question(
        "view-consistency",
        Performance,
        Both,
        Intermediate,
        "How consistent are view counts?",
        "Coefficient of variation of views across uploads.",
        &["views", "consistency"],
    ),
    question(
        "breakout-rate",
        Performance,
        Both,
        Advanced,
        "How often does the channel have a breakout video?",
        "Share of uploads with more than three times the median views.",
        &["views", "viral"],
    ),
    question(
        "lifetime-views-per-video",
        Performance,
        Both,
        Basic,
        "How many views has each video earned over the channel's lifetime?",
        "Total channel views divided by total video count.",
        &["views", "channel"],
    ),
    // Audience engagement
    question(
        "engagement-rate",
        Engagement,
        Both,
        Basic,
        "What is this video's engagement rate?",
        "(Likes + comments) / views for the analyzed video.",
        &["engagement"],
    ),
    question(
        "channel-engagement-rate",
        Engagement,
        Both,
        Basic,
        "What is the channel's overall engagement rate?",
        "Aggregate (likes + comments) / views across recent uploads.",
        &["engagement", "channel"],
    ),
    question(
        "like-ratio",
        Engagement,
        Both,
        Basic,
        "What share of viewers liked this video?",
        "Likes / views for the analyzed video.",
        &["likes"],
    ),
    question(
        "like-ratio-outliers",
        Engagement,
        Both,
        Advanced,
        "Which videos got unusually many or few likes?",
        "Uploads whose like ratio lies beyond 1.5 standard deviations.",
        &["likes", "outliers"],
    ),
    question(
        "engagement-outliers",
        Engagement,
        Both,
        Advanced,
        "Which videos had unusual engagement?",
        "Uploads whose engagement rate lies beyond 1.5 standard deviations.",
        &["engagement", "outliers"],
    ),
    question(
        "comment-rate",
        Engagement,
        Both,
        Basic,
        "How many comments do videos get per 1,000 views?",
        "Aggregate comments per thousand views.",
        &["comments"],
    ),
    question(
        "comments-per-like",
        Engagement,
        Both,
        Intermediate,
        "How chatty is the audience relative to likes?",
        "Aggregate comments divided by likes.",
        &["comments", "likes"],
    ),
    question(
        "engagement-trend",
        Engagement,
        Both,
        Advanced,
        "Is engagement improving over time?",
        "Average engagement in the earlier half of uploads versus the later half.",
        &["engagement", "trend"],
    ),
    question(
        "shorts-vs-long-form-engagement",
        Engagement,
        Both,
        Intermediate,
        "Do Shorts or long-form videos engage better?",
        "Aggregate engagement rate of Shorts compared with long-form uploads.",
        &["engagement", "shorts", "long-form"],
    ),
    question(
        "engagement-by-length",
        Engagement,
        Both,
        Advanced,
        "Which video length gets the best engagement?",
        "Average engagement rate per duration bucket.",
        &["engagement", "length"],
    ),
    question(
        "comments-disabled-estimate",
        Engagement,
        Both,
        Intermediate,
        "Does this channel disable comments?",
        "Estimate of uploads that appear to have comments turned off.",
        &["comments", "estimate"],
    ),
    question(
        "most-discussed-videos",
        Engagement,
        Both,
        Basic,
        "Which videos sparked the most discussion?",
        "The five uploads with the most comments.",
        &["comments", "ranking"],
    ),
    question(
        "top-engaged-videos",
        Engagement,
        Both,
        Intermediate,
        "Which videos have the highest engagement rate?",
        "The five uploads with the best (likes + comments) / views.",
        &["engagement", "ranking"],
    ),
    // Channel growth
    question(
        "channel-age",
        Growth,
        Both,
        Basic,
        "How old is this channel?",
        "Time since the channel was created.",
        &["channel"],
    ),
    question(
        "subscriber-growth-estimate",
        Growth,
        Both,
        Intermediate,
        "How fast is the channel gaining subscribers?",
        "Estimated average subscribers gained per day and month.",
        &["subscribers", "estimate"],
    ),
    question(
        "views-per-subscriber",
        Growth,
        Both,
        Basic,
        "How many views does the channel earn per subscriber?",
        "Total channel views divided by subscribers.",
        &["subscribers", "views"],
    ),
    question(
        "subscriber-conversion",
        Growth,
        Both,
        Intermediate,
        "How well do views turn into subscribers?",
        "Subscribers per 1,000 lifetime views.",
        &["subscribers", "conversion"],
    ),
    question(
        "next-subscriber-milestone",
        Growth,
        Both,
        Intermediate,
        "When will the channel reach its next subscriber milestone?",
        "Estimated days to the next milestone at the historical average rate.",
        &["subscribers", "milestones", "estimate"],
    ),
    question(
        "recent-momentum",
        Growth,
        Both,
        Advanced,
        "Do the latest uploads outperform the ones before?",
        "Average views of the last 10 uploads versus the 10 before them.",
        &["momentum", "views"],
    ),
    question(
        "yearly-upload-volume",
        Growth,
        Both,
        Basic,
        "How many videos were uploaded each year?",
        "Upload counts per calendar year.",
        &["frequency", "history"],
    ),
    question(
        "current-video-reach",
        Growth,
        Both,
        Basic,
        "Did this video reach beyond the subscriber base?",
        "This video's views as a percentage of subscribers.",
        &["reach", "subscribers"],
    ),
    question(
        "catalog-coverage",
        Growth,
        Both,
        Basic,
        "How much of the channel's library does this analysis cover?",
        "Analyzed uploads as a share of the channel's total video count.",
        &["channel", "coverage"],
    ),
];

pub fn find_question(id: &str) -> Option<&'static AnalyticsQuestion> {
    QUESTIONS.iter().find(|q| q.id == id)
}

pub fn questions_in(
    category: QuestionCategory,
) -> impl Iterator<Item = &'static AnalyticsQuestion> {
    QUESTIONS.iter().filter(move |q| q.category == category)
}
