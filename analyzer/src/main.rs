use anyhow::Context;
use clap::Parser;
use creatorcore::analytics::{questions_in, AnalyticsResult, QuestionCategory, QUESTIONS};
use generator::profile::{build_session_records, ChannelProfile};
use generator::thumbnail::build_thumbnail;
use gui_bridge::bridge::GuiBridge;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::{load_records, Runner, ThumbnailAnalysis};

mod generator;
mod gui_bridge;
mod workflow;

const CATEGORIES: [QuestionCategory; 5] = [
    QuestionCategory::PostingFrequency,
    QuestionCategory::ContentMix,
    QuestionCategory::Performance,
    QuestionCategory::Engagement,
    QuestionCategory::Growth,
];

#[derive(Parser)]
#[command(author, version, about = "Thumbnail heatmaps and channel analytics from the command line")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Thumbnail to score (16:9 image, at most 50MB)
    #[arg(long)]
    image: Option<PathBuf>,
    /// Where to write the heatmap PNG
    #[arg(long)]
    output: Option<PathBuf>,
    /// JSON file with { video, channel, history }
    #[arg(long)]
    records: Option<PathBuf>,
    /// Question id to answer; repeat for several
    #[arg(long = "question")]
    questions: Vec<String>,
    #[arg(long, default_value_t = false)]
    all_questions: bool,
    #[arg(long, default_value_t = false)]
    list_questions: bool,
    /// Use a seeded synthetic channel and thumbnail instead of files
    #[arg(long, default_value_t = false)]
    demo: bool,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Keep the HTTP bridge alive until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn print_catalog() {
    for category in CATEGORIES {
        println!("{}", category.label());
        for question in questions_in(category) {
            println!("  {:<34} {}", question.id, question.question_text);
        }
    }
}

fn print_thumbnail(analysis: &ThumbnailAnalysis) {
    let report = &analysis.report;
    println!("Overall: {:.1}/100", report.overall);
    for (name, score) in [
        ("Composition", &report.composition),
        ("Lighting", &report.lighting),
        ("Text readability", &report.text_readability),
        ("Subject clarity", &report.subject_clarity),
    ] {
        println!("  {:<17} {:>3}  {}", name, score.score, score.reason);
    }
    for insight in &report.insights {
        println!("  * {}", insight);
    }
}

fn print_result(result: &AnalyticsResult) {
    println!("[{}] {}", result.question_id, result.question_text);
    println!("  {}", result.answer);
    for detail in &result.details {
        println!("    - {}", detail);
    }
    for insight in &result.insights {
        println!("    * {}", insight);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list_questions {
        print_catalog();
        return Ok(());
    }

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    let runner = Runner::new(workflow_config);

    let analysis = match (&args.image, args.demo) {
        (Some(path), _) => Some(runner.analyze_upload(path)?),
        (None, true) => Some(runner.analyze_image(&build_thumbnail(1280, 720, args.seed))),
        (None, false) => None,
    };
    if let Some(analysis) = &analysis {
        print_thumbnail(analysis);
        if let Some(output) = &args.output {
            runner.write_heatmap(analysis, output)?;
            println!("Heatmap written to {}", output.display());
        }
    }

    let ids: Vec<String> = if args.all_questions {
        QUESTIONS.iter().map(|q| q.id.to_string()).collect()
    } else {
        args.questions.clone()
    };
    if !ids.is_empty() {
        let records = match (&args.records, args.demo) {
            (Some(path), _) => load_records(path)?,
            (None, true) => {
                let profile = ChannelProfile {
                    seed: args.seed,
                    ..Default::default()
                };
                build_session_records(&profile, chrono::Utc::now())
            }
            (None, false) => anyhow::bail!("--question needs --records or --demo"),
        };
        let mut history = runner.open_history();
        for result in runner.answer_questions(records, &ids, &mut history)? {
            print_result(&result);
        }
    }

    if args.serve {
        let gui_bridge = GuiBridge::new(runner.open_history());
        let _server = gui_bridge.start();
        gui_bridge.publish_status("HTTP bridge running on 127.0.0.1:9000 (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        let metrics = gui_bridge.metrics();
        log::info!(
            "bridge stopped after {} answers ({} insufficient, {} failed)",
            metrics.processed,
            metrics.insufficient,
            metrics.errors
        );
    }

    Ok(())
}
