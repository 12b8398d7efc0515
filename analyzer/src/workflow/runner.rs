use crate::workflow::config::WorkflowConfig;
use crate::workflow::store::HistoryStore;
use crate::workflow::upload::{validate_aspect, validate_file};
use anyhow::Context;
use creatorcore::analytics::{
    AnalyticsResult, AnalyticsSession, CalculationHistory, KeyValueStore, SessionRecords,
};
use creatorcore::imaging::PixelBuffer;
use creatorcore::processing::HeatmapPipeline;
use creatorcore::scoring::ThumbnailReport;
use log::{info, warn};
use std::fs;
use std::path::Path;

pub struct ThumbnailAnalysis {
    pub report: ThumbnailReport,
    pub heatmap: PixelBuffer,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    pipeline: HeatmapPipeline,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let pipeline = HeatmapPipeline::new(config.heatmap.clone());
        Self { config, pipeline }
    }

    /// Scores and renders an already-validated image. Never fails.
    pub fn analyze_image(&self, source: &PixelBuffer) -> ThumbnailAnalysis {
        let report = ThumbnailReport::analyze_with(source, &self.config.text);
        let heatmap = self.pipeline.render_or_original(source);
        ThumbnailAnalysis { report, heatmap }
    }

    pub fn analyze_upload(&self, path: &Path) -> anyhow::Result<ThumbnailAnalysis> {
        let size = fs::metadata(path)
            .with_context(|| format!("reading metadata for {}", path.display()))?
            .len();
        validate_file(path, size)?;
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let source = PixelBuffer::decode(&bytes)
            .with_context(|| format!("decoding {}", path.display()))?;
        validate_aspect(source.width(), source.height())?;
        info!(
            "analyzing {} ({}x{})",
            path.display(),
            source.width(),
            source.height()
        );
        Ok(self.analyze_image(&source))
    }

    pub fn write_heatmap(&self, analysis: &ThumbnailAnalysis, path: &Path) -> anyhow::Result<()> {
        let png = analysis.heatmap.encode_png().context("encoding heatmap")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, png).with_context(|| format!("writing heatmap {}", path.display()))?;
        Ok(())
    }

    pub fn open_history(&self) -> CalculationHistory<HistoryStore> {
        CalculationHistory::with_limit(
            HistoryStore::from_path(self.config.history_path.as_deref()),
            self.config.history_limit,
        )
    }

    /// Answers each known id once and appends it to `history`; unknown ids are skipped.
    pub fn answer_questions<S: KeyValueStore>(
        &self,
        records: SessionRecords,
        ids: &[String],
        history: &mut CalculationHistory<S>,
    ) -> anyhow::Result<Vec<AnalyticsResult>> {
        let mut session = AnalyticsSession::new(records);
        let now = session.now();
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(result) = session.answer_id(id).cloned() else {
                warn!("skipping unknown question id '{}'", id);
                continue;
            };
            history
                .record(&result, now)
                .context("recording calculation history")?;
            results.push(result);
        }
        let metrics = session.metrics();
        info!(
            "answered {} question(s): {} computed, {} insufficient, {} failed",
            results.len(),
            metrics.processed,
            metrics.insufficient,
            metrics.errors
        );
        Ok(results)
    }
}

pub fn load_records(path: &Path) -> anyhow::Result<SessionRecords> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading records {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing records {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_session_records, ChannelProfile};
    use crate::generator::thumbnail::build_thumbnail;
    use creatorcore::analytics::{MemoryStore, ResultStatus};
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn runner_scores_and_renders_thumbnail() {
        let runner = Runner::new(WorkflowConfig::default());
        let source = build_thumbnail(320, 180, 7);
        let analysis = runner.analyze_image(&source);
        assert_eq!(analysis.heatmap.width(), 320);
        assert!(analysis.report.overall > 0.0);
        assert!(analysis.report.composition.reason.contains("16:9"));
    }

    #[test]
    fn upload_round_trip_writes_png() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("thumb.png");
        fs::write(&input, build_thumbnail(160, 90, 1).encode_png().unwrap()).unwrap();

        let runner = Runner::new(WorkflowConfig::default());
        let analysis = runner.analyze_upload(&input).unwrap();
        let output = dir.path().join("out").join("heatmap.png");
        runner.write_heatmap(&analysis, &output).unwrap();
        let decoded = PixelBuffer::decode(&fs::read(&output).unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (160, 90));
    }

    #[test]
    fn square_upload_is_rejected_before_analysis() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("square.png");
        fs::write(&input, build_thumbnail(90, 90, 1).encode_png().unwrap()).unwrap();
        let runner = Runner::new(WorkflowConfig::default());
        assert!(runner.analyze_upload(&input).is_err());
    }

    #[test]
    fn questions_are_answered_and_recorded() {
        let runner = Runner::new(WorkflowConfig::default());
        let records = build_session_records(&ChannelProfile::default(), chrono::Utc::now());
        let mut history = CalculationHistory::new(MemoryStore::new());
        let ids = vec![
            "upload-gaps".to_string(),
            "made-up".to_string(),
            "engagement-rate".to_string(),
        ];
        let results = runner.answer_questions(records, &ids, &mut history).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.status == ResultStatus::Computed));
        let entries = history.entries().unwrap();
        assert_eq!(entries[0].question_id, "engagement-rate");
    }

    #[test]
    fn records_load_from_json() {
        let records = build_session_records(&ChannelProfile::default(), chrono::Utc::now());
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(serde_json::to_string(&records).unwrap().as_bytes())
            .unwrap();
        let path = temp.into_temp_path();
        assert_eq!(load_records(&path).unwrap(), records);
    }
}
