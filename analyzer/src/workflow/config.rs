use anyhow::Context;
use creatorcore::analytics::DEFAULT_HISTORY_LIMIT;
use creatorcore::prelude::{HeatmapConfig, TextHeuristics};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run can tune, loaded from YAML. Missing keys keep their defaults.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    pub heatmap: HeatmapConfig,
    pub text: TextHeuristics,
    /// JSON file backing the calculation history; in-memory when unset.
    pub history_path: Option<PathBuf>,
    pub history_limit: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            heatmap: HeatmapConfig::default(),
            text: TextHeuristics::default(),
            history_path: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_core_defaults() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.heatmap, HeatmapConfig::default());
        assert_eq!(cfg.history_limit, 10);
        assert!(cfg.history_path.is_none());
    }

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"heatmap:\n  max_dimension: 400\n  blur_radius: 8\ntext:\n  sharp_edge_threshold: 55.0\nhistory_limit: 5\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.heatmap.max_dimension, 400);
        assert_eq!(cfg.heatmap.blur_radius, 8);
        assert_eq!(cfg.heatmap.blur_stride, 2);
        assert_eq!(cfg.text.sharp_edge_threshold, 55.0);
        assert_eq!(cfg.history_limit, 5);
    }

    #[test]
    fn malformed_yaml_is_reported_with_path() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"heatmap: [not, a, map]\n").unwrap();
        let path = temp.into_temp_path();
        let err = WorkflowConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing workflow config"));
    }
}
