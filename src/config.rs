use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub filter: FilterConfig,
    pub shape: StudyShape,
    pub scoring: ScoringConfig,
}

/// Which participant records and chunks survive filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Case-insensitive marker identifying experimenter test IDs.
    pub test_marker: String,
    /// Participant IDs must be strictly longer than this.
    pub min_participant_id_len: usize,
    pub missing_session_marker: String,
    pub ending_seq_key: String,
}

/// Design of the quiz: how many forms per session and examples per form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyShape {
    pub forms_per_session: usize,
    pub examples_per_form: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Rule probability treated as participant-declared noise.
    pub noise_reliability: f64,
    pub bonus_decimals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub batch: String,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub bonus_dir: PathBuf,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            test_marker: "test".to_string(),
            min_participant_id_len: 10,
            missing_session_marker: "NO_SESSION_ID".to_string(),
            ending_seq_key: "End".to_string(),
        }
    }
}

impl Default for StudyShape {
    fn default() -> Self {
        Self {
            forms_per_session: 7,
            examples_per_form: 5,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            noise_reliability: 0.75,
            bonus_decimals: 2,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            batch: "00x".to_string(),
            data_dir: PathBuf::from("ignore/data"),
            output_dir: PathBuf::from("ignore/output/v0"),
            bonus_dir: PathBuf::from("ignore/bonus/v0"),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn with_paths(mut self, paths: PathsConfig) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_shape(mut self, shape: StudyShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }
}

impl StudyShape {
    pub fn new(forms_per_session: usize, examples_per_form: usize) -> Self {
        Self {
            forms_per_session,
            examples_per_form,
        }
    }

    pub fn rows_per_session(&self) -> usize {
        self.forms_per_session * self.examples_per_form
    }
}

impl PathsConfig {
    pub fn for_batch(batch: impl Into<String>) -> Self {
        Self {
            batch: batch.into(),
            ..Default::default()
        }
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_bonus_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bonus_dir = dir.into();
        self
    }

    pub fn chunks_file(&self) -> PathBuf {
        self.data_dir.join(format!("chunks_{}.json", self.batch))
    }

    pub fn ids_file(&self) -> PathBuf {
        self.data_dir
            .join(format!("d_prolific_worker_ids_{}.tsv", self.batch))
    }

    pub fn valid_endings_file(&self) -> PathBuf {
        self.output_dir
            .join(format!("valid_end_chunks_{}.json", self.batch))
    }

    pub fn branches_file(&self) -> PathBuf {
        self.output_dir.join("branches.csv")
    }

    pub fn rules_file(&self) -> PathBuf {
        self.output_dir.join("rules.csv")
    }

    pub fn bonus_ids_file(&self) -> PathBuf {
        self.bonus_dir.join(format!("bonus_ids_{}.csv", self.batch))
    }

    pub fn bonus_amounts_file(&self) -> PathBuf {
        self.bonus_dir
            .join(format!("bonus_ids_amounts_{}.csv", self.batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_study_design() {
        let config = PipelineConfig::default();
        assert_eq!(config.shape.rows_per_session(), 35);
        assert_eq!(config.scoring.noise_reliability, 0.75);
        assert_eq!(config.filter.min_participant_id_len, 10);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"paths": {"batch": "01a"}, "shape": {"forms_per_session": 3}}"#)
                .unwrap();

        assert_eq!(config.paths.batch, "01a");
        assert_eq!(config.paths.data_dir, PathBuf::from("ignore/data"));
        assert_eq!(config.shape, StudyShape::new(3, 5));
        assert_eq!(config.filter, FilterConfig::default());
    }

    #[test]
    fn test_batch_file_names() {
        let paths = PathsConfig::for_batch("00x").with_data_dir("data").with_bonus_dir("bonus");

        assert_eq!(paths.chunks_file(), PathBuf::from("data/chunks_00x.json"));
        assert_eq!(
            paths.ids_file(),
            PathBuf::from("data/d_prolific_worker_ids_00x.tsv")
        );
        assert_eq!(
            paths.bonus_amounts_file(),
            PathBuf::from("bonus/bonus_ids_amounts_00x.csv")
        );
    }
}
