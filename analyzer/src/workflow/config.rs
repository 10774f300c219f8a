use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stormcore::prelude::AnalysisConfig;
use stormcore::segment::OverrideTable;

/// Parameters of one analysis run, loadable from YAML.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// IBTrACS list CSV.
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub analysis: AnalysisConfig,
    /// Per-storm event selection rules keyed by SID.
    pub overrides: OverrideTable,
    /// Additional override table merged over `overrides`.
    pub overrides_file: Option<PathBuf>,
    /// Reject malformed storms individually instead of aborting the run.
    pub skip_invalid: bool,
}

/// Command-line values that take precedence over the workflow file.
#[derive(Clone, Debug, Default)]
pub struct ArgOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub basin: Option<String>,
    pub threshold_km: Option<f64>,
    pub lead_hours: Option<i64>,
    pub overrides_file: Option<PathBuf>,
    pub skip_invalid: bool,
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

    pub fn apply_args(mut self, args: ArgOverrides) -> Self {
        if args.input.is_some() {
            self.input = args.input;
        }
        if args.output.is_some() {
            self.output = args.output;
        }
        if let Some(year) = args.start_year {
            self.analysis.start_year = year;
        }
        if let Some(year) = args.end_year {
            self.analysis.end_year = year;
        }
        if let Some(basin) = args.basin {
            self.analysis.basin = Some(basin);
        }
        if let Some(threshold) = args.threshold_km {
            self.analysis.threshold_km = threshold;
        }
        if let Some(hours) = args.lead_hours {
            self.analysis.lead_hours = hours;
        }
        if args.overrides_file.is_some() {
            self.overrides_file = args.overrides_file;
        }
        self.skip_invalid |= args.skip_invalid;
        self
    }

    /// Inline overrides merged with the ones from `overrides_file`.
    pub fn override_table(&self) -> anyhow::Result<OverrideTable> {
        let mut table = self.overrides.clone();
        if let Some(path) = &self.overrides_file {
            let extra = OverrideTable::load(path)
                .with_context(|| format!("loading override table {}", path.display()))?;
            table.extend(extra);
        }
        Ok(table)
    }

    pub fn to_analysis_config(&self) -> AnalysisConfig {
        self.analysis.clone()
    }

    pub fn input_path(&self) -> anyhow::Result<&Path> {
        self.input
            .as_deref()
            .context("no IBTrACS input given (use --input or `input:` in the workflow)")
    }

    /// The explicit output path, or `default_name` next to the input file.
    pub fn output_path(&self, default_name: &str) -> PathBuf {
        if let Some(path) = &self.output {
            return path.clone();
        }
        let dir = self
            .input
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        dir.join(default_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use stormcore::segment::EventSelection;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_landfall_convention() {
        let cfg = WorkflowConfig::default();
        let analysis = cfg.to_analysis_config();
        assert_eq!(analysis.threshold_km, 111.0);
        assert_eq!(analysis.lead_hours, 72);
        assert!(!cfg.skip_invalid);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"input: /data/ibtracs.NA.list.v04r00.csv\n\
              start_year: 2000\n\
              end_year: 2019\n\
              basin: NA\n\
              overrides:\n  2004223N11301: { rule: last }\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.analysis.start_year, 2000);
        assert_eq!(cfg.analysis.basin.as_deref(), Some("NA"));
        assert_eq!(cfg.analysis.threshold_km, 111.0);
        assert_eq!(
            cfg.override_table().unwrap().rule_for("2004223N11301"),
            &EventSelection::Last
        );
        assert_eq!(
            cfg.output_path("summary.csv"),
            PathBuf::from("/data/summary.csv")
        );
    }

    #[test]
    fn args_take_precedence() {
        let cfg = WorkflowConfig::default().apply_args(ArgOverrides {
            start_year: Some(2019),
            end_year: Some(2020),
            threshold_km: Some(200.0),
            output: Some(PathBuf::from("out.csv")),
            ..Default::default()
        });
        assert_eq!(cfg.analysis.start_year, 2019);
        assert_eq!(cfg.analysis.threshold_km, 200.0);
        assert_eq!(cfg.output_path("ignored.csv"), PathBuf::from("out.csv"));
        assert!(cfg.input_path().is_err());
    }

    #[test]
    fn override_file_is_merged() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"2008238N13293: { rule: explicit, runs: [[26, 27, 28]] }\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig {
            overrides_file: Some(path.to_path_buf()),
            ..Default::default()
        };
        let table = cfg.override_table().unwrap();
        assert_eq!(table.len(), 1);
    }
}
