use crate::workflow::config::WorkflowConfig;
use anyhow::{anyhow, Context};
use stormcore::prelude::{AnalysisConfig, AnalysisStage};
use stormcore::segment::OverrideTable;
use stormcore::telemetry::{LogManager, Metrics, MetricsRecorder};
use stormcore::track::StormTrack;

/// Drives analysis stages over a loaded dataset.
pub struct Runner {
    analysis: AnalysisConfig,
    overrides: OverrideTable,
    skip_invalid: bool,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: &WorkflowConfig) -> anyhow::Result<Self> {
        let analysis = config.to_analysis_config();
        analysis.validate().context("validating workflow config")?;
        let overrides = config.override_table()?;
        let logger = LogManager::new("runner");
        if !overrides.is_empty() {
            logger.record(&format!("{} per-storm overrides loaded", overrides.len()));
        }
        Ok(Self {
            analysis,
            overrides,
            skip_invalid: config.skip_invalid,
            metrics: MetricsRecorder::new(),
            logger,
        })
    }

    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    /// Runs `stage` over every storm accepted by the year and basin filter.
    pub fn execute<S: AnalysisStage>(
        &self,
        name: &str,
        stage: &mut S,
        storms: &[StormTrack],
    ) -> anyhow::Result<Vec<S::Row>> {
        stage
            .initialize(&self.analysis)
            .with_context(|| format!("initializing {} stage", name))?;

        let mut rows = Vec::new();
        for storm in storms {
            if !self.analysis.accepts(storm) {
                self.metrics.record_filtered();
                continue;
            }
            match stage.execute(storm) {
                Ok(storm_rows) => {
                    self.metrics.record_processed(storm_rows.len());
                    rows.extend(storm_rows);
                }
                Err(err) => {
                    self.metrics.record_rejected();
                    if self.skip_invalid {
                        self.logger.warn(&format!(
                            "skipping storm {} ({}): {}",
                            storm.sid(),
                            storm.name(),
                            err
                        ));
                        continue;
                    }
                    stage.cleanup();
                    return Err(anyhow!(err)).with_context(|| {
                        format!(
                            "executing {} stage on storm {} ({})",
                            name,
                            storm.sid(),
                            storm.name()
                        )
                    });
                }
            }
        }
        stage.cleanup();

        let metrics = self.metrics.snapshot();
        self.logger.record(&format!(
            "{} done; run totals: {} storms processed, {} filtered out, {} rejected, {} rows",
            name, metrics.processed, metrics.filtered, metrics.rejected, metrics.rows
        ));
        Ok(rows)
    }
}
