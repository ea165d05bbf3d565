use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swathcore::prelude::{DatasetKind, PipelineError, PipelineResult};
use swathcore::processing::{
    CoverageTrendAnalyzer, DataRateAnalyzer, DataRateSample, Decimator, FilterEngine,
    ReferenceAdjuster, SoundingExtractor, TablePublisher, TrendBin,
};
use swathcore::sonar_interface::{DetectionTable, JsonPingParser, PingParser, PingStream};
use swathcore::telemetry::{BatchRecorder, BatchSummary, LogManager};

/// Outcome of one multi-file load batch.
pub struct BatchOutcome {
    pub table: Arc<DetectionTable>,
    pub summary: BatchSummary,
}

/// Numeric feeds produced by one analysis pass over a table snapshot.
pub struct AnalysisReport {
    pub total_soundings: usize,
    pub filtered_soundings: usize,
    /// Flattened port‖stbd indices surviving filter and decimation.
    pub plotted_indices: Vec<usize>,
    pub trend: Vec<TrendBin>,
    /// None when the snapshot carries no valid timing data.
    pub rate: Option<Vec<DataRateSample>>,
}

/// Batch loader and analysis orchestrator over the coverage core.
pub struct Runner {
    config: WorkflowConfig,
    parsers: HashMap<String, Box<dyn PingParser>>,
    publisher: TablePublisher,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let mut parsers: HashMap<String, Box<dyn PingParser>> = HashMap::new();
        parsers.insert("json".to_string(), Box::new(JsonPingParser));
        Self {
            config,
            parsers,
            publisher: TablePublisher::new(),
            logger: LogManager::new(),
        }
    }

    /// Registers a decoder for one file extension (lower-case, no dot).
    /// Vendor binary decoders plug in here.
    #[allow(dead_code)]
    pub fn register_parser(&mut self, extension: &str, parser: Box<dyn PingParser>) {
        self.parsers.insert(extension.to_lowercase(), parser);
    }

    pub fn snapshot(&self) -> Arc<DetectionTable> {
        self.publisher.snapshot()
    }

    /// Drops all loaded data.
    #[allow(dead_code)]
    pub fn reset(&self) {
        self.publisher.reset();
    }

    /// Loads each file in turn. A file either commits in full or is
    /// skipped entirely; per-file errors are tallied and never abort
    /// the batch.
    pub fn run_files(&self, files: &[PathBuf]) -> BatchOutcome {
        let recorder = BatchRecorder::new();
        for path in files {
            match self.load_file(path) {
                Ok(0) => {
                    recorder.record_skipped();
                    self.logger
                        .warn(&format!("{}: no extractable pings, skipped", path.display()));
                }
                Ok(committed) => {
                    recorder.record_converted();
                    self.logger.record(&format!(
                        "{}: committed {} pings",
                        path.display(),
                        committed
                    ));
                }
                Err(err) => {
                    let message = format!("{}: {}", path.display(), err);
                    self.logger.warn(&message);
                    recorder.record_failed(&message);
                }
            }
        }
        BatchOutcome {
            table: self.publisher.snapshot(),
            summary: recorder.snapshot(),
        }
    }

    fn load_file(&self, path: &Path) -> PipelineResult<usize> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();
        let parser = self
            .parsers
            .get(&extension)
            .ok_or_else(|| PipelineError::UnsupportedFormat(extension.clone()))?;

        let stream = parser.parse(path)?;
        let fname = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();
        Ok(self.commit_stream(&fname, &stream))
    }

    /// Extracts and commits one decoded stream; returns the ping count
    /// committed. Used for in-memory streams (offline mode, tests) as
    /// well as parsed files.
    pub fn commit_stream(&self, fname: &str, stream: &PingStream) -> usize {
        let extractor = if self.config.params_only {
            SoundingExtractor::params_only(stream.format)
        } else {
            SoundingExtractor::new(stream.format)
        };
        let records: Vec<_> = stream
            .pings
            .iter()
            .filter_map(|ping| extractor.extract(fname, ping))
            .collect();
        if records.is_empty() {
            return 0;
        }
        let committed = records.len();
        self.publisher.commit_file(records);
        committed
    }

    /// One full analysis pass over an immutable table snapshot.
    pub fn analyze(&self, table: &DetectionTable) -> anyhow::Result<AnalysisReport> {
        let analysis = self.config.to_analysis_config();

        let shift = ReferenceAdjuster::new(analysis.reference_frame).adjust(table);
        let mut flat = table.flatten();
        flat.apply_shift(&shift.dy_m, &shift.dz_m);

        let mask = FilterEngine::new(analysis.filter.clone()).mask(&flat, DatasetKind::New);
        let kept: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, &keep)| keep)
            .map(|(i, _)| i)
            .collect();
        let y: Vec<f64> = kept.iter().map(|&i| flat.y_m[i]).collect();
        let z: Vec<f64> = kept.iter().map(|&i| flat.z_m[i]).collect();

        let selected = Decimator::new(&analysis.decimation).select(kept.len());
        let plotted_indices: Vec<usize> = selected.iter().map(|&i| kept[i]).collect();

        let trend = CoverageTrendAnalyzer::new(analysis.trend_bin_count).trend(&z, &y);

        let swaths = swath_counts(table);
        let rate = match DataRateAnalyzer::new(analysis.data_rate).analyze(
            &table.timestamp,
            &table.bytes_f64(),
            &table.wc_size_ratio(),
            swaths.as_deref(),
        ) {
            Ok(samples) => Some(samples),
            Err(PipelineError::NoValidTimingData) => {
                self.logger
                    .warn("no valid timing data; data-rate series skipped");
                None
            }
            Err(err) => return Err(err).context("data-rate analysis"),
        };

        Ok(AnalysisReport {
            total_soundings: flat.len(),
            filtered_soundings: kept.len(),
            plotted_indices,
            trend,
            rate,
        })
    }
}

/// Per-ping swath counts from the acquisition metadata. Only offered to
/// the analyzer when every ping carries a mode label; unknown data keeps
/// the timing heuristic in charge.
fn swath_counts(table: &DetectionTable) -> Option<Vec<u32>> {
    if table.swath_mode.iter().any(|mode| mode.is_empty()) {
        return None;
    }
    Some(
        table
            .swath_mode
            .iter()
            .map(|mode| {
                if mode.to_lowercase().contains("dual") {
                    2
                } else {
                    1
                }
            })
            .collect(),
    )
}
