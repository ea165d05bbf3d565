use serde::{Deserialize, Serialize};

/// Geometric datum to which sounding depth and across-track values are referenced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReferenceFrame {
    Waterline,
    Origin,
    TxArray,
    Raw,
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        ReferenceFrame::Waterline
    }
}

/// Which loaded dataset a filter pass applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    New,
    Archive,
}

/// Closed interval used by the range filters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RangeLimit {
    pub min: f64,
    pub max: f64,
}

impl RangeLimit {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Filter terms for one analysis pass; `None` disables a term.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub angle_deg: Option<RangeLimit>,
    pub depth_m: Option<RangeLimit>,
    pub depth_arc_m: Option<RangeLimit>,
    pub backscatter_db: Option<RangeLimit>,
    pub rtp_angle_buffer_deg: Option<f64>,
    pub rtp_coverage_buffer_m: Option<f64>,
}

/// Point-count bounding policy for the render feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationConfig {
    pub max_points: usize,
    pub user_factor: f64,
}

impl Default for DecimationConfig {
    fn default() -> Self {
        Self {
            max_points: 50_000,
            user_factor: 1.0,
        }
    }
}

/// Tuning for the data-rate and ping-interval reconstruction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DataRateConfig {
    pub min_interval_s: f64,
    pub max_interval_s: f64,
    pub dual_swath_ratio: f64,
    pub smoothing_window: usize,
}

impl Default for DataRateConfig {
    fn default() -> Self {
        Self {
            min_interval_s: 0.25,
            max_interval_s: 60.0,
            dual_swath_ratio: 0.1,
            smoothing_window: 100,
        }
    }
}

/// Complete, UI-independent configuration for one analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub reference_frame: ReferenceFrame,
    pub filter: FilterConfig,
    pub decimation: DecimationConfig,
    pub trend_bin_count: usize,
    pub data_rate: DataRateConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reference_frame: ReferenceFrame::default(),
            filter: FilterConfig::default(),
            decimation: DecimationConfig::default(),
            trend_bin_count: 10,
            data_rate: DataRateConfig::default(),
        }
    }
}

/// Common error type for pipeline execution.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("missing reference fields: {0}")]
    MissingReferenceFields(String),
    #[error("parse failure: {0}")]
    ParseFailure(String),
    #[error("no valid timing data")]
    NoValidTimingData,
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_limit_is_inclusive_at_both_ends() {
        let limit = RangeLimit::new(0.0, 50.0);
        assert!(limit.contains(0.0));
        assert!(limit.contains(50.0));
        assert!(!limit.contains(50.1));
    }

    #[test]
    fn analysis_config_defaults_match_plotter_startup() {
        let config = AnalysisConfig::default();
        assert_eq!(config.decimation.max_points, 50_000);
        assert_eq!(config.trend_bin_count, 10);
        assert!((config.data_rate.min_interval_s - 0.25).abs() < f64::EPSILON);
        assert!((config.data_rate.max_interval_s - 60.0).abs() < f64::EPSILON);
    }
}
