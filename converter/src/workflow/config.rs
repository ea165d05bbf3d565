use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use swathcore::prelude::{
    AnalysisConfig, DataRateConfig, DecimationConfig, FilterConfig, RangeLimit, ReferenceFrame,
};

/// User-facing workflow settings, mirrored into the core analysis config.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub reference_frame: ReferenceFrame,
    pub angle_deg: Option<RangeLimit>,
    pub depth_m: Option<RangeLimit>,
    pub depth_arc_m: Option<RangeLimit>,
    pub backscatter_db: Option<RangeLimit>,
    pub rtp_angle_buffer_deg: Option<f64>,
    pub rtp_coverage_buffer_m: Option<f64>,
    pub max_points: usize,
    pub decimation_factor: f64,
    pub trend_bin_count: usize,
    pub data_rate: DataRateConfig,
    /// Scan acquisition parameters only; sounding search is skipped.
    pub params_only: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            reference_frame: ReferenceFrame::default(),
            angle_deg: None,
            depth_m: None,
            depth_arc_m: None,
            backscatter_db: None,
            rtp_angle_buffer_deg: None,
            rtp_coverage_buffer_m: None,
            max_points: 50_000,
            decimation_factor: 1.0,
            trend_bin_count: 10,
            data_rate: DataRateConfig::default(),
            params_only: false,
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

    pub fn to_analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            reference_frame: self.reference_frame,
            filter: FilterConfig {
                angle_deg: self.angle_deg,
                depth_m: self.depth_m,
                depth_arc_m: self.depth_arc_m,
                backscatter_db: self.backscatter_db,
                rtp_angle_buffer_deg: self.rtp_angle_buffer_deg,
                rtp_coverage_buffer_m: self.rtp_coverage_buffer_m,
            },
            decimation: DecimationConfig {
                max_points: self.max_points,
                user_factor: self.decimation_factor,
            },
            trend_bin_count: self.trend_bin_count,
            data_rate: self.data_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_produce_a_passthrough_analysis_config() {
        let config = WorkflowConfig::default().to_analysis_config();
        assert!(config.filter.depth_m.is_none());
        assert_eq!(config.decimation.max_points, 50_000);
        assert_eq!(config.trend_bin_count, 10);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"reference_frame: Origin\ndepth_m:\n  min: 0.0\n  max: 50.0\nmax_points: 1000\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let config = WorkflowConfig::load(&path).unwrap();
        assert_eq!(config.reference_frame, ReferenceFrame::Origin);
        assert_eq!(config.depth_m, Some(RangeLimit::new(0.0, 50.0)));
        assert_eq!(config.max_points, 1000);
        // unset fields keep their defaults
        assert_eq!(config.trend_bin_count, 10);
    }
}
