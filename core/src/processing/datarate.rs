use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;
use crate::prelude::{DataRateConfig, PipelineError, PipelineResult};
use crate::telemetry::log::LogManager;

/// Position of a ping within one dual-swath transmit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleRole {
    First,
    Second,
}

/// One reconstructed data-rate sample; undefined quantities are NaN.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRateSample {
    pub timestamp: f64,
    pub rate_mbph: f64,
    pub total_rate_mbph: f64,
    pub ping_interval_s: f64,
    pub cycle_role: CycleRole,
}

/// Dual-swath-aware data-rate and ping-interval reconstruction.
///
/// Dual-swath acquisition emits two swaths per ping cycle separated by
/// an artificially short gap. The second swath is folded back into its
/// cycle so the rate series carries one sample per cycle instead of a
/// spurious spike per raw datagram.
pub struct DataRateAnalyzer {
    config: DataRateConfig,
    logger: LogManager,
}

impl DataRateAnalyzer {
    pub fn new(config: DataRateConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    /// Reconstructs the smoothed rate and interval series. Per-ping swath
    /// counts, when supplied, override the timing heuristic: a ping with
    /// a swath count of 1 is never classified second-swath.
    pub fn analyze(
        &self,
        timestamps: &[f64],
        bytes_since_last: &[f64],
        wc_size_ratio: &[f64],
        swaths_per_ping: Option<&[u32]>,
    ) -> PipelineResult<Vec<DataRateSample>> {
        let count = timestamps.len();
        if bytes_since_last.len() != count || wc_size_ratio.len() != count {
            return Err(PipelineError::Internal(
                "data-rate input columns disagree in length".into(),
            ));
        }
        if let Some(swaths) = swaths_per_ping {
            if swaths.len() != count {
                return Err(PipelineError::Internal(
                    "swath count column disagrees in length".into(),
                ));
            }
        }
        if count < 2 {
            return Err(PipelineError::NoValidTimingData);
        }

        let mut order: Vec<usize> = (0..count).collect();
        order.sort_by(|&a, &b| timestamps[a].total_cmp(&timestamps[b]));
        let t: Vec<f64> = order.iter().map(|&i| timestamps[i]).collect();
        let bytes: Vec<f64> = order.iter().map(|&i| bytes_since_last[i]).collect();
        let wc_ratio: Vec<f64> = order.iter().map(|&i| wc_size_ratio[i]).collect();
        let swaths: Option<Vec<u32>> =
            swaths_per_ping.map(|s| order.iter().map(|&i| s[i]).collect());

        let mut delta = raw_deltas(&t);
        if delta.iter().skip(1).all(|d| !d.is_finite()) {
            if t.iter().filter(|v| v.is_finite()).count() < 2 {
                return Err(PipelineError::NoValidTimingData);
            }
            self.logger
                .warn("all ping intervals undefined; interpolating timestamps");
            delta = raw_deltas(&StatsHelper::fill_linear(&t));
        }

        // short intra-cycle gap marks the second swath of a cycle
        let mut role = vec![CycleRole::First; count];
        for i in 1..count {
            if !delta[i].is_finite() || !delta[i - 1].is_finite() || delta[i - 1] <= 0.0 {
                continue;
            }
            if delta[i] / delta[i - 1] >= self.config.dual_swath_ratio {
                continue;
            }
            if let Some(ref swaths) = swaths {
                if swaths[i] <= 1 {
                    continue;
                }
            }
            role[i] = CycleRole::Second;
        }

        // fold second-swath bytes and time back into the cycle's first ping
        let mut cycle_bytes = bytes.clone();
        let mut cycle_time = delta.clone();
        for i in 0..count.saturating_sub(1) {
            if role[i] == CycleRole::First && role[i + 1] == CycleRole::Second {
                cycle_bytes[i] += bytes[i + 1];
                if delta[i + 1].is_finite() {
                    cycle_time[i] += delta[i + 1];
                }
            }
        }

        let mut rate = vec![f64::NAN; count];
        let mut total = vec![f64::NAN; count];
        for i in 0..count {
            if role[i] == CycleRole::Second {
                continue;
            }
            if cycle_time[i].is_finite() && cycle_time[i] > 0.0 {
                rate[i] = cycle_bytes[i] / cycle_time[i] * 3600.0 / 1e6;
                total[i] = rate[i] * (1.0 + wc_ratio[i]);
            }
        }

        // intervals outside the plausible band are undefined for display
        let interval: Vec<f64> = delta
            .iter()
            .map(|&d| {
                if d.is_finite()
                    && d >= self.config.min_interval_s
                    && d <= self.config.max_interval_s
                {
                    d
                } else {
                    f64::NAN
                }
            })
            .collect();

        let window = self.config.smoothing_window.min(count).max(1);
        let smoothed_rate = StatsHelper::trailing_mean(&rate, window);
        let smoothed_total = StatsHelper::trailing_mean(&total, window);

        // second-swath pings stay undefined after smoothing so the
        // series keeps one defined rate per cycle
        Ok((0..count)
            .map(|i| DataRateSample {
                timestamp: t[i],
                rate_mbph: if role[i] == CycleRole::Second {
                    f64::NAN
                } else {
                    smoothed_rate[i]
                },
                total_rate_mbph: if role[i] == CycleRole::Second {
                    f64::NAN
                } else {
                    smoothed_total[i]
                },
                ping_interval_s: interval[i],
                cycle_role: role[i],
            })
            .collect())
    }
}

fn raw_deltas(timestamps: &[f64]) -> Vec<f64> {
    let mut delta = vec![f64::NAN; timestamps.len()];
    for i in 1..timestamps.len() {
        if timestamps[i].is_finite() && timestamps[i - 1].is_finite() {
            delta[i] = timestamps[i] - timestamps[i - 1];
        }
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> DataRateAnalyzer {
        DataRateAnalyzer::new(DataRateConfig::default())
    }

    #[test]
    fn short_gap_classifies_second_swath() {
        // deltas: [NaN, 10, 10, 0.5, 10]; 0.5/10 = 0.05 < 0.1
        let t = [0.0, 10.0, 20.0, 20.5, 30.5];
        let bytes = [1000.0; 5];
        let ratio = [0.0; 5];
        let samples = analyzer().analyze(&t, &bytes, &ratio, None).unwrap();

        let roles: Vec<CycleRole> = samples.iter().map(|s| s.cycle_role).collect();
        assert_eq!(
            roles,
            vec![
                CycleRole::First,
                CycleRole::First,
                CycleRole::First,
                CycleRole::Second,
                CycleRole::First
            ]
        );
    }

    #[test]
    fn second_swath_folds_into_preceding_cycle() {
        let t = [0.0, 10.0, 20.0, 20.5, 30.5];
        let bytes = [0.0, 1000.0, 2000.0, 3000.0, 1000.0];
        let ratio = [0.0; 5];
        let config = DataRateConfig {
            smoothing_window: 1,
            ..Default::default()
        };
        let samples = DataRateAnalyzer::new(config)
            .analyze(&t, &bytes, &ratio, None)
            .unwrap();

        // cycle at index 2 absorbs ping 3: (2000+3000) bytes over 10.5 s
        let expected = 5000.0 / 10.5 * 3600.0 / 1e6;
        assert!((samples[2].rate_mbph - expected).abs() < 1e-9);
        assert!(samples[3].rate_mbph.is_nan());
    }

    #[test]
    fn smoothing_leaves_second_swath_samples_undefined() {
        let t = [0.0, 10.0, 20.0, 20.5, 30.5];
        let bytes = [1000.0; 5];
        let ratio = [0.5; 5];
        // default window spans the whole series
        let samples = analyzer().analyze(&t, &bytes, &ratio, None).unwrap();
        assert_eq!(samples[3].cycle_role, CycleRole::Second);
        assert!(samples[3].rate_mbph.is_nan());
        assert!(samples[3].total_rate_mbph.is_nan());
        assert!(samples[4].rate_mbph.is_finite());
    }

    #[test]
    fn swath_count_metadata_overrides_the_timing_heuristic() {
        let t = [0.0, 10.0, 20.0, 20.5, 30.5];
        let bytes = [1000.0; 5];
        let ratio = [0.0; 5];
        let swaths = [1u32, 1, 1, 1, 1];
        let samples = analyzer().analyze(&t, &bytes, &ratio, Some(&swaths)).unwrap();
        assert!(samples.iter().all(|s| s.cycle_role == CycleRole::First));
    }

    #[test]
    fn zero_time_yields_undefined_rate_not_a_panic() {
        let t = [5.0, 5.0, 5.0];
        let bytes = [1000.0; 3];
        let ratio = [0.0; 3];
        let samples = analyzer().analyze(&t, &bytes, &ratio, None).unwrap();
        assert!(samples.iter().all(|s| s.rate_mbph.is_nan()));
    }

    #[test]
    fn out_of_band_intervals_are_hidden_from_display() {
        let t = [0.0, 0.1, 100.0, 110.0];
        let bytes = [1000.0; 4];
        let ratio = [0.0; 4];
        let samples = analyzer().analyze(&t, &bytes, &ratio, None).unwrap();
        assert!(samples[0].ping_interval_s.is_nan());
        assert!(samples[1].ping_interval_s.is_nan()); // 0.1 s below the band
        assert!(samples[2].ping_interval_s.is_nan()); // 99.9 s above the band
        assert!((samples[3].ping_interval_s - 10.0).abs() < 1e-9);
    }

    #[test]
    fn total_series_adds_water_column_contribution() {
        let t = [0.0, 10.0];
        let bytes = [0.0, 1000.0];
        let ratio = [0.0, 1.0];
        let config = DataRateConfig {
            smoothing_window: 1,
            ..Default::default()
        };
        let samples = DataRateAnalyzer::new(config)
            .analyze(&t, &bytes, &ratio, None)
            .unwrap();
        assert!((samples[1].total_rate_mbph - 2.0 * samples[1].rate_mbph).abs() < 1e-12);
    }

    #[test]
    fn undefined_timestamps_do_not_poison_the_series() {
        // the sort pushes the undefined timestamp to the end, so the
        // finite pings still yield a defined rate
        let t = [0.0, f64::NAN, 20.0];
        let bytes = [1000.0; 3];
        let ratio = [0.0; 3];
        let samples = analyzer().analyze(&t, &bytes, &ratio, None).unwrap();
        assert!(samples.iter().any(|s| s.rate_mbph.is_finite()));
        assert!(samples[2].timestamp.is_nan());
    }

    #[test]
    fn no_valid_timing_data_is_reported_not_raised() {
        let t = [f64::NAN, f64::NAN];
        let bytes = [1000.0; 2];
        let ratio = [0.0; 2];
        assert!(matches!(
            analyzer().analyze(&t, &bytes, &ratio, None),
            Err(PipelineError::NoValidTimingData)
        ));
        assert!(matches!(
            analyzer().analyze(&[1.0], &[1.0], &[0.0], None),
            Err(PipelineError::NoValidTimingData)
        ));
    }

    #[test]
    fn sorts_inputs_by_timestamp_before_analysis() {
        let t = [20.0, 0.0, 10.0];
        let bytes = [3000.0, 1000.0, 2000.0];
        let ratio = [0.0; 3];
        let samples = analyzer().analyze(&t, &bytes, &ratio, None).unwrap();
        assert_eq!(samples[0].timestamp, 0.0);
        assert_eq!(samples[2].timestamp, 20.0);
    }
}
