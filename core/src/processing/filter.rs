use ndarray::Array1;

use crate::prelude::{DatasetKind, FilterConfig, RangeLimit};
use crate::sonar_interface::detection::FlatSoundings;
use crate::telemetry::log::LogManager;

/// Compound boolean masking over the flattened port‖stbd sounding list.
///
/// Each term is independently enabled through the config; the
/// NaN-exclusion term is mandatory and always ANDed in. A term whose
/// runtime fields are missing from the dataset passes those soundings
/// and logs a warning instead of failing.
pub struct FilterEngine {
    config: FilterConfig,
    logger: LogManager,
}

impl FilterEngine {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            logger: LogManager::new(),
        }
    }

    pub fn mask(&self, flat: &FlatSoundings, kind: DatasetKind) -> Array1<bool> {
        let count = flat.len();
        let mut keep = Array1::from_iter(
            (0..count).map(|i| flat.y_m[i].is_finite() && flat.z_m[i].is_finite()),
        );

        if let Some(range) = self.config.angle_deg {
            and_term(&mut keep, |i| range.contains(flat.rx_angle_deg[i].abs()));
        }
        if let Some(range) = self.depth_range(kind) {
            and_term(&mut keep, |i| range.contains(flat.z_m[i]));
        }
        if let Some(range) = self.config.backscatter_db {
            and_term(&mut keep, |i| range.contains(flat.bs_db[i]));
        }
        if let Some(buffer) = self.config.rtp_angle_buffer_deg {
            let mut missing = false;
            and_term(&mut keep, |i| match flat.runtime_limit_deg[i] {
                Some(limit) => flat.rx_angle_deg[i].abs() <= 2.0 * limit + buffer,
                None => {
                    missing = true;
                    true
                }
            });
            if missing {
                self.logger
                    .warn("runtime angle limits missing for some pings; angle buffer passes them");
            }
        }
        if let Some(buffer) = self.config.rtp_coverage_buffer_m {
            let mut missing = false;
            and_term(&mut keep, |i| match flat.runtime_limit_m[i] {
                Some(limit) => flat.y_m[i].abs() <= 2.0 * limit + buffer,
                None => {
                    missing = true;
                    true
                }
            });
            if missing {
                self.logger.warn(
                    "runtime coverage limits missing for some pings; coverage buffer passes them",
                );
            }
        }

        keep
    }

    fn depth_range(&self, kind: DatasetKind) -> Option<RangeLimit> {
        match kind {
            DatasetKind::New => self.config.depth_m,
            DatasetKind::Archive => self.config.depth_arc_m,
        }
    }
}

fn and_term<F: FnMut(usize) -> bool>(keep: &mut Array1<bool>, mut term: F) {
    for (i, flag) in keep.iter_mut().enumerate() {
        *flag = *flag && term(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(y: Vec<f64>, z: Vec<f64>) -> FlatSoundings {
        let count = y.len();
        FlatSoundings {
            y_m: y,
            z_m: z,
            bs_db: vec![-25.0; count],
            rx_angle_deg: vec![45.0; count],
            runtime_limit_deg: vec![None; count],
            runtime_limit_m: vec![None; count],
        }
    }

    #[test]
    fn nan_exclusion_is_always_applied() {
        let engine = FilterEngine::new(FilterConfig::default());
        let soundings = flat(vec![10.0, f64::NAN], vec![50.0, 50.0]);
        let mask = engine.mask(&soundings, DatasetKind::New);
        assert_eq!(mask.to_vec(), vec![true, false]);
    }

    #[test]
    fn depth_range_keeps_in_range_soundings_only() {
        let engine = FilterEngine::new(FilterConfig {
            depth_m: Some(RangeLimit::new(0.0, 50.0)),
            ..Default::default()
        });
        let soundings = flat(vec![1.0, 1.0, 1.0], vec![10.0, 60.0, 30.0]);
        let mask = engine.mask(&soundings, DatasetKind::New);
        assert_eq!(mask.to_vec(), vec![true, false, true]);
    }

    #[test]
    fn archive_datasets_use_their_own_depth_range() {
        let engine = FilterEngine::new(FilterConfig {
            depth_m: Some(RangeLimit::new(0.0, 50.0)),
            depth_arc_m: Some(RangeLimit::new(100.0, 200.0)),
            ..Default::default()
        });
        let soundings = flat(vec![1.0, 1.0], vec![40.0, 150.0]);
        assert_eq!(
            engine.mask(&soundings, DatasetKind::New).to_vec(),
            vec![true, false]
        );
        assert_eq!(
            engine.mask(&soundings, DatasetKind::Archive).to_vec(),
            vec![false, true]
        );
    }

    #[test]
    fn angle_filter_applies_to_magnitude() {
        let engine = FilterEngine::new(FilterConfig {
            angle_deg: Some(RangeLimit::new(30.0, 60.0)),
            ..Default::default()
        });
        let mut soundings = flat(vec![1.0, 1.0, 1.0], vec![10.0, 10.0, 10.0]);
        soundings.rx_angle_deg = vec![-45.0, 20.0, 70.0];
        let mask = engine.mask(&soundings, DatasetKind::New);
        assert_eq!(mask.to_vec(), vec![true, false, false]);
    }

    #[test]
    fn runtime_buffer_masks_beyond_twice_the_limit() {
        let engine = FilterEngine::new(FilterConfig {
            rtp_angle_buffer_deg: Some(-10.0),
            ..Default::default()
        });
        let mut soundings = flat(vec![1.0, 1.0], vec![10.0, 10.0]);
        soundings.rx_angle_deg = vec![55.0, 65.0];
        soundings.runtime_limit_deg = vec![Some(35.0), Some(35.0)];
        // threshold 2*35 - 10 = 60
        let mask = engine.mask(&soundings, DatasetKind::New);
        assert_eq!(mask.to_vec(), vec![true, false]);
    }

    #[test]
    fn missing_runtime_fields_pass_all_soundings() {
        let engine = FilterEngine::new(FilterConfig {
            rtp_angle_buffer_deg: Some(0.0),
            rtp_coverage_buffer_m: Some(-100.0),
            ..Default::default()
        });
        let soundings = flat(vec![1.0, 1.0], vec![10.0, 10.0]);
        let mask = engine.mask(&soundings, DatasetKind::New);
        assert_eq!(mask.to_vec(), vec![true, true]);
    }
}
