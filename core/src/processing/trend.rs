use serde::{Deserialize, Serialize};

use crate::math::grid::GridHelper;
use crate::math::stats::StatsHelper;

/// One depth bin of the coverage-width trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendBin {
    pub center_depth_m: f64,
    pub mean_abs_width_m: f64,
}

/// Depth-binned mean coverage-width trend over the filtered soundings.
///
/// The trend is one-sided (half-swath); display layers mirror it to
/// negative y to show both sides.
pub struct CoverageTrendAnalyzer {
    bin_count: usize,
}

impl CoverageTrendAnalyzer {
    pub fn new(bin_count: usize) -> Self {
        Self {
            bin_count: bin_count.max(1),
        }
    }

    pub fn trend(&self, z_m: &[f64], y_m: &[f64]) -> Vec<TrendBin> {
        let points: Vec<(f64, f64)> = z_m
            .iter()
            .zip(y_m)
            .filter(|(z, y)| z.is_finite() && y.is_finite())
            .map(|(&z, &y)| (z, y))
            .collect();
        if points.is_empty() {
            return Vec::new();
        }

        let z_min = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
        let z_max = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        if z_max == z_min {
            let widths: Vec<f64> = points.iter().map(|p| p.1.abs()).collect();
            return vec![TrendBin {
                center_depth_m: z_min,
                mean_abs_width_m: StatsHelper::nan_mean(&widths),
            }];
        }

        let edges = GridHelper::linspace(z_min, z_max, self.bin_count + 1);
        let half_width = (z_max - z_min) / self.bin_count as f64 / 2.0;
        let mut sums = vec![0.0; self.bin_count];
        let mut counts = vec![0usize; self.bin_count];
        for (z, y) in points {
            if let Some(bin) = GridHelper::digitize(z, &edges) {
                sums[bin] += y.abs();
                counts[bin] += 1;
            }
        }

        (0..self.bin_count)
            .filter(|&bin| counts[bin] > 0)
            .map(|bin| TrendBin {
                center_depth_m: edges[bin] + half_width,
                mean_abs_width_m: sums[bin] / counts[bin] as f64,
            })
            .collect()
    }

    /// Water-depth-multiple table for the gap-filler export: rows of
    /// `(depth, 2*width/depth)` bracketed by the sentinel rows.
    pub fn water_depth_multiple_table(bins: &[TrendBin]) -> Vec<(f64, f64)> {
        let mut rows = Vec::with_capacity(bins.len() + 2);
        rows.push((0.0, 5.0));
        for bin in bins {
            if bin.center_depth_m != 0.0 {
                rows.push((
                    bin.center_depth_m,
                    2.0 * bin.mean_abs_width_m / bin.center_depth_m,
                ));
            }
        }
        rows.push((10_000.0, 0.0));
        rows
    }
}
