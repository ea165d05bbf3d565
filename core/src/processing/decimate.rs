use crate::prelude::DecimationConfig;

/// Nearest-neighbor subsampling that bounds the rendered point count.
///
/// Selected indices always refer to real, unmodified soundings; nothing
/// is interpolated.
pub struct Decimator {
    max_points: usize,
    user_factor: f64,
}

impl Decimator {
    pub fn new(config: &DecimationConfig) -> Self {
        Self {
            max_points: config.max_points,
            user_factor: config.user_factor,
        }
    }

    /// Effective reduction factor: the larger of the count-driven ratio
    /// and the user factor, never below 1. A zero point limit is an
    /// infinite factor.
    pub fn effective_factor(&self, count: usize) -> f64 {
        if self.max_points == 0 {
            return f64::INFINITY;
        }
        let ratio = count as f64 / self.max_points as f64;
        ratio.max(self.user_factor).max(1.0)
    }

    /// Evenly spaced target positions over `[0, count-1]`, each snapped
    /// to the nearest existing index. Output is strictly increasing.
    pub fn select(&self, count: usize) -> Vec<usize> {
        if count == 0 || self.max_points == 0 {
            return Vec::new();
        }
        let factor = self.effective_factor(count);
        if factor <= 1.0 {
            return (0..count).collect();
        }

        let n_out = (count as f64 / factor).floor() as usize;
        if n_out == 0 {
            return Vec::new();
        }
        if n_out == 1 {
            return vec![0];
        }

        let step = (count - 1) as f64 / (n_out - 1) as f64;
        let mut indices = Vec::with_capacity(n_out);
        for i in 0..n_out {
            let idx = ((i as f64 * step).round() as usize).min(count - 1);
            if indices.last().map_or(true, |&last| idx > last) {
                indices.push(idx);
            }
        }
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimator(max_points: usize, user_factor: f64) -> Decimator {
        Decimator::new(&DecimationConfig {
            max_points,
            user_factor,
        })
    }

    #[test]
    fn count_over_limit_doubles_the_factor() {
        let dec = decimator(50_000, 1.0);
        assert_eq!(dec.effective_factor(100_000), 2.0);
        assert_eq!(dec.select(100_000).len(), 50_000);
    }

    #[test]
    fn count_under_limit_never_upsamples() {
        let dec = decimator(50_000, 1.0);
        assert_eq!(dec.effective_factor(10), 1.0);
        assert_eq!(dec.select(10), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn zero_limit_selects_nothing_without_dividing() {
        let dec = decimator(0, 1.0);
        assert!(dec.effective_factor(100).is_infinite());
        assert!(dec.select(100).is_empty());
    }

    #[test]
    fn user_factor_wins_when_larger() {
        let dec = decimator(50_000, 4.0);
        assert_eq!(dec.effective_factor(100), 4.0);
        assert_eq!(dec.select(100).len(), 25);
    }

    #[test]
    fn sub_unity_user_factor_is_clamped() {
        let dec = decimator(50_000, 0.25);
        assert_eq!(dec.effective_factor(100), 1.0);
    }

    #[test]
    fn indices_are_strictly_increasing_unique_and_in_range() {
        let dec = decimator(100, 1.0);
        let indices = dec.select(1000);
        assert!(!indices.is_empty());
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert!(indices.iter().all(|&i| i < 1000));
        assert_eq!(*indices.first().unwrap(), 0);
        assert_eq!(*indices.last().unwrap(), 999);
    }
}
