pub struct StatsHelper;

impl StatsHelper {
    /// Mean over the finite entries only; NaN when none are finite.
    pub fn nan_mean(values: &[f64]) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for &v in values {
            if v.is_finite() {
                sum += v;
                count += 1;
            }
        }
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Trailing rolling mean over `window` samples ending at each index.
    /// Windows with no finite entries yield NaN instead of an error.
    pub fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
        let window = window.max(1);
        let mut out = Vec::with_capacity(values.len());
        for i in 0..values.len() {
            let start = (i + 1).saturating_sub(window);
            out.push(Self::nan_mean(&values[start..=i]));
        }
        out
    }

    /// Linear interpolation of NaN gaps from the finite neighbors.
    /// Leading and trailing gaps hold the nearest finite value; an
    /// all-NaN input is returned unchanged.
    pub fn fill_linear(values: &[f64]) -> Vec<f64> {
        let mut out = values.to_vec();
        let finite: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_finite())
            .map(|(i, _)| i)
            .collect();
        if finite.is_empty() {
            return out;
        }

        let (first, last) = (finite[0], finite[finite.len() - 1]);
        for i in 0..first {
            out[i] = values[first];
        }
        for i in (last + 1)..values.len() {
            out[i] = values[last];
        }
        for pair in finite.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if hi - lo < 2 {
                continue;
            }
            let span = (hi - lo) as f64;
            for i in (lo + 1)..hi {
                let frac = (i - lo) as f64 / span;
                out[i] = values[lo] + frac * (values[hi] - values[lo]);
            }
        }
        out
    }
}
