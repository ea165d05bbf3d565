use anyhow::Context;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use swathcore::processing::{CoverageTrendAnalyzer, TrendBin};

/// Writes the water-depth-multiple trend table as two-column plain text,
/// one `depth multiple` row per line with the sentinel rows included.
pub fn export_gap_filler_trend(path: &Path, bins: &[TrendBin]) -> anyhow::Result<()> {
    let rows = CoverageTrendAnalyzer::water_depth_multiple_table(bins);
    let mut out = String::new();
    for (depth, multiple) in rows {
        let _ = writeln!(out, "{:.1}\t{:.3}", depth, multiple);
    }
    fs::write(path, out).with_context(|| format!("writing trend export {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_writes_bracketed_two_column_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trend.txt");
        let bins = vec![TrendBin {
            center_depth_m: 200.0,
            mean_abs_width_m: 500.0,
        }];
        export_gap_filler_trend(&path, &bins).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0.0\t5.000");
        assert_eq!(lines[1], "200.0\t5.000");
        assert_eq!(lines[2], "10000.0\t0.000");
    }
}
