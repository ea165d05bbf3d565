use serde::{Deserialize, Serialize};

use crate::sonar_interface::ping::{InstallOffsets, RuntimeParams, SourceFormat};

/// Outermost-valid-sounding record emitted by the extraction stage, one per ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub fname: String,
    pub format: SourceFormat,
    pub timestamp: f64,
    pub y_port_m: f64,
    pub z_port_m: f64,
    pub bs_port_db: f64,
    pub rx_angle_port_deg: f64,
    pub y_stbd_m: f64,
    pub z_stbd_m: f64,
    pub bs_stbd_db: f64,
    pub rx_angle_stbd_deg: f64,
    pub ping_mode: String,
    pub pulse_form: String,
    pub swath_mode: String,
    pub frequency_hz: f64,
    pub runtime: Option<RuntimeParams>,
    pub offsets: Option<InstallOffsets>,
    pub bytes_since_last_ping: u64,
    pub source_file_size: u64,
    pub source_wc_file_size: u64,
}

/// Time-ordered, column-oriented collection of detections across all
/// loaded files. Every column shares one length, the total ping count.
#[derive(Debug, Clone, Default)]
pub struct DetectionTable {
    pub fname: Vec<String>,
    pub format: Vec<SourceFormat>,
    pub timestamp: Vec<f64>,
    pub y_port_m: Vec<f64>,
    pub z_port_m: Vec<f64>,
    pub bs_port_db: Vec<f64>,
    pub rx_angle_port_deg: Vec<f64>,
    pub y_stbd_m: Vec<f64>,
    pub z_stbd_m: Vec<f64>,
    pub bs_stbd_db: Vec<f64>,
    pub rx_angle_stbd_deg: Vec<f64>,
    pub ping_mode: Vec<String>,
    pub pulse_form: Vec<String>,
    pub swath_mode: Vec<String>,
    pub frequency_hz: Vec<f64>,
    pub runtime: Vec<Option<RuntimeParams>>,
    pub offsets: Vec<Option<InstallOffsets>>,
    pub bytes_since_last_ping: Vec<u64>,
    pub source_file_size: Vec<u64>,
    pub source_wc_file_size: Vec<u64>,
}

/// Flattened port‖stbd view consumed by the filter and decimation stages.
/// All vectors have length 2 x ping count, port half first.
#[derive(Debug, Clone)]
pub struct FlatSoundings {
    pub y_m: Vec<f64>,
    pub z_m: Vec<f64>,
    pub bs_db: Vec<f64>,
    pub rx_angle_deg: Vec<f64>,
    pub runtime_limit_deg: Vec<Option<f64>>,
    pub runtime_limit_m: Vec<Option<f64>>,
}

impl FlatSoundings {
    pub fn len(&self) -> usize {
        self.y_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y_m.is_empty()
    }

    /// Adds per-ping frame translations to both halves uniformly.
    pub fn apply_shift(&mut self, dy_m: &[f64], dz_m: &[f64]) {
        let pings = dy_m.len().min(self.len() / 2);
        for i in 0..pings {
            self.y_m[i] += dy_m[i];
            self.y_m[pings + i] += dy_m[i];
            self.z_m[i] += dz_m[i];
            self.z_m[pings + i] += dz_m[i];
        }
    }
}

impl DetectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timestamp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamp.is_empty()
    }

    pub fn push(&mut self, record: DetectionRecord) {
        self.fname.push(record.fname);
        self.format.push(record.format);
        self.timestamp.push(record.timestamp);
        self.y_port_m.push(record.y_port_m);
        self.z_port_m.push(record.z_port_m);
        self.bs_port_db.push(record.bs_port_db);
        self.rx_angle_port_deg.push(record.rx_angle_port_deg);
        self.y_stbd_m.push(record.y_stbd_m);
        self.z_stbd_m.push(record.z_stbd_m);
        self.bs_stbd_db.push(record.bs_stbd_db);
        self.rx_angle_stbd_deg.push(record.rx_angle_stbd_deg);
        self.ping_mode.push(record.ping_mode);
        self.pulse_form.push(record.pulse_form);
        self.swath_mode.push(record.swath_mode);
        self.frequency_hz.push(record.frequency_hz);
        self.runtime.push(record.runtime);
        self.offsets.push(record.offsets);
        self.bytes_since_last_ping.push(record.bytes_since_last_ping);
        self.source_file_size.push(record.source_file_size);
        self.source_wc_file_size.push(record.source_wc_file_size);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = DetectionRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Full reset, used when all source files are removed.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Stable re-sort of every column by ping timestamp.
    pub fn sort_by_time(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.timestamp[a].total_cmp(&self.timestamp[b]));
        if order.iter().enumerate().all(|(i, &o)| i == o) {
            return;
        }

        self.fname = reorder(&self.fname, &order);
        self.format = reorder(&self.format, &order);
        self.timestamp = reorder(&self.timestamp, &order);
        self.y_port_m = reorder(&self.y_port_m, &order);
        self.z_port_m = reorder(&self.z_port_m, &order);
        self.bs_port_db = reorder(&self.bs_port_db, &order);
        self.rx_angle_port_deg = reorder(&self.rx_angle_port_deg, &order);
        self.y_stbd_m = reorder(&self.y_stbd_m, &order);
        self.z_stbd_m = reorder(&self.z_stbd_m, &order);
        self.bs_stbd_db = reorder(&self.bs_stbd_db, &order);
        self.rx_angle_stbd_deg = reorder(&self.rx_angle_stbd_deg, &order);
        self.ping_mode = reorder(&self.ping_mode, &order);
        self.pulse_form = reorder(&self.pulse_form, &order);
        self.swath_mode = reorder(&self.swath_mode, &order);
        self.frequency_hz = reorder(&self.frequency_hz, &order);
        self.runtime = reorder(&self.runtime, &order);
        self.offsets = reorder(&self.offsets, &order);
        self.bytes_since_last_ping = reorder(&self.bytes_since_last_ping, &order);
        self.source_file_size = reorder(&self.source_file_size, &order);
        self.source_wc_file_size = reorder(&self.source_wc_file_size, &order);
    }

    /// Flattened port‖stbd sounding list with per-side runtime limits.
    pub fn flatten(&self) -> FlatSoundings {
        let n = self.len();
        let mut y_m = Vec::with_capacity(2 * n);
        let mut z_m = Vec::with_capacity(2 * n);
        let mut bs_db = Vec::with_capacity(2 * n);
        let mut rx_angle_deg = Vec::with_capacity(2 * n);
        let mut runtime_limit_deg = Vec::with_capacity(2 * n);
        let mut runtime_limit_m = Vec::with_capacity(2 * n);

        y_m.extend_from_slice(&self.y_port_m);
        y_m.extend_from_slice(&self.y_stbd_m);
        z_m.extend_from_slice(&self.z_port_m);
        z_m.extend_from_slice(&self.z_stbd_m);
        bs_db.extend_from_slice(&self.bs_port_db);
        bs_db.extend_from_slice(&self.bs_stbd_db);
        rx_angle_deg.extend_from_slice(&self.rx_angle_port_deg);
        rx_angle_deg.extend_from_slice(&self.rx_angle_stbd_deg);

        for rt in &self.runtime {
            runtime_limit_deg.push(rt.map(|r| r.max_port_deg));
            runtime_limit_m.push(rt.map(|r| r.max_port_m));
        }
        for rt in &self.runtime {
            runtime_limit_deg.push(rt.map(|r| r.max_stbd_deg));
            runtime_limit_m.push(rt.map(|r| r.max_stbd_m));
        }

        FlatSoundings {
            y_m,
            z_m,
            bs_db,
            rx_angle_deg,
            runtime_limit_deg,
            runtime_limit_m,
        }
    }

    /// Per-ping water-column size contribution relative to the source file.
    pub fn wc_size_ratio(&self) -> Vec<f64> {
        self.source_file_size
            .iter()
            .zip(&self.source_wc_file_size)
            .map(|(&fsize, &wc)| {
                if fsize == 0 {
                    0.0
                } else {
                    wc as f64 / fsize as f64
                }
            })
            .collect()
    }

    /// Raw inter-ping byte counts as floats for the data-rate stage.
    pub fn bytes_f64(&self) -> Vec<f64> {
        self.bytes_since_last_ping.iter().map(|&b| b as f64).collect()
    }
}

fn reorder<T: Clone>(values: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&i| values[i].clone()).collect()
}
