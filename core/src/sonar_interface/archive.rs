use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::prelude::{PipelineError, PipelineResult};
use crate::sonar_interface::detection::{DetectionRecord, DetectionTable};
use crate::sonar_interface::ping::{InstallOffsets, RuntimeParams, SourceFormat};
use crate::telemetry::log::LogManager;

/// Provenance envelope stored alongside an archived dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveMetadata {
    pub source_file: String,
    pub source_mtime: f64,
    pub conversion_time: String,
    pub version: String,
    pub compressed: bool,
}

/// Column payload of one archived dataset. Field names match the
/// historical archive layout; `x_port`/`x_stbd` are accepted as legacy
/// aliases of the across-track columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveDataset {
    pub fname: Vec<String>,
    pub format: Vec<SourceFormat>,
    pub timestamp: Vec<f64>,
    #[serde(alias = "x_port")]
    pub y_port: Vec<f64>,
    #[serde(alias = "x_stbd")]
    pub y_stbd: Vec<f64>,
    pub z_port: Vec<f64>,
    pub z_stbd: Vec<f64>,
    pub bs_port: Vec<f64>,
    pub bs_stbd: Vec<f64>,
    pub rx_angle_port: Vec<f64>,
    pub rx_angle_stbd: Vec<f64>,
    pub ping_mode: Vec<String>,
    pub pulse_form: Vec<String>,
    pub swath_mode: Vec<String>,
    pub frequency: Vec<f64>,
    pub runtime: Vec<Option<RuntimeParams>>,
    pub offsets: Vec<Option<InstallOffsets>>,
    pub bytes: Vec<u64>,
    pub fsize: Vec<u64>,
    pub fsize_wc: Vec<u64>,
}

/// Archived dataset plus optional provenance; legacy blobs deserialize
/// with `metadata` absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ArchiveMetadata>,
    #[serde(flatten)]
    pub dataset: ArchiveDataset,
}

impl ArchiveEnvelope {
    pub fn from_table(table: &DetectionTable, metadata: Option<ArchiveMetadata>) -> Self {
        Self {
            metadata,
            dataset: ArchiveDataset {
                fname: table.fname.clone(),
                format: table.format.clone(),
                timestamp: table.timestamp.clone(),
                y_port: table.y_port_m.clone(),
                y_stbd: table.y_stbd_m.clone(),
                z_port: table.z_port_m.clone(),
                z_stbd: table.z_stbd_m.clone(),
                bs_port: table.bs_port_db.clone(),
                bs_stbd: table.bs_stbd_db.clone(),
                rx_angle_port: table.rx_angle_port_deg.clone(),
                rx_angle_stbd: table.rx_angle_stbd_deg.clone(),
                ping_mode: table.ping_mode.clone(),
                pulse_form: table.pulse_form.clone(),
                swath_mode: table.swath_mode.clone(),
                frequency: table.frequency_hz.clone(),
                runtime: table.runtime.clone(),
                offsets: table.offsets.clone(),
                bytes: table.bytes_since_last_ping.clone(),
                fsize: table.source_file_size.clone(),
                fsize_wc: table.source_wc_file_size.clone(),
            },
        }
    }

    /// Merges the archived columns into a detection table. Sounding
    /// columns must agree in length; absent ancillary columns are padded
    /// with defaults so legacy blobs load without failing.
    pub fn into_table(self) -> PipelineResult<DetectionTable> {
        let d = self.dataset;
        let n = d.timestamp.len();
        let sounding_cols = [
            d.y_port.len(),
            d.y_stbd.len(),
            d.z_port.len(),
            d.z_stbd.len(),
        ];
        if sounding_cols.iter().any(|&len| len != n) {
            return Err(PipelineError::ParseFailure(
                "archive sounding columns disagree in length".into(),
            ));
        }

        let source = self
            .metadata
            .as_ref()
            .map(|m| m.source_file.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let mut table = DetectionTable::new();
        for i in 0..n {
            table.push(DetectionRecord {
                fname: column(&d.fname, i, source.clone()),
                // legacy archives predate the kmall layout
                format: column(&d.format, i, SourceFormat::All),
                timestamp: d.timestamp[i],
                y_port_m: d.y_port[i],
                z_port_m: d.z_port[i],
                bs_port_db: column(&d.bs_port, i, f64::NAN),
                rx_angle_port_deg: column(&d.rx_angle_port, i, f64::NAN),
                y_stbd_m: d.y_stbd[i],
                z_stbd_m: d.z_stbd[i],
                bs_stbd_db: column(&d.bs_stbd, i, f64::NAN),
                rx_angle_stbd_deg: column(&d.rx_angle_stbd, i, f64::NAN),
                ping_mode: column(&d.ping_mode, i, String::new()),
                pulse_form: column(&d.pulse_form, i, String::new()),
                swath_mode: column(&d.swath_mode, i, String::new()),
                frequency_hz: column(&d.frequency, i, 0.0),
                runtime: column(&d.runtime, i, None),
                offsets: column(&d.offsets, i, None),
                bytes_since_last_ping: column(&d.bytes, i, 0),
                source_file_size: column(&d.fsize, i, 0),
                source_wc_file_size: column(&d.fsize_wc, i, 0),
            });
        }
        table.sort_by_time();
        Ok(table)
    }
}

fn column<T: Clone>(values: &[T], index: usize, fallback: T) -> T {
    values.get(index).cloned().unwrap_or(fallback)
}

/// Boundary trait for the archive/serialization collaborator. `load`
/// returns the envelope plus a human-readable status string.
pub trait ArchiveStore {
    fn save(&self, envelope: &ArchiveEnvelope, path: &Path, compressed: bool)
        -> PipelineResult<()>;
    fn load(&self, path: &Path) -> PipelineResult<(ArchiveEnvelope, String)>;
}

/// Reference store writing the envelope as plain JSON. Compression is
/// left to the external archive collaborator; a compressed request is
/// recorded in the envelope and logged.
pub struct JsonArchiveStore {
    logger: LogManager,
}

impl JsonArchiveStore {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
        }
    }
}

impl Default for JsonArchiveStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveStore for JsonArchiveStore {
    fn save(
        &self,
        envelope: &ArchiveEnvelope,
        path: &Path,
        compressed: bool,
    ) -> PipelineResult<()> {
        if compressed {
            self.logger
                .warn("compressed archive requested; json store writes plain text");
        }
        let text = serde_json::to_string(envelope)
            .map_err(|err| PipelineError::Internal(format!("archive encode: {}", err)))?;
        fs::write(path, text).map_err(|err| {
            PipelineError::Internal(format!("archive write {}: {}", path.display(), err))
        })
    }

    fn load(&self, path: &Path) -> PipelineResult<(ArchiveEnvelope, String)> {
        let contents = fs::read_to_string(path).map_err(|err| {
            PipelineError::ParseFailure(format!("{}: {}", path.display(), err))
        })?;
        let envelope: ArchiveEnvelope = serde_json::from_str(&contents).map_err(|err| {
            PipelineError::ParseFailure(format!("{}: {}", path.display(), err))
        })?;
        let status = match &envelope.metadata {
            Some(meta) => format!("archive version {}", meta.version),
            None => "legacy archive (no metadata envelope)".to_string(),
        };
        Ok((envelope, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_field_names_alias_to_current_columns() {
        let blob = r#"{
            "timestamp": [1.0, 2.0],
            "x_port": [-30.0, -31.0],
            "x_stbd": [30.0, 31.0],
            "z_port": [50.0, 51.0],
            "z_stbd": [50.0, 51.0]
        }"#;

        let envelope: ArchiveEnvelope = serde_json::from_str(blob).unwrap();
        assert!(envelope.metadata.is_none());
        assert_eq!(envelope.dataset.y_port, vec![-30.0, -31.0]);
        assert_eq!(envelope.dataset.y_stbd, vec![30.0, 31.0]);

        let table = envelope.into_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.format[0], SourceFormat::All);
        assert_eq!(table.fname[0], "unknown");
        assert!(table.bs_port_db[0].is_nan());
    }

    #[test]
    fn mismatched_sounding_columns_are_rejected() {
        let blob = r#"{
            "timestamp": [1.0, 2.0],
            "y_port": [-30.0],
            "y_stbd": [30.0, 31.0],
            "z_port": [50.0, 51.0],
            "z_stbd": [50.0, 51.0]
        }"#;

        let envelope: ArchiveEnvelope = serde_json::from_str(blob).unwrap();
        assert!(matches!(
            envelope.into_table(),
            Err(PipelineError::ParseFailure(_))
        ));
    }

    #[test]
    fn envelope_round_trips_with_metadata() {
        let mut table = DetectionTable::new();
        table.push(DetectionRecord {
            fname: "line1.kmall".into(),
            format: SourceFormat::Kmall,
            timestamp: 5.0,
            y_port_m: -60.0,
            z_port_m: 120.0,
            bs_port_db: -18.0,
            rx_angle_port_deg: -58.0,
            y_stbd_m: 62.0,
            z_stbd_m: 121.0,
            bs_stbd_db: -19.0,
            rx_angle_stbd_deg: 59.0,
            ping_mode: "Deep".into(),
            pulse_form: "FM".into(),
            swath_mode: "Dual Swath".into(),
            frequency_hz: 30_000.0,
            runtime: None,
            offsets: None,
            bytes_since_last_ping: 2048,
            source_file_size: 4096,
            source_wc_file_size: 0,
        });

        let metadata = ArchiveMetadata {
            source_file: "line1.kmall".into(),
            source_mtime: 1000.0,
            conversion_time: "2025-01-01T00:00:00".into(),
            version: "2.1".into(),
            compressed: false,
        };
        let envelope = ArchiveEnvelope::from_table(&table, Some(metadata));
        let text = serde_json::to_string(&envelope).unwrap();
        let parsed: ArchiveEnvelope = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.metadata.as_ref().unwrap().version, "2.1");
        let restored = parsed.into_table().unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.fname[0], "line1.kmall");
        assert_eq!(restored.swath_mode[0], "Dual Swath");
    }

    #[test]
    fn json_store_reports_legacy_status() {
        use std::io::Write;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(
            br#"{"timestamp": [1.0], "x_port": [-10.0], "x_stbd": [10.0], "z_port": [20.0], "z_stbd": [20.0]}"#,
        )
        .unwrap();

        let store = JsonArchiveStore::new();
        let (envelope, status) = store.load(&path).unwrap();
        assert!(status.contains("legacy"));
        assert_eq!(envelope.dataset.y_port, vec![-10.0]);
    }
}
