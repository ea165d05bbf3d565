use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::prelude::{PipelineError, PipelineResult, ReferenceFrame};

/// Source container format; the two supported record layouts differ in
/// validity threshold and native reference frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceFormat {
    /// Kongsberg .all: detection codes below 128 are valid, soundings re TX array.
    All,
    /// Kongsberg .kmall: detection code 0 is valid, soundings re mapping origin.
    Kmall,
}

impl SourceFormat {
    pub fn is_valid_code(&self, code: u16) -> bool {
        match self {
            SourceFormat::All => code < 128,
            SourceFormat::Kmall => code == 0,
        }
    }

    pub fn native_frame(&self) -> ReferenceFrame {
        match self {
            SourceFormat::All => ReferenceFrame::TxArray,
            SourceFormat::Kmall => ReferenceFrame::Origin,
        }
    }
}

/// Array mount offsets re the mapping origin.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MountOffset {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub heading_deg: f64,
}

/// Installation offsets carried by each ping for re-referencing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InstallOffsets {
    pub tx: MountOffset,
    pub rx: MountOffset,
    pub aps_num: u8,
    pub aps_x_m: f64,
    pub aps_y_m: f64,
    pub aps_z_m: f64,
    pub wl_z_m: f64,
}

/// Operator-configured acquisition limits in effect for one ping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RuntimeParams {
    pub max_port_deg: f64,
    pub max_stbd_deg: f64,
    pub max_port_m: f64,
    pub max_stbd_m: f64,
}

/// One decoded ping as delivered by an upstream file parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingRecord {
    pub timestamp: f64,
    pub across_track_m: Vec<f64>,
    pub depth_m: Vec<f64>,
    pub backscatter_db: Vec<f64>,
    pub valid_code: Vec<u16>,
    pub rx_angle_deg: Vec<f64>,
    pub ping_mode: String,
    pub pulse_form: String,
    pub swath_mode: String,
    pub frequency_hz: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<InstallOffsets>,
    pub bytes_since_last_ping: u64,
    pub source_file_size: u64,
    pub source_wc_file_size: u64,
}

impl PingRecord {
    pub fn beam_count(&self) -> usize {
        self.depth_m.len()
    }
}

/// Interchange envelope for a decoded ping stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingStream {
    pub format: SourceFormat,
    pub pings: Vec<PingRecord>,
}

/// Boundary trait implemented by per-format file decoders.
pub trait PingParser {
    fn parse(&self, path: &Path) -> PipelineResult<PingStream>;
}

/// Reference decoder for the JSON ping-stream interchange format.
pub struct JsonPingParser;

impl PingParser for JsonPingParser {
    fn parse(&self, path: &Path) -> PipelineResult<PingStream> {
        let contents = fs::read_to_string(path).map_err(|err| {
            PipelineError::ParseFailure(format!("{}: {}", path.display(), err))
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            PipelineError::ParseFailure(format!("{}: {}", path.display(), err))
        })
    }
}
