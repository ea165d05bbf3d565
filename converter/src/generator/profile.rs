use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use swathcore::sonar_interface::{
    InstallOffsets, MountOffset, PingRecord, PingStream, RuntimeParams, SourceFormat,
};

/// Configuration for generating synthetic swath data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub pings: usize,
    pub beams: usize,
    pub depth_m: f64,
    pub swath_width_m: f64,
    pub noise_m: f64,
    pub seed: u64,
    pub dual_swath: bool,
    pub format: SourceFormat,
    pub ping_interval_s: f64,
    pub bytes_per_ping: u64,
    pub description: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pings: 200,
            beams: 64,
            depth_m: 500.0,
            swath_width_m: 1200.0,
            noise_m: 5.0,
            seed: 0,
            dual_swath: false,
            format: SourceFormat::Kmall,
            ping_interval_s: 5.0,
            bytes_per_ping: 60_000,
            description: None,
        }
    }
}

impl GeneratorConfig {
    fn normalized_pings(&self) -> usize {
        self.pings.max(1)
    }

    fn normalized_beams(&self) -> usize {
        self.beams.max(2)
    }
}

/// Short intra-cycle gap used for generated dual-swath timing.
const DUAL_SWATH_GAP_S: f64 = 0.4;

pub fn build_ping_stream_from_config(config: &GeneratorConfig) -> anyhow::Result<PingStream> {
    let pings = config.normalized_pings();
    let beams = config.normalized_beams();
    let total_bytes = (pings as u64)
        .checked_mul(config.bytes_per_ping)
        .context("overflow computing generated file size")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let invalid_code = match config.format {
        SourceFormat::All => 128u16,
        SourceFormat::Kmall => 1u16,
    };

    let half_width = config.swath_width_m / 2.0;
    let mut records = Vec::with_capacity(pings);
    for ping_index in 0..pings {
        let timestamp = if config.dual_swath {
            let cycle = (ping_index / 2) as f64;
            let base = cycle * config.ping_interval_s;
            if ping_index % 2 == 0 {
                base
            } else {
                base + DUAL_SWATH_GAP_S
            }
        } else {
            ping_index as f64 * config.ping_interval_s
        };

        let mut across_track_m = Vec::with_capacity(beams);
        let mut depth_m = Vec::with_capacity(beams);
        let mut backscatter_db = Vec::with_capacity(beams);
        let mut valid_code = Vec::with_capacity(beams);
        let mut rx_angle_deg = Vec::with_capacity(beams);

        for beam in 0..beams {
            let frac = beam as f64 / (beams - 1) as f64;
            let y = -half_width + frac * config.swath_width_m;
            let jitter = rng.gen_range(-config.noise_m..=config.noise_m);
            let z = config.depth_m + jitter;
            across_track_m.push(y);
            depth_m.push(z);
            backscatter_db.push(-25.0 + rng.gen_range(-5.0..=5.0));
            rx_angle_deg.push(y.atan2(z).to_degrees());
            // occasional dropouts at the array edges exercise the walk-in search
            let edge = beam == 0 || beam == beams - 1;
            if edge && rng.gen_bool(0.3) {
                valid_code.push(invalid_code);
            } else {
                valid_code.push(0);
            }
        }

        let swath_mode = if config.dual_swath {
            "Dual Swath (Dynamic)"
        } else {
            "Single Swath"
        };

        records.push(PingRecord {
            timestamp,
            across_track_m,
            depth_m,
            backscatter_db,
            valid_code,
            rx_angle_deg,
            ping_mode: "Deep".into(),
            pulse_form: "CW".into(),
            swath_mode: swath_mode.into(),
            frequency_hz: 30_000.0,
            runtime: Some(RuntimeParams {
                max_port_deg: 65.0,
                max_stbd_deg: 65.0,
                max_port_m: half_width,
                max_stbd_m: half_width,
            }),
            offsets: Some(InstallOffsets {
                tx: MountOffset {
                    y_m: 1.0,
                    z_m: 6.0,
                    ..Default::default()
                },
                rx: MountOffset::default(),
                aps_num: 1,
                aps_x_m: 0.5,
                aps_y_m: 0.0,
                aps_z_m: -1.0,
                wl_z_m: 4.0,
            }),
            bytes_since_last_ping: config.bytes_per_ping,
            source_file_size: total_bytes,
            source_wc_file_size: total_bytes / 2,
        });
    }

    Ok(PingStream {
        format: config.format,
        pings: records,
    })
}

#[allow(dead_code)]
pub fn build_ping_stream(pings: usize, beams: usize) -> anyhow::Result<PingStream> {
    let config = GeneratorConfig {
        pings,
        beams,
        ..Default::default()
    };
    build_ping_stream_from_config(&config)
}

/// Writes a generated stream in the JSON interchange format.
pub fn write_ping_stream(path: &Path, stream: &PingStream) -> anyhow::Result<()> {
    let text = serde_json::to_string(stream).context("encoding ping stream")?;
    fs::write(path, text).with_context(|| format!("writing ping stream {}", path.display()))
}
