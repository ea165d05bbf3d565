use crate::sonar_interface::detection::DetectionRecord;
use crate::sonar_interface::ping::{PingRecord, SourceFormat};
use crate::telemetry::log::LogManager;

/// Outermost-valid-detection search over one ping's beam arrays.
///
/// The search walks inward from each edge of the beam array until the
/// format's validity test passes. It is a nearest-to-edge search, not a
/// min/max-angle search: invalid beams at the array ends can make the
/// returned sounding less extreme than the widest valid beam.
pub struct SoundingExtractor {
    format: SourceFormat,
    params_only: bool,
    logger: LogManager,
}

impl SoundingExtractor {
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            params_only: false,
            logger: LogManager::new(),
        }
    }

    /// Parameter-only scans skip the beam search and zero-fill both
    /// sides while still copying the acquisition metadata.
    pub fn params_only(format: SourceFormat) -> Self {
        Self {
            format,
            params_only: true,
            logger: LogManager::new(),
        }
    }

    /// Returns one detection per ping, or None when the ping carries no
    /// valid beam at all (the ping is skipped, not zero-filled).
    pub fn extract(&self, fname: &str, ping: &PingRecord) -> Option<DetectionRecord> {
        if self.params_only {
            return Some(self.build_record(fname, ping, None, None));
        }

        let beams = ping.beam_count();
        if beams == 0
            || ping.valid_code.len() != beams
            || ping.across_track_m.len() != beams
        {
            self.logger.warn(&format!(
                "{}: ping at t={:.3} has inconsistent beam arrays, skipped",
                fname, ping.timestamp
            ));
            return None;
        }

        let mut port = 0usize;
        while port < beams && !self.format.is_valid_code(ping.valid_code[port]) {
            port += 1;
        }
        if port == beams {
            self.logger.warn(&format!(
                "{}: ping at t={:.3} has no valid soundings, skipped",
                fname, ping.timestamp
            ));
            return None;
        }

        let mut stbd = beams - 1;
        while stbd > 0 && !self.format.is_valid_code(ping.valid_code[stbd]) {
            stbd -= 1;
        }

        Some(self.build_record(fname, ping, Some(port), Some(stbd)))
    }

    fn build_record(
        &self,
        fname: &str,
        ping: &PingRecord,
        port: Option<usize>,
        stbd: Option<usize>,
    ) -> DetectionRecord {
        let pick = |values: &[f64], idx: Option<usize>| -> f64 {
            idx.and_then(|i| values.get(i).copied()).unwrap_or(0.0)
        };

        DetectionRecord {
            fname: fname.to_string(),
            format: self.format,
            timestamp: ping.timestamp,
            y_port_m: pick(&ping.across_track_m, port),
            z_port_m: pick(&ping.depth_m, port),
            bs_port_db: pick(&ping.backscatter_db, port),
            rx_angle_port_deg: pick(&ping.rx_angle_deg, port),
            y_stbd_m: pick(&ping.across_track_m, stbd),
            z_stbd_m: pick(&ping.depth_m, stbd),
            bs_stbd_db: pick(&ping.backscatter_db, stbd),
            rx_angle_stbd_deg: pick(&ping.rx_angle_deg, stbd),
            ping_mode: ping.ping_mode.clone(),
            pulse_form: ping.pulse_form.clone(),
            swath_mode: ping.swath_mode.clone(),
            frequency_hz: ping.frequency_hz,
            runtime: ping.runtime,
            offsets: ping.offsets,
            bytes_since_last_ping: ping.bytes_since_last_ping,
            source_file_size: ping.source_file_size,
            source_wc_file_size: ping.source_wc_file_size,
        }
    }
}
