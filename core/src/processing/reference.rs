use crate::prelude::ReferenceFrame;
use crate::sonar_interface::detection::DetectionTable;
use crate::sonar_interface::ping::InstallOffsets;
use crate::telemetry::log::LogManager;

/// Per-ping translations from each record's native frame to one target datum.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameShift {
    pub dy_m: Vec<f64>,
    pub dz_m: Vec<f64>,
}

/// Re-references sounding geometry to a chosen datum.
pub struct ReferenceAdjuster {
    target: ReferenceFrame,
    logger: LogManager,
}

impl ReferenceAdjuster {
    pub fn new(target: ReferenceFrame) -> Self {
        Self {
            target,
            logger: LogManager::new(),
        }
    }

    /// Computes the per-ping translation. `Raw` always yields zero; pings
    /// lacking install offsets degrade to zero translation with a warning.
    pub fn adjust(&self, table: &DetectionTable) -> FrameShift {
        let pings = table.len();
        let mut shift = FrameShift {
            dy_m: vec![0.0; pings],
            dz_m: vec![0.0; pings],
        };
        if self.target == ReferenceFrame::Raw {
            return shift;
        }

        let mut missing = 0usize;
        for i in 0..pings {
            match &table.offsets[i] {
                Some(offsets) => {
                    let native = frame_offset(table.format[i].native_frame(), offsets);
                    let target = frame_offset(self.target, offsets);
                    shift.dy_m[i] = native.0 - target.0;
                    shift.dz_m[i] = native.1 - target.1;
                }
                None => missing += 1,
            }
        }
        if missing > 0 {
            self.logger.warn(&format!(
                "{} of {} pings lack install offsets; left unadjusted",
                missing, pings
            ));
        }
        shift
    }
}

/// (y, z) position of a frame re the mapping origin.
fn frame_offset(frame: ReferenceFrame, offsets: &InstallOffsets) -> (f64, f64) {
    match frame {
        ReferenceFrame::Origin | ReferenceFrame::Raw => (0.0, 0.0),
        ReferenceFrame::TxArray => (offsets.tx.y_m, offsets.tx.z_m),
        ReferenceFrame::Waterline => (0.0, offsets.wl_z_m),
    }
}
