pub mod archive;
pub mod detection;
pub mod ping;

pub use archive::{ArchiveEnvelope, ArchiveMetadata, ArchiveStore, JsonArchiveStore};
pub use detection::{DetectionRecord, DetectionTable, FlatSoundings};
pub use ping::{
    InstallOffsets, JsonPingParser, MountOffset, PingParser, PingRecord, PingStream,
    RuntimeParams, SourceFormat,
};
