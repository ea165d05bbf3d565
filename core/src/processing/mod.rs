pub mod datarate;
pub mod decimate;
pub mod extract;
pub mod filter;
pub mod publisher;
pub mod reference;
pub mod trend;

pub use datarate::{CycleRole, DataRateAnalyzer, DataRateSample};
pub use decimate::Decimator;
pub use extract::SoundingExtractor;
pub use filter::FilterEngine;
pub use publisher::TablePublisher;
pub use reference::{FrameShift, ReferenceAdjuster};
pub use trend::{CoverageTrendAnalyzer, TrendBin};
