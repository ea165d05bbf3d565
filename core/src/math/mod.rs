pub mod grid;
pub mod stats;

pub use grid::GridHelper;
pub use stats::StatsHelper;
