//! Soak Probe - The supervised polling loop and the three probe kinds
//!
//! A probe performs exactly one exercising operation per iteration; the
//! runner drives it on a fixed cadence, classifies every failure as
//! recoverable (log, continue) or fatal (log, stop with a nonzero exit
//! code), and honors cooperative cancellation.

pub mod error;
pub mod fs;
pub mod read_write;
pub mod region_mover;
pub mod runner;

// Re-export primary types
pub use error::{ProbeError, Result};
pub use fs::{FsEndpoint, FsProbe, APPEND_FILE_NAME, OVERWRITE_FILE_NAME};
pub use read_write::{ReadWriteProbe, PROBE_COLUMN, PROBE_ROW_KEY, SCAN_START_ROW};
pub use region_mover::RegionMoveProbe;
pub use runner::{LoopControl, Probe, ProbeOutcome, ProbeRunner, RunnerConfig, FATAL_EXIT_CODE};

/// Timestamp layout shared by the write probes
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Current local time in the probe timestamp layout
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_layout() {
        let stamp = timestamp_now();
        // yyyy/mm/dd hh:mm:ss
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "/");
        assert_eq!(&stamp[10..11], " ");
    }
}
