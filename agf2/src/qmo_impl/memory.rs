//! Probes for the memory currently in use by the process

use std::fs;

/// Bytes per page assumed when converting `/proc/self/statm` counts.
const PAGE_SIZE: f64 = 4096.0;

pub trait MemoryProbe {
    /// Memory in use, in MB (1 MB = 10^6 bytes).
    fn current_mb(&self) -> f64;
}

/// Resident set size of the running process. Reports zero where
/// `/proc/self/statm` is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessMemory;

impl MemoryProbe for ProcessMemory {
    fn current_mb(&self) -> f64 {
        fs::read_to_string("/proc/self/statm")
            .ok()
            .and_then(|statm| {
                statm
                    .split_whitespace()
                    .nth(1)
                    .and_then(|pages| pages.parse::<f64>().ok())
            })
            .map(|pages| pages * PAGE_SIZE / 1e6)
            .unwrap_or(0.0)
    }
}

/// A constant reading, used to pin the transform strategy.
#[derive(Debug, Clone, Copy)]
pub struct FixedMemory(pub f64);

impl MemoryProbe for FixedMemory {
    fn current_mb(&self) -> f64 {
        self.0
    }
}
