//! Scan pipeline configuration.

/// Configuration for the scan-telemetry pipeline.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Upper bound on one geolocation attempt in milliseconds
    /// (default: 15_000). The in-flight request is abandoned once
    /// this elapses.
    pub geo_timeout_ms: u64,
    /// Ask the location provider for high-accuracy coordinates.
    pub geo_high_accuracy: bool,
    /// Length of generated tag codes (default: 8).
    pub code_length: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            geo_timeout_ms: 15_000,
            geo_high_accuracy: true,
            code_length: 8,
        }
    }
}
