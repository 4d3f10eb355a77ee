/// Step parameters for adaptive orbit sampling. Divisors are applied to the
/// span of the orbit (its period, or its valid range for aperiodic orbits).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Maximum midpoint error, km
    pub tolerance: f64,
    pub max_step_divisor: f64,
    pub min_step_divisor: f64,
    pub start_step_divisor: f64,
    pub step_factor: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            max_step_divisor: 100.0,
            min_step_divisor: 1e7,
            start_step_divisor: 1e5,
            step_factor: 1.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Bodies whose frame graph is nested deeper than this are rejected.
    pub max_frame_depth: u32,
    pub sampling: SamplingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_frame_depth: 100,
            sampling: SamplingConfig::default(),
        }
    }
}
