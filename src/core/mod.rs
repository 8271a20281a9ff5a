/*!
 * Core Module
 * Fundamental simulator types, configuration and error handling
 */

pub mod config;
pub mod errors;
pub mod limits;
pub mod random;
pub mod types;

// Re-export for convenience
pub use config::{
    CommandConfig, CpuConfig, GeneratorConfig, OverheadConfig, SchedulerConfig, SharedConfig,
    SimConfig, SimulationConfig, SystemConfig,
};
pub use errors::{CapacityKind, SimError, SimResult};
pub use random::{RandomSource, SeededRandom};
pub use types::*;
