/*!
 * Simulation Configuration
 *
 * Plain configuration structs read fresh by the simulation at every tick.
 * A `SharedConfig` handle lets an external driver change values between ticks.
 */

use super::errors::{SimError, SimResult};
use super::limits::*;
use super::types::{Priority, Size};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Live configuration handle shared with collaborators (CLI, UI, driver)
pub type SharedConfig = Arc<RwLock<SimConfig>>;

/// Machine size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SystemConfig {
    /// Shared pool capacity in words
    pub total_memory: Size,
    /// Process table capacity
    pub max_processes: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            total_memory: DEFAULT_TOTAL_MEMORY,
            max_processes: DEFAULT_MAX_PROCESSES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CpuConfig {
    pub thread_count: usize,
    /// Only consumed by the paced driver
    pub ticks_per_second: f64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            thread_count: DEFAULT_THREAD_COUNT,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
        }
    }
}

/// Ranges used by the job generator (inclusive)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneratorConfig {
    pub min_memory: Size,
    pub max_memory: Size,
    pub min_instructions: u64,
    pub max_instructions: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_memory: DEFAULT_MIN_PROCESS_MEMORY,
            max_memory: DEFAULT_MAX_PROCESS_MEMORY,
            min_instructions: DEFAULT_MIN_INSTRUCTIONS,
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
        }
    }
}

/// Relative-priority scheduler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulerConfig {
    pub quantum: u64,
    pub min_priority: Priority,
    pub max_priority: Priority,
    pub base_priority: Priority,
    pub aging_step: Priority,
    pub run_penalty_step: Priority,
    pub aging_interval_ticks: u64,
}

impl SchedulerConfig {
    /// Aging cadence; zero behaves as every tick
    #[inline]
    #[must_use]
    pub fn aging_interval(&self) -> u64 {
        self.aging_interval_ticks.max(1)
    }

    /// Clamp a priority into the configured bounds
    ///
    /// An inverted range resolves to `max_priority` instead of panicking.
    #[inline]
    #[must_use]
    pub fn clamp_priority(&self, priority: Priority) -> Priority {
        priority.max(self.min_priority).min(self.max_priority)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum: DEFAULT_QUANTUM,
            min_priority: DEFAULT_MIN_PRIORITY,
            max_priority: DEFAULT_MAX_PRIORITY,
            base_priority: DEFAULT_BASE_PRIORITY,
            aging_step: DEFAULT_AGING_STEP,
            run_penalty_step: DEFAULT_RUN_PENALTY_STEP,
            aging_interval_ticks: DEFAULT_AGING_INTERVAL_TICKS,
        }
    }
}

/// Command mix and I/O latency
///
/// ERROR and IO are drawn against their probabilities; COMPUTE takes the
/// remainder, so `compute_prob` is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CommandConfig {
    pub compute_prob: f64,
    pub io_prob: f64,
    pub error_prob: f64,
    pub io_min_ticks: u64,
    pub io_max_ticks: u64,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            compute_prob: DEFAULT_COMPUTE_PROB,
            io_prob: DEFAULT_IO_PROB,
            error_prob: DEFAULT_ERROR_PROB,
            io_min_ticks: DEFAULT_IO_MIN_TICKS,
            io_max_ticks: DEFAULT_IO_MAX_TICKS,
        }
    }
}

/// Fixed OS costs per transition, in ticks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct OverheadConfig {
    pub load_ticks: u64,
    pub terminate_ticks: u64,
    pub ctx_ready_to_active: u64,
    pub ctx_active_to_ready: u64,
    pub ctx_active_to_blocked: u64,
    pub ctx_blocked_to_ready: u64,
    pub io_init_ticks: u64,
    pub io_interrupt_service_ticks: u64,
}

impl Default for OverheadConfig {
    fn default() -> Self {
        Self {
            load_ticks: 2,
            terminate_ticks: 1,
            ctx_ready_to_active: 1,
            ctx_active_to_ready: 1,
            ctx_active_to_blocked: 1,
            ctx_blocked_to_ready: 1,
            io_init_ticks: 1,
            io_interrupt_service_ticks: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SimulationConfig {
    /// Grace period a terminated process stays in the table
    pub remove_terminated_after_ticks: u64,
    /// Recent-execution history length
    pub history_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            remove_terminated_after_ticks: DEFAULT_REMOVE_TERMINATED_AFTER_TICKS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Complete simulator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SimConfig {
    pub system: SystemConfig,
    pub cpu: CpuConfig,
    pub generator: GeneratorConfig,
    pub scheduler: SchedulerConfig,
    pub commands: CommandConfig,
    /// `None` disables overhead accounting
    pub overheads: Option<OverheadConfig>,
    pub simulation: SimulationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            system: SystemConfig::default(),
            cpu: CpuConfig::default(),
            generator: GeneratorConfig::default(),
            scheduler: SchedulerConfig::default(),
            commands: CommandConfig::default(),
            overheads: Some(OverheadConfig::default()),
            simulation: SimulationConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields keep defaults
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: SimConfig = serde_json::from_str(json)
            .map_err(|e| SimError::InvalidConfig(format!("malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Wrap into a shared, runtime-mutable handle
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    /// Reject values the tick protocol cannot honor
    pub fn validate(&self) -> SimResult<()> {
        fn invalid(reason: impl Into<String>) -> SimResult<()> {
            Err(SimError::InvalidConfig(reason.into()))
        }

        if self.system.max_processes == 0 {
            return invalid("system.max_processes must be at least 1");
        }
        if self.cpu.thread_count == 0 {
            return invalid("cpu.thread_count must be at least 1");
        }
        if !(self.cpu.ticks_per_second > 0.0) {
            return invalid("cpu.ticks_per_second must be positive");
        }

        let gen = &self.generator;
        if gen.min_memory == 0 || gen.min_memory > gen.max_memory {
            return invalid(format!(
                "generator memory range {}..={} is empty or zero",
                gen.min_memory, gen.max_memory
            ));
        }
        if gen.min_instructions == 0 || gen.min_instructions > gen.max_instructions {
            return invalid(format!(
                "generator instruction range {}..={} is empty or zero",
                gen.min_instructions, gen.max_instructions
            ));
        }

        let sched = &self.scheduler;
        if sched.quantum == 0 {
            return invalid("scheduler.quantum must be at least 1");
        }
        if sched.min_priority > sched.max_priority {
            return invalid(format!(
                "priority range {}..={} is empty",
                sched.min_priority, sched.max_priority
            ));
        }
        if sched.base_priority < sched.min_priority || sched.base_priority > sched.max_priority {
            return invalid(format!(
                "base priority {} outside {}..={}",
                sched.base_priority, sched.min_priority, sched.max_priority
            ));
        }

        let cmd = &self.commands;
        for (name, p) in [
            ("compute_prob", cmd.compute_prob),
            ("io_prob", cmd.io_prob),
            ("error_prob", cmd.error_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("commands.{} = {} outside [0, 1]", name, p));
            }
        }
        if cmd.io_prob + cmd.error_prob > 1.0 + f64::EPSILON {
            return invalid("commands.io_prob + commands.error_prob exceeds 1");
        }
        if cmd.io_min_ticks == 0 || cmd.io_min_ticks > cmd.io_max_ticks {
            return invalid(format!(
                "I/O duration range {}..={} is empty or zero",
                cmd.io_min_ticks, cmd.io_max_ticks
            ));
        }

        if self.simulation.history_capacity == 0 {
            return invalid("simulation.history_capacity must be at least 1");
        }

        Ok(())
    }
}
