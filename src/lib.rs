/*!
 * OS Simulation Kernel
 *
 * Discrete-time simulator of a multi-threaded operating-system core: process
 * lifecycle, shared memory accounting, a priority-aging preemptive scheduler,
 * a multi-slot CPU, blocking I/O and synthetic instruction execution, plus
 * utilization and mono-vs-multi performance analysis.
 */

pub mod core;
pub mod cpu;
pub mod io;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod simulation;

// Re-exports
pub use crate::core::{
    CapacityKind, RandomSource, SeededRandom, SharedConfig, SimConfig, SimError, SimResult,
};
pub use crate::core::types::{Pid, Priority, Tick, Word};
pub use cpu::{Cpu, CpuState};
pub use io::{IoCompletion, IoStats, IoSubsystem};
pub use memory::{MemoryManager, MemoryStats, ProcessMemory};
pub use monitoring::{init_tracing, PerformanceReport, SystemReport, TimeBreakdown};
pub use process::{Command, Process, ProcessSnapshot, ProcessState, ProcessTable};
pub use scheduler::{Scheduler, SchedulerStats};
pub use simulation::{Simulation, SimulationDriver};
