/*!
 * System Limits and Constants
 *
 * Default values for the simulated machine, grouped by subsystem.
 * Every value can be overridden through `SimConfig`.
 */

// =============================================================================
// SYSTEM
// =============================================================================

/// Shared memory pool size (words)
pub const DEFAULT_TOTAL_MEMORY: usize = 256;

/// Process table size (PSW table entries)
pub const DEFAULT_MAX_PROCESSES: usize = 32;

// =============================================================================
// CPU
// =============================================================================

/// Execution slots processed per tick
pub const DEFAULT_THREAD_COUNT: usize = 2;

/// Pace of the real-time driver
pub const DEFAULT_TICKS_PER_SECOND: f64 = 10.0;

/// Driver speed bounds (ticks per second)
pub const MIN_TICKS_PER_SECOND: f64 = 0.1;
pub const MAX_TICKS_PER_SECOND: f64 = 1000.0;

// =============================================================================
// WORKLOAD GENERATOR
// =============================================================================

pub const DEFAULT_MIN_PROCESS_MEMORY: usize = 5;
pub const DEFAULT_MAX_PROCESS_MEMORY: usize = 20;
pub const DEFAULT_MIN_INSTRUCTIONS: u64 = 10;
pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 200;

// =============================================================================
// SCHEDULER
// =============================================================================

/// Ticks a process may hold a slot before preemption
pub const DEFAULT_QUANTUM: u64 = 4;

pub const DEFAULT_MIN_PRIORITY: u8 = 1;
pub const DEFAULT_MAX_PRIORITY: u8 = 10;
pub const DEFAULT_BASE_PRIORITY: u8 = 5;

/// Priority gained per aging pass while READY
pub const DEFAULT_AGING_STEP: u8 = 2;

/// Priority lost when a quantum expires
pub const DEFAULT_RUN_PENALTY_STEP: u8 = 3;

/// Aging runs every N ticks
pub const DEFAULT_AGING_INTERVAL_TICKS: u64 = 3;

// =============================================================================
// COMMANDS
// =============================================================================

pub const DEFAULT_COMPUTE_PROB: f64 = 0.9;
pub const DEFAULT_IO_PROB: f64 = 0.05;
pub const DEFAULT_ERROR_PROB: f64 = 0.05;
pub const DEFAULT_IO_MIN_TICKS: u64 = 1;
pub const DEFAULT_IO_MAX_TICKS: u64 = 4;

// =============================================================================
// SIMULATION
// =============================================================================

/// Grace period before a terminated process leaves the table
pub const DEFAULT_REMOVE_TERMINATED_AFTER_TICKS: u64 = 10;

/// Recent-execution history length
pub const DEFAULT_HISTORY_CAPACITY: usize = 16;

/// `initial_load` gives up after this many attempts per table slot
pub const INITIAL_LOAD_ATTEMPTS_PER_SLOT: usize = 10;
