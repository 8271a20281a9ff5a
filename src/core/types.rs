/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type (assigned sequentially, never reused)
pub type Pid = u32;

/// Simulated clock value
pub type Tick = u64;

/// Priority level (higher is more important)
pub type Priority = u8;

/// One word of process-private memory
pub type Word = i64;

/// Size type for memory accounting (in words)
pub type Size = usize;

/// Address into a process's private memory
pub type Address = usize;
