/*!
 * Process Module
 * Process state machine, commands, workload generation and the process table
 */

pub mod command;
pub mod lifecycle;
pub mod table;
pub mod types;
pub mod workload;

// Re-export for convenience
pub use command::{Command, CommandKind, Operation};
pub use table::ProcessTable;
pub use types::{Process, ProcessSnapshot, ProcessState, ProcessTimes};
pub use workload::{generate_command, JobGenerator};
