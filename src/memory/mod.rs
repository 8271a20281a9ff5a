/*!
 * Memory Management
 *
 * Two independent views of memory:
 * - **Shared pool** (`MemoryManager`): a capacity counter charged once per
 *   admitted process and released when the process leaves the table
 * - **Private words** (`ProcessMemory`): the operand space of COMPUTE commands
 */

mod pool;
mod types;
mod words;

pub use pool::MemoryManager;
pub use types::{MemoryPressure, MemoryStats};
pub use words::ProcessMemory;
