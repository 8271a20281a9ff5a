/*!
 * Scheduler Entry Types
 * Internal data structures for ready-queue entries
 */

use crate::core::types::{Pid, Priority};

/// Ready-queue entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Entry {
    pub pid: Pid,
    /// Mirror of the process's dynamic priority, used as the sort key
    pub priority: Priority,
    /// Re-queued by a quantum expiry since the last aging pass
    pub penalized: bool,
}

impl Entry {
    pub fn new(pid: Pid, priority: Priority) -> Self {
        Self {
            pid,
            priority,
            penalized: false,
        }
    }
}
