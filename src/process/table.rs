/*!
 * Process Table
 * Owns every resident process (alive or within its removal grace period)
 */

use super::types::{Process, ProcessSnapshot};
use crate::core::errors::{CapacityKind, SimError, SimResult};
use crate::core::types::{Pid, Size};
use ahash::RandomState;
use std::collections::HashMap;

/// Process table keyed by pid
///
/// Capacity is passed per call so a runtime change of `max_processes` applies
/// to the next admission.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    processes: HashMap<Pid, Process, RandomState>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            processes: HashMap::with_hasher(RandomState::new()),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    #[inline]
    pub fn has_space(&self, max_processes: usize) -> bool {
        self.processes.len() < max_processes
    }

    /// Insert a process, rejecting a full table or a duplicate pid
    pub fn insert(&mut self, process: Process, max_processes: usize) -> SimResult<()> {
        if !self.has_space(max_processes) {
            return Err(SimError::CapacityExceeded {
                resource: CapacityKind::ProcessTable,
                limit: max_processes,
            });
        }
        if self.processes.contains_key(&process.pid()) {
            return Err(SimError::AlreadyExists(process.pid()));
        }
        self.processes.insert(process.pid(), process);
        Ok(())
    }

    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        self.processes.remove(&pid)
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.contains_key(&pid)
    }

    #[inline]
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    #[inline]
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    /// Lookup that must succeed inside the tick protocol
    pub(crate) fn expect_mut(&mut self, pid: Pid) -> SimResult<&mut Process> {
        self.processes.get_mut(&pid).ok_or_else(|| {
            SimError::InvariantViolation(format!("pid {} is queued but not in the process table", pid))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Process> {
        self.processes.values_mut()
    }

    /// Resident pids in ascending (admission) order
    pub fn pids(&self) -> Vec<Pid> {
        let mut pids: Vec<Pid> = self.processes.keys().copied().collect();
        pids.sort_unstable();
        pids
    }

    /// Memory charged for all resident processes
    pub fn resident_memory(&self) -> Size {
        self.processes.values().map(Process::memory_size).sum()
    }

    /// Report rows in ascending pid order
    pub fn snapshot(&self) -> Vec<ProcessSnapshot> {
        let mut rows: Vec<ProcessSnapshot> = self.processes.values().map(Process::snapshot).collect();
        rows.sort_unstable_by_key(|row| row.pid);
        rows
    }

    pub fn clear(&mut self) {
        self.processes.clear();
    }
}
