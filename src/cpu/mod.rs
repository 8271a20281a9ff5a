/*!
 * Multi-Slot CPU
 *
 * A fixed number of execution slots, each holding at most one RUNNING
 * process. Slots are capacity, not OS threads: the orchestrator walks them
 * sequentially within a tick.
 */

use crate::core::errors::{CapacityKind, SimError, SimResult};
use crate::core::types::Pid;
use crate::process::{Process, ProcessTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coarse CPU state, for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CpuState {
    Idle,
    Working,
}

#[derive(Debug, Clone)]
pub struct Cpu {
    slots: Vec<Option<Pid>>,
}

impl Cpu {
    pub fn new(thread_count: usize) -> Self {
        Self {
            slots: vec![None; thread_count],
        }
    }

    #[inline]
    pub fn thread_count(&self) -> usize {
        self.slots.len()
    }

    /// Change the slot count; processes in dropped slots are returned
    pub fn resize(&mut self, thread_count: usize) -> Vec<Pid> {
        if thread_count == self.slots.len() {
            return Vec::new();
        }
        debug!(from = self.slots.len(), to = thread_count, "CPU slot count changed");

        if thread_count > self.slots.len() {
            self.slots.resize(thread_count, None);
            return Vec::new();
        }

        // Compact occupied slots to the front, then cut
        let mut occupied: Vec<Pid> = self.slots.iter().flatten().copied().collect();
        let evicted = if occupied.len() > thread_count {
            occupied.split_off(thread_count)
        } else {
            Vec::new()
        };
        self.slots = occupied.into_iter().map(Some).collect();
        self.slots.resize(thread_count, None);
        evicted
    }

    #[inline]
    pub fn has_free_threads(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.slots.iter().any(|s| *s == Some(pid))
    }

    pub fn state(&self) -> CpuState {
        if self.active_count() == 0 {
            CpuState::Idle
        } else {
            CpuState::Working
        }
    }

    /// Place a process in a free slot, moving READY to RUNNING
    ///
    /// Returns the slot index.
    pub fn set_process(&mut self, process: &mut Process) -> SimResult<usize> {
        if self.contains(process.pid()) {
            return Err(SimError::InvariantViolation(format!(
                "pid {} is already on a CPU slot",
                process.pid()
            )));
        }
        let limit = self.slots.len();
        let (index, slot) = self
            .slots
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.is_none())
            .ok_or(SimError::CapacityExceeded {
                resource: CapacityKind::CpuSlots,
                limit,
            })?;

        *slot = Some(process.pid());
        if process.is_ready() {
            process.mark_running();
        }
        debug!(pid = process.pid(), slot = index, "Process dispatched");
        Ok(index)
    }

    /// Free the slot holding `pid`
    pub fn clear_process(&mut self, pid: Pid) -> bool {
        match self.slots.iter_mut().find(|s| **s == Some(pid)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    /// Occupied slots at this instant (a copy, safe to iterate while mutating)
    pub fn get_all_active_processes(&self) -> Vec<Pid> {
        self.slots.iter().flatten().copied().collect()
    }

    /// Advance every occupied slot by one instruction
    ///
    /// Processes that reach the end of their program are evicted and returned.
    pub fn tick(&mut self, table: &mut ProcessTable) -> SimResult<Vec<Pid>> {
        let mut finished = Vec::new();
        for slot in self.slots.iter_mut() {
            let Some(pid) = *slot else { continue };
            let process = table.expect_mut(pid)?;
            if process.advance_program_counter() {
                *slot = None;
                finished.push(pid);
            }
        }
        Ok(finished)
    }

    /// The instruction executing this tick uses up the quantum
    ///
    /// Checked before the clock advances, so the current instruction counts.
    #[inline]
    pub fn is_quantum_expired(&self, process: &Process, quantum: u64) -> bool {
        process.is_running() && process.slice_ticks() + 1 >= quantum
    }
}
