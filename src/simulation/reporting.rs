/*!
 * Read-Only Reporting
 */

use super::Simulation;
use crate::core::types::Pid;
use crate::cpu::CpuState;
use crate::io::IoStats;
use crate::memory::MemoryStats;
use crate::monitoring::analysis;
use crate::monitoring::{PerformanceReport, SystemReport, TimeBreakdown};
use crate::process::{Process, ProcessSnapshot};
use crate::scheduler::SchedulerStats;

impl Simulation {
    /// Process table rows ordered by pid
    pub fn process_table(&self) -> Vec<ProcessSnapshot> {
        self.table.snapshot()
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.table.get(pid)
    }

    #[inline]
    pub fn process_count(&self) -> usize {
        self.table.len()
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.memory.stats()
    }

    pub fn system_report(&self) -> SystemReport {
        analysis::system_report(&self.metrics, &self.table, self.tick)
    }

    pub fn performance_report(&self) -> PerformanceReport {
        analysis::performance_report(&self.metrics)
    }

    pub fn time_breakdown(&self) -> Vec<TimeBreakdown> {
        analysis::time_breakdown(&self.table, self.tick)
    }

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    pub fn io_stats(&self) -> IoStats {
        self.io.stats()
    }

    pub fn cpu_state(&self) -> CpuState {
        self.cpu.state()
    }

    /// Pids on CPU slots
    pub fn running_pids(&self) -> Vec<Pid> {
        self.cpu.get_all_active_processes()
    }

    /// Ready queue in dispatch order
    pub fn ready_pids(&self) -> Vec<Pid> {
        self.scheduler.ready_pids()
    }

    /// Pids waiting on I/O, in submission order
    pub fn blocked_pids(&self) -> Vec<Pid> {
        self.io.pending_pids()
    }
}
