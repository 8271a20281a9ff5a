/*!
 * Priority-Aging Scheduler
 *
 * Owns the ready queue, kept sorted by descending dynamic priority. Waiting
 * processes age upward on a fixed cadence; processes whose quantum expired are
 * penalized. Equal priorities are served in queue order (stable sort), so two
 * processes enqueued A then B with the same priority dispatch A first.
 *
 * Configuration is passed into each call rather than stored, so runtime
 * changes apply to the next operation.
 */

use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

mod entry;
mod operations;

use entry::Entry;

/// Scheduler statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerStats {
    /// Processes handed to the CPU
    pub dispatched: u64,
    /// Quantum expiries
    pub preemptions: u64,
    /// Aging passes that actually ran
    pub aging_passes: u64,
    pub ready_processes: usize,
}

/// Ready queue plus aging cadence counter
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    ready_queue: VecDeque<Entry>,
    // Gates the aging cadence only
    tick_counter: u64,
    stats: SchedulerStats,
}

impl Scheduler {
    pub fn new() -> Self {
        debug!("Scheduler initialized with relative-priority aging");
        Self::default()
    }

    /// Number of READY processes
    #[inline]
    pub fn ready_count(&self) -> usize {
        self.ready_queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ready_queue.is_empty()
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.ready_queue.iter().any(|e| e.pid == pid)
    }

    /// Queue contents in dispatch order
    pub fn ready_pids(&self) -> Vec<Pid> {
        self.ready_queue.iter().map(|e| e.pid).collect()
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            ready_processes: self.ready_queue.len(),
            ..self.stats
        }
    }

    /// Drop all queued processes and restart the aging cadence
    pub fn clear(&mut self) {
        self.ready_queue.clear();
        self.tick_counter = 0;
        self.stats = SchedulerStats::default();
    }

    /// Stable sort by descending priority
    fn sort_queue(&mut self) {
        self.ready_queue
            .make_contiguous()
            .sort_by(|a, b| b.priority.cmp(&a.priority));
    }
}
