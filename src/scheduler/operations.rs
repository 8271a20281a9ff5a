/*!
 * Scheduler Core Operations
 * Enqueue, remove, penalize, age and dispatch
 */

use super::entry::Entry;
use super::Scheduler;
use crate::core::config::SchedulerConfig;
use crate::core::errors::SimResult;
use crate::core::types::Pid;
use crate::process::{Process, ProcessTable};
use tracing::debug;

impl Scheduler {
    /// Add a READY process; ignored if its pid is already queued
    ///
    /// Returns `true` if the process was inserted.
    pub fn on_process_ready(&mut self, process: &Process) -> bool {
        self.insert(Entry::new(process.pid(), process.dynamic_priority()))
    }

    /// Remove a process that left the system; no-op if absent
    pub fn on_process_terminated(&mut self, pid: Pid) -> bool {
        match self.ready_queue.iter().position(|e| e.pid == pid) {
            Some(pos) => {
                self.ready_queue.remove(pos);
                debug!(pid, "Process removed from ready queue");
                true
            }
            None => false,
        }
    }

    /// Penalize, mark READY and re-queue a preempted process
    ///
    /// The process sits out the aging pass of the current tick.
    pub fn on_quantum_expired(&mut self, process: &mut Process, config: &SchedulerConfig) {
        let before = process.dynamic_priority();
        process.apply_run_penalty(config.run_penalty_step, config.min_priority);
        process.mark_ready();

        let mut entry = Entry::new(process.pid(), process.dynamic_priority());
        entry.penalized = true;
        self.insert(entry);
        self.stats.preemptions += 1;

        debug!(
            pid = process.pid(),
            from = before,
            to = process.dynamic_priority(),
            "Quantum expired, priority penalized"
        );
    }

    /// Advance the aging cadence; on every `aging_interval` tick raise the
    /// priority of each waiting process
    ///
    /// Returns the number of processes aged.
    pub fn tick_aging(
        &mut self,
        table: &mut ProcessTable,
        config: &SchedulerConfig,
    ) -> SimResult<usize> {
        self.tick_counter += 1;
        let mut aged = 0;

        if self.tick_counter % config.aging_interval() == 0 {
            for entry in self.ready_queue.iter_mut() {
                if entry.penalized {
                    continue;
                }
                let process = table.expect_mut(entry.pid)?;
                process.apply_aging(config.aging_step, config.max_priority);
                entry.priority = process.dynamic_priority();
                aged += 1;
            }
            self.stats.aging_passes += 1;
            self.sort_queue();
        }

        for entry in self.ready_queue.iter_mut() {
            entry.penalized = false;
        }

        if aged > 0 {
            debug!(aged, tick = self.tick_counter, "Aging pass applied");
        }
        Ok(aged)
    }

    /// Pop the highest-priority ready process
    pub fn get_next_process_for_cpu(&mut self) -> Option<Pid> {
        self.sort_queue();
        let entry = self.ready_queue.pop_front()?;
        self.stats.dispatched += 1;
        Some(entry.pid)
    }

    fn insert(&mut self, entry: Entry) -> bool {
        if self.contains(entry.pid) {
            return false;
        }
        debug!(pid = entry.pid, priority = entry.priority, "Process enqueued");
        self.ready_queue.push_back(entry);
        self.sort_queue();
        true
    }
}
