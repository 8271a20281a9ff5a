/*!
 * Admission and Forced Removal
 */

use super::Simulation;
use crate::core::errors::{CapacityKind, SimError, SimResult};
use crate::core::limits::INITIAL_LOAD_ATTEMPTS_PER_SLOT;
use crate::core::types::Pid;
use crate::process::Process;
use tracing::{debug, info, warn};

impl Simulation {
    /// Admit a process, generating one when none is given
    ///
    /// Checks run before any change, so a refused process leaves the table,
    /// the pool and the ready queue untouched.
    pub fn load_process(&mut self, process: Option<Process>) -> SimResult<Pid> {
        let config = self.config.read().clone();
        config.validate()?;
        let mut process = match process {
            Some(process) => process,
            None => self
                .jobs
                .generate(&config.generator, &config.scheduler, self.rng.as_mut()),
        };
        let pid = process.pid();

        if process.memory_size() == 0 {
            warn!(pid, "Admission refused, process has no memory");
            return Err(SimError::InvalidProcess {
                pid,
                reason: "memory size must be at least 1 word".into(),
            });
        }
        if process.total_instructions() == 0 {
            warn!(pid, "Admission refused, process has no instructions");
            return Err(SimError::InvalidProcess {
                pid,
                reason: "total instructions must be at least 1".into(),
            });
        }
        if !self.table.has_space(config.system.max_processes) {
            warn!(pid, limit = config.system.max_processes, "Admission refused, process table full");
            return Err(SimError::CapacityExceeded {
                resource: CapacityKind::ProcessTable,
                limit: config.system.max_processes,
            });
        }
        if self.table.contains(pid) {
            warn!(pid, "Admission refused, pid already resident");
            return Err(SimError::AlreadyExists(pid));
        }
        self.memory.set_capacity(config.system.total_memory);
        if !self.memory.has_space(process.memory_size()) {
            warn!(
                pid,
                requested = process.memory_size(),
                available = self.memory.available(),
                "Admission refused, insufficient memory"
            );
            return Err(SimError::InsufficientMemory {
                requested: process.memory_size(),
                available: self.memory.available(),
            });
        }

        process.mark_ready();
        process.arrival_tick = Some(self.tick);
        self.memory.allocate(process.memory_size());
        self.scheduler.on_process_ready(&process);
        self.table.insert(process, config.system.max_processes)?;

        if let Some(overheads) = &config.overheads {
            // Charged to the admitted process alone
            self.table.expect_mut(pid)?.times.load_overhead += overheads.load_ticks;
        }

        debug!(pid, tick = self.tick, "Process admitted");
        Ok(pid)
    }

    /// Fill the machine with generated processes
    ///
    /// Stops at the first candidate that does not fit, when the table is full,
    /// or after ten attempts per table slot. Returns the admitted pids.
    pub fn initial_load(&mut self) -> Vec<Pid> {
        let max_processes = self.config.read().system.max_processes;
        let limit = max_processes.saturating_mul(INITIAL_LOAD_ATTEMPTS_PER_SLOT);
        let mut admitted = Vec::new();

        for _ in 0..limit {
            if !self.table.has_space(max_processes) {
                break;
            }
            let candidate = self.generate_process();
            if !self.memory.has_space(candidate.memory_size()) {
                break;
            }
            match self.load_process(Some(candidate)) {
                Ok(pid) => admitted.push(pid),
                Err(e) => {
                    warn!(error = %e, "Initial load stopped");
                    break;
                }
            }
        }

        info!(
            admitted = admitted.len(),
            used = self.memory.used(),
            total = self.memory.total(),
            "Initial load finished"
        );
        admitted
    }

    /// Terminate and remove a process immediately, outside the tick flow
    ///
    /// Memory is released at once. A process that had already terminated is
    /// simply released; its completion is not recorded twice.
    pub fn remove_process_by_pid(&mut self, pid: Pid) -> SimResult<()> {
        let already_terminated = self
            .table
            .get(pid)
            .ok_or(SimError::NotFound(pid))?
            .is_terminated();

        if !already_terminated {
            let config = self.config.read().clone();
            self.handle_termination(pid, &config)?;
        }
        self.pending.retain(|r| r.pid != pid);

        if let Some(process) = self.table.remove(pid) {
            self.memory.free(process.memory_size());
        }
        debug!(pid, "Process removed");
        Ok(())
    }
}
