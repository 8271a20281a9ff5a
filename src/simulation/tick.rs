/*!
 * Tick Protocol
 *
 * One tick runs, in this order:
 *  1. snapshot the CPU slots
 *  2. execute the command of each snapshotted process
 *  3. preempt survivors whose quantum expired
 *  4. advance the CPU clock
 *  5. age the ready queue
 *  6. advance I/O and requeue completions
 *  7. refill free slots
 *  8. per-state tick accounting
 *  9. sample metrics
 * 10. release terminated processes past their retention window
 *
 * Aging runs after preemption and before refill so a process penalized this
 * tick is only aged from the next tick on. Wait accounting runs after refill
 * so a process dispatched this tick is not charged a wait tick.
 *
 * A preempted process leaves its slot before step 4, so preemption retires
 * the instruction it executed this tick itself.
 */

use super::{PendingRemoval, Simulation};
use crate::core::config::SimConfig;
use crate::core::errors::{SimError, SimResult};
use crate::core::types::{Pid, Tick};
use crate::monitoring::{Completion, TickSample, TickSpan};
use crate::process::{generate_command, Command, ProcessState};
use tracing::{debug, error, warn};

/// Bucket an overhead charge lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overhead {
    ContextSwitch,
    IoInit,
    IoInterrupt,
    Terminate,
}

/// What step 2 did with a process
enum StepOutcome {
    Stayed,
    Blocked,
    Terminated,
}

impl Simulation {
    /// Advance the simulation by one tick
    ///
    /// A configuration that no longer validates is refused with
    /// `InvalidConfig` before anything changes; the tick can be retried once
    /// the values are fixed. A failure inside the protocol marks the
    /// simulation faulted: the error is reported as `InvariantViolation` and
    /// later ticks return `Faulted` until `reset()`.
    pub fn tick(&mut self) -> SimResult<()> {
        if self.faulted {
            return Err(SimError::Faulted);
        }

        let config = self.config.read().clone();
        if let Err(e) = config.validate() {
            warn!(tick = self.tick, error = %e, "Tick refused, configuration invalid");
            return Err(e);
        }

        self.tick += 1;
        let span = TickSpan::new(&self.run_id, self.tick);
        let _guard = span.enter();

        self.run_tick(&config, &span).map_err(|e| {
            self.faulted = true;
            error!(tick = self.tick, error = %e, "Tick aborted, simulation faulted");
            match e {
                SimError::InvariantViolation(_) => e,
                other => SimError::InvariantViolation(format!("tick {}: {}", self.tick, other)),
            }
        })
    }

    /// Run `ticks` ticks, stopping at the first failure
    pub fn run(&mut self, ticks: u64) -> SimResult<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Ticks elapsed since creation or the last reset
    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    fn run_tick(&mut self, config: &SimConfig, span: &TickSpan) -> SimResult<()> {
        self.follow_capacity(config)?;

        // 1
        let active = self.cpu.get_all_active_processes();
        span.record_executed(active.len());
        let mut completed = 0;

        // 2, 3
        for &pid in &active {
            match self.execute_step(pid, config)? {
                StepOutcome::Stayed => {
                    let expired = self
                        .table
                        .get(pid)
                        .is_some_and(|p| self.cpu.is_quantum_expired(p, config.scheduler.quantum));
                    if expired && self.preempt(pid, config)? {
                        completed += 1;
                    }
                }
                StepOutcome::Blocked => {}
                StepOutcome::Terminated => completed += 1,
            }
        }

        // 4
        for pid in self.cpu.tick(&mut self.table)? {
            debug!(pid, "Program finished");
            self.handle_termination(pid, config)?;
            completed += 1;
        }

        // 5
        self.scheduler.tick_aging(&mut self.table, &config.scheduler)?;

        // 6
        for done in self.io.tick() {
            self.complete_io(done.pid, config)?;
        }

        // 7
        self.dispatch(config)?;

        // 8
        for process in self.table.iter_mut() {
            match process.state {
                ProcessState::Running => process.times.run_ticks += 1,
                ProcessState::BlockedIo | ProcessState::BlockedMem => {
                    process.times.blocked_ticks += 1
                }
                ProcessState::Ready => process.times.wait_ticks += 1,
                _ => {}
            }
        }

        // 9
        self.metrics.record_tick(TickSample {
            ready_len: self.scheduler.ready_count(),
            executed: &active,
            capacity: self.cpu.thread_count(),
        });

        // 10
        self.release_expired();

        span.record_completed(completed);
        Ok(())
    }

    /// Apply runtime changes to pool size, slot count and history length
    fn follow_capacity(&mut self, config: &SimConfig) -> SimResult<()> {
        self.memory.set_capacity(config.system.total_memory);
        self.metrics
            .set_history_capacity(config.simulation.history_capacity);

        for pid in self.cpu.resize(config.cpu.thread_count) {
            let process = self.table.expect_mut(pid)?;
            process.mark_ready();
            self.scheduler.on_process_ready(process);
            debug!(pid, "Slot removed, process returned to ready queue");
        }
        Ok(())
    }

    fn execute_step(&mut self, pid: Pid, config: &SimConfig) -> SimResult<StepOutcome> {
        let now = self.tick;
        let process = self.table.expect_mut(pid)?;
        if !process.is_running() {
            return Err(SimError::InvariantViolation(format!(
                "pid {} holds a CPU slot in state {}",
                pid, process.state
            )));
        }
        process.start_tick.get_or_insert(now);

        let command = match process.current_command {
            Some(command) => command,
            None => {
                let command = generate_command(process, &config.commands, self.rng.as_mut());
                process.current_command = Some(command);
                command
            }
        };

        match command {
            Command::Compute { .. } => match command.execute(&mut process.memory) {
                Ok(_) => {
                    process.current_command = None;
                    Ok(StepOutcome::Stayed)
                }
                Err(e @ SimError::InvalidAddress { .. }) => {
                    warn!(pid, command = %command, error = %e, "Process ended by bad address");
                    self.handle_termination(pid, config)?;
                    Ok(StepOutcome::Terminated)
                }
                Err(e) => Err(e),
            },
            Command::Io { duration } => {
                self.request_io(pid, duration, config)?;
                Ok(StepOutcome::Blocked)
            }
            Command::Exit | Command::Error => {
                debug!(pid, command = %command, "Process ended by command");
                self.handle_termination(pid, config)?;
                Ok(StepOutcome::Terminated)
            }
        }
    }

    fn request_io(&mut self, pid: Pid, duration: u64, config: &SimConfig) -> SimResult<()> {
        if let Some(overheads) = &config.overheads {
            self.charge(pid, Overhead::ContextSwitch, overheads.ctx_active_to_blocked)?;
            self.charge(pid, Overhead::IoInit, overheads.io_init_ticks)?;
        }

        let process = self.table.expect_mut(pid)?;
        process.times.io_busy_ticks += duration;
        process.current_command = None;
        self.cpu.clear_process(pid);
        process.block_on_io();
        self.io.submit(pid, duration)
    }

    fn complete_io(&mut self, pid: Pid, config: &SimConfig) -> SimResult<()> {
        if let Some(overheads) = &config.overheads {
            self.charge(pid, Overhead::IoInterrupt, overheads.io_interrupt_service_ticks)?;
            self.charge(pid, Overhead::ContextSwitch, overheads.ctx_blocked_to_ready)?;
        }

        let process = self.table.expect_mut(pid)?;
        if !process.complete_io() {
            return Err(SimError::InvariantViolation(format!(
                "I/O completed for pid {} in state {}",
                pid, process.state
            )));
        }
        self.scheduler.on_process_ready(process);
        debug!(pid, "I/O completed");
        Ok(())
    }

    /// Retire this tick's instruction and return the process to the ready queue
    ///
    /// Returns `true` when that instruction was its last one; the process is
    /// then terminated instead of requeued.
    fn preempt(&mut self, pid: Pid, config: &SimConfig) -> SimResult<bool> {
        self.cpu.clear_process(pid);
        if self.table.expect_mut(pid)?.advance_program_counter() {
            debug!(pid, "Program finished");
            self.handle_termination(pid, config)?;
            return Ok(true);
        }

        if let Some(overheads) = &config.overheads {
            self.charge(pid, Overhead::ContextSwitch, overheads.ctx_active_to_ready)?;
        }
        let process = self.table.expect_mut(pid)?;
        self.scheduler.on_quantum_expired(process, &config.scheduler);
        Ok(false)
    }

    fn dispatch(&mut self, config: &SimConfig) -> SimResult<()> {
        while self.cpu.has_free_threads() {
            let Some(pid) = self.scheduler.get_next_process_for_cpu() else {
                break;
            };
            if let Some(overheads) = &config.overheads {
                self.charge(pid, Overhead::ContextSwitch, overheads.ctx_ready_to_active)?;
            }

            let process = self.table.expect_mut(pid)?;
            if !process.is_ready() {
                return Err(SimError::InvariantViolation(format!(
                    "pid {} dequeued in state {}",
                    pid, process.state
                )));
            }
            self.cpu.set_process(process)?;
        }
        Ok(())
    }

    /// Terminate a process, schedule its removal and record its figures
    pub(super) fn handle_termination(&mut self, pid: Pid, config: &SimConfig) -> SimResult<Completion> {
        if let Some(overheads) = &config.overheads {
            self.charge(pid, Overhead::Terminate, overheads.terminate_ticks)?;
        }

        let now = self.tick;
        self.cpu.clear_process(pid);
        self.io.remove(pid);
        self.scheduler.on_process_terminated(pid);

        let process = self.table.expect_mut(pid)?;
        process.terminate();
        process.current_command = None;
        process.end_tick = Some(now);

        let arrival = process.arrival_tick.unwrap_or(now);
        let completion = Completion {
            pid,
            turnaround: now.saturating_sub(arrival),
            wait: process.times.wait_ticks,
            service: process.times.run_ticks,
            t_mono: process.mono_time(),
            t_multi: process.multi_time(now).unwrap_or(0),
        };
        self.pending.push(PendingRemoval {
            pid,
            remove_at: now + config.simulation.remove_terminated_after_ticks,
            size: process.memory_size,
        });
        self.metrics.record_completion(&completion);

        debug!(
            pid,
            turnaround = completion.turnaround,
            t_mono = completion.t_mono,
            "Process terminated"
        );
        Ok(completion)
    }

    /// Charge an overhead to `pid`; every other READY process waits as long
    fn charge(&mut self, pid: Pid, kind: Overhead, ticks: u64) -> SimResult<()> {
        if ticks == 0 {
            return Ok(());
        }

        let times = &mut self.table.expect_mut(pid)?.times;
        match kind {
            Overhead::ContextSwitch => times.context_switch_overhead += ticks,
            Overhead::IoInit => times.io_init_overhead += ticks,
            Overhead::IoInterrupt => times.io_interrupt_overhead += ticks,
            Overhead::Terminate => times.terminate_overhead += ticks,
        }

        for other in self.table.iter_mut() {
            if other.pid != pid && other.state == ProcessState::Ready {
                other.times.wait_ticks += ticks;
            }
        }
        Ok(())
    }

    fn release_expired(&mut self) {
        let now = self.tick;
        let (due, keep): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|r| r.remove_at <= now);
        self.pending = keep;

        for removal in due {
            if self.table.remove(removal.pid).is_some() {
                self.memory.free(removal.size);
                debug!(pid = removal.pid, size = removal.size, "Terminated process released");
            }
        }
    }
}
