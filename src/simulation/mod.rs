/*!
 * Simulation Context
 *
 * Owns every component of one simulated machine and drives them through the
 * per-tick protocol. Independent instances share nothing; randomness is
 * injected so runs can be reproduced exactly.
 *
 * Callers must serialize `tick()`, admission and removal. The paced driver
 * does so by holding the context behind a mutex.
 */

mod admission;
mod driver;
mod reporting;
mod tick;

pub use driver::SimulationDriver;

use crate::core::config::{SharedConfig, SimConfig};
use crate::core::errors::{SimError, SimResult};
use crate::core::random::{RandomSource, SeededRandom};
use crate::core::types::{Pid, Size, Tick};
use crate::cpu::Cpu;
use crate::io::IoSubsystem;
use crate::memory::MemoryManager;
use crate::monitoring::{generate_run_id, Metrics};
use crate::process::{JobGenerator, Process, ProcessState, ProcessTable};
use crate::scheduler::Scheduler;
use std::fmt;
use tracing::info;

/// Terminated process waiting out its retention window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRemoval {
    pid: Pid,
    remove_at: Tick,
    size: Size,
}

pub struct Simulation {
    config: SharedConfig,
    rng: Box<dyn RandomSource>,
    table: ProcessTable,
    memory: MemoryManager,
    scheduler: Scheduler,
    cpu: Cpu,
    io: IoSubsystem,
    jobs: JobGenerator,
    metrics: Metrics,
    pending: Vec<PendingRemoval>,
    tick: Tick,
    run_id: String,
    faulted: bool,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("run_id", &self.run_id)
            .field("tick", &self.tick)
            .field("processes", &self.table.len())
            .field("ready", &self.scheduler.ready_count())
            .field("faulted", &self.faulted)
            .finish()
    }
}

impl Simulation {
    /// Simulation seeded from OS entropy
    pub fn new(config: SimConfig) -> SimResult<Self> {
        Self::with_random(config.into_shared(), Box::new(SeededRandom::from_entropy()))
    }

    /// Reproducible simulation
    pub fn with_seed(config: SimConfig, seed: u64) -> SimResult<Self> {
        Self::with_random(config.into_shared(), Box::new(SeededRandom::from_seed(seed)))
    }

    /// Simulation over a caller-owned config handle and random source
    pub fn with_random(config: SharedConfig, rng: Box<dyn RandomSource>) -> SimResult<Self> {
        let snapshot = config.read().clone();
        snapshot.validate()?;

        let run_id = generate_run_id();
        info!(
            run_id = %run_id,
            memory = snapshot.system.total_memory,
            threads = snapshot.cpu.thread_count,
            max_processes = snapshot.system.max_processes,
            "Simulation created"
        );

        Ok(Self {
            rng,
            table: ProcessTable::new(),
            memory: MemoryManager::new(snapshot.system.total_memory),
            scheduler: Scheduler::new(),
            cpu: Cpu::new(snapshot.cpu.thread_count),
            io: IoSubsystem::new(),
            jobs: JobGenerator::new(),
            metrics: Metrics::new(snapshot.simulation.history_capacity),
            pending: Vec::new(),
            tick: 0,
            run_id,
            faulted: false,
            config,
        })
    }

    /// Live configuration; changes apply from the next tick or admission
    pub fn config_handle(&self) -> SharedConfig {
        self.config.clone()
    }

    /// Current configuration values
    pub fn config(&self) -> SimConfig {
        self.config.read().clone()
    }

    #[inline]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    #[inline]
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// New process with a fresh pid, priority clamped into the configured range
    ///
    /// The process is not admitted; pass it to `load_process`. Fails with
    /// `InvalidConfig` when the live configuration no longer validates.
    pub fn create_process(
        &mut self,
        memory_size: Size,
        total_instructions: u64,
        base_priority: u8,
    ) -> SimResult<Process> {
        let config = self.config.read().clone();
        config.validate()?;
        let priority = config.scheduler.clamp_priority(base_priority);
        Ok(self.jobs.create(memory_size, total_instructions, priority))
    }

    /// Random process drawn from the generator ranges
    pub fn generate_process(&mut self) -> Process {
        let config = self.config.read();
        self.jobs
            .generate(&config.generator, &config.scheduler, self.rng.as_mut())
    }

    /// Drop all processes and statistics and clear the fault flag
    ///
    /// Pids keep counting up.
    pub fn reset(&mut self) {
        let config = self.config.read().clone();
        self.table.clear();
        self.scheduler.clear();
        self.cpu = Cpu::new(config.cpu.thread_count);
        self.io.clear();
        self.pending.clear();
        self.memory = MemoryManager::new(config.system.total_memory);
        self.metrics = Metrics::new(config.simulation.history_capacity);
        self.tick = 0;
        self.faulted = false;
        info!(run_id = %self.run_id, "Simulation reset");
    }

    /// Check the structural invariants of the current state
    ///
    /// - every live process is in exactly one of ready queue, CPU slot, I/O
    /// - terminated processes are in none of them
    /// - pool usage equals the memory of all resident processes
    /// - dynamic priorities stay inside the configured bounds
    pub fn verify_invariants(&self) -> SimResult<()> {
        let config = self.config.read();
        let (min, max) = (config.scheduler.min_priority, config.scheduler.max_priority);

        for process in self.table.iter() {
            let pid = process.pid();
            let places = [
                self.scheduler.contains(pid),
                self.cpu.contains(pid),
                self.io.contains(pid),
            ];
            let owners = places.iter().filter(|&&p| p).count();
            let expected = match process.state() {
                ProcessState::Terminated => 0,
                _ => 1,
            };
            if owners != expected {
                return Err(SimError::InvariantViolation(format!(
                    "pid {} in state {} has {} owners (ready={}, cpu={}, io={})",
                    pid, process.state(), owners, places[0], places[1], places[2]
                )));
            }

            let consistent = match process.state() {
                ProcessState::Ready => places[0],
                ProcessState::Running => places[1],
                ProcessState::BlockedIo => places[2],
                _ => true,
            };
            if !consistent {
                return Err(SimError::InvariantViolation(format!(
                    "pid {} in state {} is held by the wrong component",
                    pid,
                    process.state()
                )));
            }

            let priority = process.dynamic_priority();
            if priority < min || priority > max {
                return Err(SimError::InvariantViolation(format!(
                    "pid {} priority {} outside {}..={}",
                    pid, priority, min, max
                )));
            }
        }

        let resident = self.table.resident_memory();
        if resident != self.memory.used() {
            return Err(SimError::InvariantViolation(format!(
                "pool reports {} words used, resident processes hold {}",
                self.memory.used(),
                resident
            )));
        }
        Ok(())
    }
}
