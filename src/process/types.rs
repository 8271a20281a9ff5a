/*!
 * Process Types
 * Process control block, lifecycle states and per-phase time counters
 */

use super::command::Command;
use crate::core::types::{Pid, Priority, Size, Tick};
use crate::memory::ProcessMemory;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process state
///
/// `Loading`, `BlockedMem` and `Suspended` are representable but the tick
/// protocol never enters them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    /// Created by the job generator, not yet admitted
    New,
    Loading,
    /// Waiting in the ready queue
    Ready,
    /// Holding a CPU slot
    Running,
    /// Waiting in the I/O subsystem
    BlockedIo,
    BlockedMem,
    Suspended,
    Terminated,
}

impl ProcessState {
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProcessState::New => "NEW",
            ProcessState::Loading => "LOADING",
            ProcessState::Ready => "READY",
            ProcessState::Running => "RUNNING",
            ProcessState::BlockedIo => "BLOCKED_IO",
            ProcessState::BlockedMem => "BLOCKED_MEM",
            ProcessState::Suspended => "SUSPENDED",
            ProcessState::Terminated => "TERMINATED",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated per-phase counters, in ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessTimes {
    pub run_ticks: u64,
    pub wait_ticks: u64,
    pub blocked_ticks: u64,
    /// Sum of requested I/O durations
    pub io_busy_ticks: u64,
    pub context_switch_overhead: u64,
    pub io_init_overhead: u64,
    pub io_interrupt_overhead: u64,
    pub load_overhead: u64,
    pub terminate_overhead: u64,
}

impl ProcessTimes {
    /// All OS overhead charged to this process
    #[inline]
    #[must_use]
    pub const fn total_overhead(&self) -> u64 {
        self.context_switch_overhead
            + self.io_init_overhead
            + self.io_interrupt_overhead
            + self.load_overhead
            + self.terminate_overhead
    }
}

/// Simulated process
#[derive(Debug, Clone)]
pub struct Process {
    pub(crate) pid: Pid,
    pub(crate) memory_size: Size,
    pub(crate) total_instructions: u64,
    pub(crate) state: ProcessState,
    pub(crate) pc: u64,
    pub(crate) base_priority: Priority,
    pub(crate) dynamic_priority: Priority,
    pub(crate) memory: ProcessMemory,
    pub(crate) current_command: Option<Command>,
    /// Ticks executed since the current dispatch
    pub(crate) slice_ticks: u64,
    pub(crate) times: ProcessTimes,
    pub(crate) arrival_tick: Option<Tick>,
    pub(crate) start_tick: Option<Tick>,
    pub(crate) end_tick: Option<Tick>,
}

impl Process {
    #[must_use]
    pub fn new(pid: Pid, memory_size: Size, total_instructions: u64, base_priority: Priority) -> Self {
        Self {
            pid,
            memory_size,
            total_instructions,
            state: ProcessState::New,
            pc: 0,
            base_priority,
            dynamic_priority: base_priority,
            memory: ProcessMemory::new(memory_size),
            current_command: None,
            slice_ticks: 0,
            times: ProcessTimes::default(),
            arrival_tick: None,
            start_tick: None,
            end_tick: None,
        }
    }

    #[inline(always)]
    pub fn pid(&self) -> Pid {
        self.pid
    }

    #[inline(always)]
    pub fn state(&self) -> ProcessState {
        self.state
    }

    #[inline]
    pub fn memory_size(&self) -> Size {
        self.memory_size
    }

    #[inline]
    pub fn total_instructions(&self) -> u64 {
        self.total_instructions
    }

    #[inline(always)]
    pub fn pc(&self) -> u64 {
        self.pc
    }

    #[inline]
    pub fn base_priority(&self) -> Priority {
        self.base_priority
    }

    #[inline(always)]
    pub fn dynamic_priority(&self) -> Priority {
        self.dynamic_priority
    }

    #[inline]
    pub fn memory(&self) -> &ProcessMemory {
        &self.memory
    }

    #[inline]
    pub fn current_command(&self) -> Option<&Command> {
        self.current_command.as_ref()
    }

    #[inline]
    pub fn slice_ticks(&self) -> u64 {
        self.slice_ticks
    }

    #[inline]
    pub fn times(&self) -> &ProcessTimes {
        &self.times
    }

    #[inline]
    pub fn arrival_tick(&self) -> Option<Tick> {
        self.arrival_tick
    }

    #[inline]
    pub fn start_tick(&self) -> Option<Tick> {
        self.start_tick
    }

    #[inline]
    pub fn end_tick(&self) -> Option<Tick> {
        self.end_tick
    }

    /// Description of the in-flight command, empty when none
    pub fn current_command_description(&self) -> String {
        self.current_command
            .as_ref()
            .map(Command::description)
            .unwrap_or_default()
    }

    /// Time to run this process alone: its program, its I/O, and every OS
    /// overhead it was charged
    #[must_use]
    pub fn mono_time(&self) -> u64 {
        self.total_instructions + self.times.io_busy_ticks + self.times.total_overhead()
    }

    /// Wall ticks from admission to termination (or to `now` while alive)
    #[must_use]
    pub fn multi_time(&self, now: Tick) -> Option<u64> {
        let arrival = self.arrival_tick?;
        Some(self.end_tick.unwrap_or(now).saturating_sub(arrival))
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            pid: self.pid,
            state: self.state,
            pc: self.pc,
            total_instructions: self.total_instructions,
            memory_size: self.memory_size,
            base_priority: self.base_priority,
            dynamic_priority: self.dynamic_priority,
            times: self.times,
            arrival_tick: self.arrival_tick,
            start_tick: self.start_tick,
            end_tick: self.end_tick,
            command: self.current_command_description(),
        }
    }
}

/// Read-only row of the process table report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSnapshot {
    pub pid: Pid,
    pub state: ProcessState,
    pub pc: u64,
    pub total_instructions: u64,
    pub memory_size: Size,
    pub base_priority: Priority,
    pub dynamic_priority: Priority,
    pub times: ProcessTimes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_tick: Option<Tick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_tick: Option<Tick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_tick: Option<Tick>,
    pub command: String,
}
