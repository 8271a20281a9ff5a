/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Address, Pid, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Simulator operation result
///
/// # Must Use
/// Admission and removal decisions belong to the caller and must be handled
pub type SimResult<T> = Result<T, SimError>;

/// Which bounded resource refused a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityKind {
    ProcessTable,
    CpuSlots,
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityKind::ProcessTable => write!(f, "process table"),
            CapacityKind::CpuSlots => write!(f, "CPU slots"),
        }
    }
}

/// Simulator errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SimError {
    #[error("Capacity exceeded: {resource} is full (limit {limit})")]
    #[diagnostic(
        code(sim::capacity_exceeded),
        help("Wait for processes to terminate or raise the configured limit.")
    )]
    CapacityExceeded { resource: CapacityKind, limit: usize },

    #[error("Insufficient memory: requested {requested} words, {available} available")]
    #[diagnostic(
        code(sim::insufficient_memory),
        help("Retry with a smaller process or wait for terminated processes to be released.")
    )]
    InsufficientMemory { requested: Size, available: Size },

    #[error("Process {0} not found")]
    #[diagnostic(
        code(sim::not_found),
        help("The process may have been released already or never existed.")
    )]
    NotFound(Pid),

    #[error("Process {0} already exists")]
    #[diagnostic(
        code(sim::already_exists),
        help("Pids are unique; create a fresh process from the job generator.")
    )]
    AlreadyExists(Pid),

    #[error("Process {pid} rejected: {reason}")]
    #[diagnostic(
        code(sim::invalid_process),
        help("Processes need at least one memory word and one instruction.")
    )]
    InvalidProcess { pid: Pid, reason: String },

    #[error("Invalid address {address} for memory of {size} words")]
    #[diagnostic(
        code(sim::invalid_address),
        help("Operand and result addresses must fall inside the process's own memory.")
    )]
    InvalidAddress { address: Address, size: Size },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(sim::invalid_config),
        help("Review the configuration values; ranges must be ordered and probabilities within [0, 1].")
    )]
    InvalidConfig(String),

    #[error("Invariant violation: {0}")]
    #[diagnostic(
        code(sim::invariant_violation),
        help("The simulation state is inconsistent. Reset the simulation and report this issue.")
    )]
    InvariantViolation(String),

    #[error("Simulation faulted during an earlier tick")]
    #[diagnostic(
        code(sim::faulted),
        help("Call reset() before ticking again.")
    )]
    Faulted,
}

impl SimError {
    /// True for errors that leave the simulation unusable until reset
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, SimError::InvariantViolation(_) | SimError::Faulted)
    }
}
