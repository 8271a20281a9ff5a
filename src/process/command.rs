/*!
 * Commands
 * Synthetic instructions and their execution against private memory
 */

use crate::core::errors::SimResult;
use crate::core::types::{Address, Word};
use crate::memory::ProcessMemory;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Arithmetic operation of a COMPUTE command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
    Cmp,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Add,
        Operation::Sub,
        Operation::Mul,
        Operation::Div,
        Operation::Cmp,
    ];

    /// Evaluate over two words
    ///
    /// Arithmetic wraps; DIV truncates toward zero and yields 0 on a zero
    /// divisor; CMP yields -1, 0 or 1.
    #[must_use]
    pub fn apply(self, a: Word, b: Word) -> Word {
        match self {
            Operation::Add => a.wrapping_add(b),
            Operation::Sub => a.wrapping_sub(b),
            Operation::Mul => a.wrapping_mul(b),
            Operation::Div => {
                if b == 0 {
                    0
                } else {
                    a.wrapping_div(b)
                }
            }
            Operation::Cmp => match a.cmp(&b) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            },
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "ADD",
            Operation::Sub => "SUB",
            Operation::Mul => "MUL",
            Operation::Div => "DIV",
            Operation::Cmp => "CMP",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command tag, for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandKind {
    Compute,
    Io,
    Exit,
    Error,
}

/// One synthetic instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// `memory[dst] = op(memory[lhs], memory[rhs])`
    Compute {
        op: Operation,
        lhs: Address,
        rhs: Address,
        dst: Address,
    },
    /// Block on a device for `duration` ticks
    Io { duration: u64 },
    Exit,
    Error,
}

impl Command {
    #[inline]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Command::Compute { .. } => CommandKind::Compute,
            Command::Io { .. } => CommandKind::Io,
            Command::Exit => CommandKind::Exit,
            Command::Error => CommandKind::Error,
        }
    }

    /// EXIT and ERROR end the process
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Command::Exit | Command::Error)
    }

    /// Execute a COMPUTE command; other kinds have no memory effect
    ///
    /// Returns the stored result. Addresses are checked before anything is
    /// written, so a failed command leaves memory untouched.
    pub fn execute(&self, memory: &mut ProcessMemory) -> SimResult<Option<Word>> {
        let Command::Compute { op, lhs, rhs, dst } = *self else {
            return Ok(None);
        };

        let a = memory.read(lhs)?;
        let b = memory.read(rhs)?;
        let result = op.apply(a, b);
        memory.write(dst, result)?;
        Ok(Some(result))
    }

    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Compute { op, lhs, rhs, dst } => {
                write!(f, "COMPUTE:{} [{},{}] -> {}", op, lhs, rhs, dst)
            }
            Command::Io { duration } => write!(f, "IO({})", duration),
            Command::Exit => f.write_str("EXIT"),
            Command::Error => f.write_str("ERROR"),
        }
    }
}
