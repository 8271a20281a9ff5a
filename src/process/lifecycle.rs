/*!
 * Process Lifecycle
 *
 * State transitions of a single process. Transitions are guard-based: an
 * illegal request leaves the process untouched and reports `false` instead of
 * failing, so callers can apply them unconditionally.
 *
 * ```text
 * NEW ──admit──▶ READY ──dispatch──▶ RUNNING ──quantum──▶ READY
 *                  ▲                   │
 *                  └──io done── BLOCKED_IO ◀──io request──┘
 *                  any ──exit/error/pc end/forced──▶ TERMINATED
 * ```
 */

use super::types::{Process, ProcessState};
use crate::core::types::Priority;

impl Process {
    /// Advance one instruction slot
    ///
    /// Reaching the end of the program terminates the process even while a
    /// command is in flight. Returns `true` if this advance terminated it.
    pub fn advance_program_counter(&mut self) -> bool {
        if self.state == ProcessState::Terminated {
            return false;
        }

        self.pc += 1;
        self.slice_ticks += 1;

        if self.has_finished_program() {
            self.state = ProcessState::Terminated;
            return true;
        }
        false
    }

    /// NEW/LOADING/SUSPENDED/RUNNING/READY → READY
    pub fn mark_ready(&mut self) -> bool {
        match self.state {
            ProcessState::New
            | ProcessState::Loading
            | ProcessState::Suspended
            | ProcessState::Running
            | ProcessState::Ready => {
                self.state = ProcessState::Ready;
                true
            }
            _ => false,
        }
    }

    /// READY → RUNNING, starting a new dispatch period
    pub fn mark_running(&mut self) -> bool {
        if self.state != ProcessState::Ready {
            return false;
        }
        self.state = ProcessState::Running;
        self.slice_ticks = 0;
        true
    }

    /// RUNNING → BLOCKED_IO
    pub fn block_on_io(&mut self) -> bool {
        if self.state != ProcessState::Running {
            return false;
        }
        self.state = ProcessState::BlockedIo;
        true
    }

    /// BLOCKED_IO → READY
    pub fn complete_io(&mut self) -> bool {
        if self.state != ProcessState::BlockedIo {
            return false;
        }
        self.state = ProcessState::Ready;
        true
    }

    /// Any state → TERMINATED
    pub fn terminate(&mut self) {
        self.state = ProcessState::Terminated;
    }

    /// Raise the dynamic priority, saturating at `max_priority`
    pub fn apply_aging(&mut self, step: Priority, max_priority: Priority) {
        self.dynamic_priority = self.dynamic_priority.saturating_add(step).min(max_priority);
    }

    /// Lower the dynamic priority, saturating at `min_priority`
    pub fn apply_run_penalty(&mut self, step: Priority, min_priority: Priority) {
        self.dynamic_priority = self.dynamic_priority.saturating_sub(step).max(min_priority);
    }

    #[inline(always)]
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    #[inline(always)]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == ProcessState::Running
    }

    #[inline(always)]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == ProcessState::Ready
    }

    /// `pc` reached the program length
    #[inline]
    #[must_use]
    pub fn has_finished_program(&self) -> bool {
        self.pc >= self.total_instructions
    }

    /// The next instruction is the last one
    #[inline]
    #[must_use]
    pub fn at_last_instruction(&self) -> bool {
        self.pc.saturating_add(1) >= self.total_instructions
    }
}
