/*!
 * I/O Subsystem
 *
 * Holds BLOCKED_IO processes and counts their requests down, one tick per
 * advance. A request submitted during a tick is staged and starts counting at
 * the next advance, so a request of duration `d` keeps its process blocked for
 * exactly `d` ticks.
 */

use crate::core::errors::{SimError, SimResult};
use crate::core::types::Pid;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// In-flight request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoRequest {
    pub pid: Pid,
    pub duration: u64,
    pub remaining: u64,
}

/// Finished request, reported in submission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoCompletion {
    pub pid: Pid,
    pub duration: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoStats {
    pub submitted: u64,
    pub completed: u64,
    pub pending: usize,
}

#[derive(Debug, Clone, Default)]
pub struct IoSubsystem {
    queue: VecDeque<IoRequest>,
    // Submitted this tick, not yet counting
    incoming: Vec<IoRequest>,
    submitted: u64,
    completed: u64,
}

impl IoSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request for a process that just blocked
    ///
    /// A zero duration is treated as one tick.
    pub fn submit(&mut self, pid: Pid, duration: u64) -> SimResult<()> {
        if self.contains(pid) {
            return Err(SimError::AlreadyExists(pid));
        }
        let duration = duration.max(1);
        self.incoming.push(IoRequest {
            pid,
            duration,
            remaining: duration,
        });
        self.submitted += 1;
        debug!(pid, duration, "I/O request submitted");
        Ok(())
    }

    /// Count every in-flight request down by one tick
    ///
    /// Returns the requests that finished, oldest first, then starts counting
    /// the ones staged since the previous advance.
    pub fn tick(&mut self) -> Vec<IoCompletion> {
        let mut done = Vec::new();
        self.queue.retain_mut(|req| {
            req.remaining = req.remaining.saturating_sub(1);
            if req.remaining == 0 {
                done.push(IoCompletion {
                    pid: req.pid,
                    duration: req.duration,
                });
                false
            } else {
                true
            }
        });
        self.queue.extend(self.incoming.drain(..));

        self.completed += done.len() as u64;
        if !done.is_empty() {
            debug!(count = done.len(), "I/O requests completed");
        }
        done
    }

    /// Drop the request of a forcibly removed process
    pub fn remove(&mut self, pid: Pid) -> bool {
        let before = self.pending_count();
        self.queue.retain(|r| r.pid != pid);
        self.incoming.retain(|r| r.pid != pid);
        before != self.pending_count()
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.queue.iter().chain(self.incoming.iter()).any(|r| r.pid == pid)
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.queue.len() + self.incoming.len()
    }

    /// Blocked pids in submission order
    pub fn pending_pids(&self) -> Vec<Pid> {
        self.queue
            .iter()
            .chain(self.incoming.iter())
            .map(|r| r.pid)
            .collect()
    }

    pub fn stats(&self) -> IoStats {
        IoStats {
            submitted: self.submitted,
            completed: self.completed,
            pending: self.pending_count(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
