/*!
 * Metrics Accumulator
 * Running sums sampled once per tick and once per completed process
 */

use crate::core::types::{Pid, Tick};
use ringbuf::{traits::*, HeapRb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final figures of one completed process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub pid: Pid,
    pub turnaround: Tick,
    pub wait: u64,
    pub service: u64,
    pub t_mono: u64,
    pub t_multi: u64,
}

/// Per-tick sample taken at step 9 of the tick protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSample<'a> {
    pub ready_len: usize,
    /// Processes that executed this tick
    pub executed: &'a [Pid],
    /// Slots available this tick
    pub capacity: usize,
}

pub struct Metrics {
    total_ticks: u64,
    busy_slot_ticks: u64,
    capacity_slot_ticks: u64,
    ready_len_sum: u64,
    completed: u64,
    turnaround_sum: u64,
    wait_sum: u64,
    service_sum: u64,
    t_mono_sum: u64,
    t_multi_sum: u64,
    history: HeapRb<Pid>,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("total_ticks", &self.total_ticks)
            .field("busy_slot_ticks", &self.busy_slot_ticks)
            .field("completed", &self.completed)
            .field("history_len", &self.history.occupied_len())
            .finish()
    }
}

impl Metrics {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            total_ticks: 0,
            busy_slot_ticks: 0,
            capacity_slot_ticks: 0,
            ready_len_sum: 0,
            completed: 0,
            turnaround_sum: 0,
            wait_sum: 0,
            service_sum: 0,
            t_mono_sum: 0,
            t_multi_sum: 0,
            history: HeapRb::new(history_capacity.max(1)),
        }
    }

    pub fn record_tick(&mut self, sample: TickSample<'_>) {
        self.total_ticks += 1;
        self.ready_len_sum += sample.ready_len as u64;
        self.busy_slot_ticks += sample.executed.len().min(sample.capacity) as u64;
        self.capacity_slot_ticks += sample.capacity as u64;
        for &pid in sample.executed {
            self.history.push_overwrite(pid);
        }
    }

    pub fn record_completion(&mut self, completion: &Completion) {
        self.completed += 1;
        self.turnaround_sum += completion.turnaround;
        self.wait_sum += completion.wait;
        self.service_sum += completion.service;
        self.t_mono_sum += completion.t_mono;
        self.t_multi_sum += completion.t_multi;
    }

    /// Change the history length, keeping the newest entries
    pub fn set_history_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        if capacity == self.history.capacity().get() {
            return;
        }
        let mut history = HeapRb::new(capacity);
        for &pid in self.history.iter() {
            history.push_overwrite(pid);
        }
        self.history = history;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.history.capacity().get());
    }

    #[inline]
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    #[inline]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    #[inline]
    pub fn busy_slot_ticks(&self) -> u64 {
        self.busy_slot_ticks
    }

    /// Busy slot-ticks over available slot-ticks, in `[0, 1]`
    pub fn utilization(&self) -> f64 {
        ratio(self.busy_slot_ticks, self.capacity_slot_ticks)
    }

    pub fn avg_ready_len(&self) -> f64 {
        ratio(self.ready_len_sum, self.total_ticks)
    }

    /// Completions per tick
    pub fn throughput(&self) -> f64 {
        ratio(self.completed, self.total_ticks)
    }

    pub fn avg_turnaround(&self) -> f64 {
        ratio(self.turnaround_sum, self.completed)
    }

    pub fn avg_wait(&self) -> f64 {
        ratio(self.wait_sum, self.completed)
    }

    pub fn avg_service(&self) -> f64 {
        ratio(self.service_sum, self.completed)
    }

    pub fn avg_t_mono(&self) -> f64 {
        ratio(self.t_mono_sum, self.completed)
    }

    pub fn avg_t_multi(&self) -> f64 {
        ratio(self.t_multi_sum, self.completed)
    }

    /// Recently executed pids, oldest first
    pub fn history(&self) -> Vec<Pid> {
        self.history.iter().copied().collect()
    }
}

#[inline]
fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
