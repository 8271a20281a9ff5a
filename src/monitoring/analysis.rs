/*!
 * Performance Analysis
 *
 * Derived reports: aggregate system parameters, the mono-vs-multi comparison
 * and the per-process time breakdown.
 *
 * `T_mono` models a process run alone: instructions, I/O busy time and every
 * OS overhead it was charged. `T_multi` is its wall turnaround. Dividing the
 * elapsed ticks by the average `T_mono` gives the completions a serial system
 * could have managed; the actual completions relative to that figure is the
 * multiplexing efficiency.
 */

use super::metrics::Metrics;
use crate::core::types::{Pid, Tick};
use crate::process::{ProcessState, ProcessTable};
use serde::{Deserialize, Serialize};

/// Aggregate system parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SystemReport {
    pub current_tick: Tick,
    /// Percent of slot capacity used
    pub cpu_utilization: f64,
    pub avg_ready_len: f64,
    pub completed: u64,
    pub avg_wait: f64,
    pub avg_turnaround: f64,
    pub avg_service: f64,
    /// Completions per tick
    pub throughput: f64,
    pub avg_run_ticks: f64,
    pub avg_blocked_ticks: f64,
    pub recent_pids: Vec<Pid>,
}

/// Mono-program vs multiplexed comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PerformanceReport {
    pub total_ticks: u64,
    pub completed: u64,
    pub avg_t_mono: f64,
    pub avg_t_multi: f64,
    /// Completions a non-multiplexed system could have finished
    pub mono_possible: f64,
    /// `None` until at least one process completed
    pub performance_percent: Option<f64>,
}

/// One row of the per-process time breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TimeBreakdown {
    pub pid: Pid,
    pub state: ProcessState,
    pub instructions: u64,
    pub run_ticks: u64,
    pub wait_ticks: u64,
    pub blocked_ticks: u64,
    pub io_busy_ticks: u64,
    pub context_switch_overhead: u64,
    pub io_overhead: u64,
    pub load_overhead: u64,
    pub terminate_overhead: u64,
    pub t_mono: u64,
    pub t_multi: Option<u64>,
}

pub fn system_report(metrics: &Metrics, table: &ProcessTable, now: Tick) -> SystemReport {
    let (run, blocked) = table.iter().fold((0u64, 0u64), |(r, b), p| {
        (r + p.times().run_ticks, b + p.times().blocked_ticks)
    });
    let n = table.len().max(1) as f64;

    SystemReport {
        current_tick: now,
        cpu_utilization: metrics.utilization() * 100.0,
        avg_ready_len: metrics.avg_ready_len(),
        completed: metrics.completed(),
        avg_wait: metrics.avg_wait(),
        avg_turnaround: metrics.avg_turnaround(),
        avg_service: metrics.avg_service(),
        throughput: metrics.throughput(),
        avg_run_ticks: if table.is_empty() { 0.0 } else { run as f64 / n },
        avg_blocked_ticks: if table.is_empty() { 0.0 } else { blocked as f64 / n },
        recent_pids: metrics.history(),
    }
}

pub fn performance_report(metrics: &Metrics) -> PerformanceReport {
    let avg_t_mono = metrics.avg_t_mono();
    let mono_possible = if avg_t_mono > 0.0 {
        metrics.total_ticks() as f64 / avg_t_mono
    } else {
        0.0
    };
    let performance_percent = (metrics.completed() > 0 && mono_possible > 0.0)
        .then(|| metrics.completed() as f64 / mono_possible * 100.0);

    PerformanceReport {
        total_ticks: metrics.total_ticks(),
        completed: metrics.completed(),
        avg_t_mono,
        avg_t_multi: metrics.avg_t_multi(),
        mono_possible,
        performance_percent,
    }
}

/// Breakdown rows ordered by pid
pub fn time_breakdown(table: &ProcessTable, now: Tick) -> Vec<TimeBreakdown> {
    let mut rows: Vec<TimeBreakdown> = table
        .iter()
        .map(|p| {
            let t = p.times();
            TimeBreakdown {
                pid: p.pid(),
                state: p.state(),
                instructions: p.total_instructions(),
                run_ticks: t.run_ticks,
                wait_ticks: t.wait_ticks,
                blocked_ticks: t.blocked_ticks,
                io_busy_ticks: t.io_busy_ticks,
                context_switch_overhead: t.context_switch_overhead,
                io_overhead: t.io_init_overhead + t.io_interrupt_overhead,
                load_overhead: t.load_overhead,
                terminate_overhead: t.terminate_overhead,
                t_mono: p.mono_time(),
                t_multi: p.multi_time(now),
            }
        })
        .collect();
    rows.sort_by_key(|r| r.pid);
    rows
}
