/*!
 * Accounting, Removal and Runtime Configuration
 */

use os_sim_kernel::core::OverheadConfig;
use os_sim_kernel::{Pid, ProcessState, SimConfig, SimError, Simulation};
use pretty_assertions::assert_eq;

fn quiet_config(threads: usize) -> SimConfig {
    let mut config = SimConfig::default();
    config.cpu.thread_count = threads;
    config.scheduler.quantum = 1000;
    config.scheduler.aging_interval_ticks = 1000;
    config.commands.io_prob = 0.0;
    config.commands.error_prob = 0.0;
    config.overheads = None;
    config
}

fn admit(sim: &mut Simulation, memory: usize, instructions: u64, priority: u8) -> Pid {
    let process = sim.create_process(memory, instructions, priority).unwrap();
    sim.load_process(Some(process)).unwrap()
}

#[test]
fn test_dispatch_overhead_is_shared_with_waiters() {
    let mut config = quiet_config(1);
    config.overheads = Some(OverheadConfig::default());
    let mut sim = Simulation::with_seed(config, 1).unwrap();
    let a = admit(&mut sim, 8, 100, 6);
    let b = admit(&mut sim, 8, 100, 5);

    assert_eq!(sim.process(a).unwrap().times().load_overhead, 2);
    assert_eq!(sim.process(b).unwrap().times().wait_ticks, 0);

    sim.tick().unwrap();
    let ta = *sim.process(a).unwrap().times();
    let tb = *sim.process(b).unwrap().times();
    assert_eq!(ta.context_switch_overhead, 1);
    assert_eq!(ta.wait_ticks, 0);
    assert_eq!(ta.run_ticks, 1);
    // One tick of dispatch overhead plus one tick spent waiting
    assert_eq!(tb.wait_ticks, 2);
    assert_eq!(tb.context_switch_overhead, 0);
}

#[test]
fn test_io_overheads_charged() {
    let mut config = quiet_config(1);
    config.overheads = Some(OverheadConfig::default());
    config.commands.io_prob = 1.0;
    config.commands.io_min_ticks = 1;
    config.commands.io_max_ticks = 1;
    let mut sim = Simulation::with_seed(config, 1).unwrap();
    let a = admit(&mut sim, 8, 100, 5);

    // Dispatch, request, completion
    sim.run(3).unwrap();
    let t = *sim.process(a).unwrap().times();
    assert_eq!(t.io_init_overhead, 1);
    assert_eq!(t.io_interrupt_overhead, 1);
    // ready->active twice, active->blocked, blocked->ready
    assert_eq!(t.context_switch_overhead, 4);
    assert_eq!(t.io_busy_ticks, 1);
}

#[test]
fn test_mono_time_of_completed_process() {
    let mut config = quiet_config(1);
    config.overheads = Some(OverheadConfig::default());
    let mut sim = Simulation::with_seed(config, 4).unwrap();
    let a = admit(&mut sim, 8, 10, 5);

    sim.run(11).unwrap();
    let pa = sim.process(a).unwrap();
    assert!(pa.is_terminated());
    // 10 instructions + load 2 + dispatch 1 + terminate 1
    assert_eq!(pa.mono_time(), 14);
    assert_eq!(pa.multi_time(sim.current_tick()), Some(11));

    let report = sim.performance_report();
    assert_eq!(report.completed, 1);
    assert!((report.avg_t_mono - 14.0).abs() < 1e-9);
    assert!((report.avg_t_multi - 11.0).abs() < 1e-9);
    assert!(report.performance_percent.is_some());
}

#[test]
fn test_remove_unknown_pid() {
    let mut sim = Simulation::with_seed(quiet_config(1), 1).unwrap();
    assert_eq!(sim.remove_process_by_pid(42), Err(SimError::NotFound(42)));
}

#[test]
fn test_forced_removal_frees_memory_at_once() {
    let mut sim = Simulation::with_seed(quiet_config(1), 1).unwrap();
    let a = admit(&mut sim, 12, 100, 6);
    let b = admit(&mut sim, 8, 100, 5);
    sim.run(2).unwrap();

    sim.remove_process_by_pid(a).unwrap();
    assert!(sim.process(a).is_none());
    assert!(sim.running_pids().is_empty());
    assert_eq!(sim.memory_stats().used_memory, 8);
    assert_eq!(sim.performance_report().completed, 1);
    sim.verify_invariants().unwrap();

    // The freed slot is refilled on the next tick
    sim.tick().unwrap();
    assert_eq!(sim.running_pids(), vec![b]);
}

#[test]
fn test_forced_removal_of_terminated_process_counts_once() {
    let mut config = quiet_config(1);
    config.commands.error_prob = 1.0;
    let mut sim = Simulation::with_seed(config, 1).unwrap();
    let a = admit(&mut sim, 8, 100, 5);
    sim.run(2).unwrap();
    assert_eq!(sim.process(a).unwrap().state(), ProcessState::Terminated);

    sim.remove_process_by_pid(a).unwrap();
    assert_eq!(sim.performance_report().completed, 1);
    assert_eq!(sim.memory_stats().used_memory, 0);

    // No second release when the retention window would have ended
    sim.run(15).unwrap();
    assert_eq!(sim.memory_stats().used_memory, 0);
}

#[test]
fn test_reset_keeps_pid_sequence() {
    let mut sim = Simulation::with_seed(quiet_config(2), 1).unwrap();
    let first = admit(&mut sim, 8, 100, 5);
    sim.run(5).unwrap();

    sim.reset();
    assert_eq!(sim.current_tick(), 0);
    assert_eq!(sim.process_count(), 0);
    assert_eq!(sim.memory_stats().used_memory, 0);
    assert_eq!(sim.performance_report().total_ticks, 0);

    let next = admit(&mut sim, 8, 100, 5);
    assert!(next > first);
}

#[test]
fn test_thread_count_change_applies_next_tick() {
    let mut sim = Simulation::with_seed(quiet_config(2), 1).unwrap();
    let a = admit(&mut sim, 8, 100, 5);
    let b = admit(&mut sim, 8, 100, 5);
    sim.tick().unwrap();
    assert_eq!(sim.running_pids(), vec![a, b]);

    sim.config_handle().write().cpu.thread_count = 1;
    sim.tick().unwrap();

    assert_eq!(sim.running_pids().len(), 1);
    assert_eq!(sim.ready_pids().len(), 1);
    sim.verify_invariants().unwrap();

    // Evicted without a penalty
    for pid in [a, b] {
        assert_eq!(sim.process(pid).unwrap().dynamic_priority(), 5);
    }
}

#[test]
fn test_memory_shrink_refuses_new_admissions_only() {
    let mut sim = Simulation::with_seed(quiet_config(1), 1).unwrap();
    admit(&mut sim, 100, 100, 5);

    sim.config_handle().write().system.total_memory = 50;
    sim.tick().unwrap();

    let stats = sim.memory_stats();
    assert_eq!(stats.used_memory, 100);
    assert_eq!(stats.available_memory, 0);
    assert_eq!(sim.process_count(), 1);

    let process = sim.create_process(1, 10, 5).unwrap();
    assert_eq!(
        sim.load_process(Some(process)),
        Err(SimError::InsufficientMemory {
            requested: 1,
            available: 0
        })
    );
}

#[test]
fn test_initial_load_respects_limits() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 21).unwrap();
    let admitted = sim.initial_load();

    assert!(!admitted.is_empty());
    assert!(admitted.len() <= 32);
    assert_eq!(admitted.len(), sim.process_count());
    assert!(sim.memory_stats().used_memory <= 256);
    sim.verify_invariants().unwrap();
}

#[test]
fn test_same_seed_same_run() {
    let run = |seed| {
        let mut sim = Simulation::with_seed(SimConfig::default(), seed).unwrap();
        sim.initial_load();
        sim.run(300).unwrap();
        (sim.process_table(), sim.performance_report())
    };

    assert_eq!(run(99), run(99));
}

#[test]
fn test_generated_load_without_process() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 8).unwrap();
    let pid = sim.load_process(None).unwrap();

    let process = sim.process(pid).unwrap();
    assert_eq!(process.state(), ProcessState::Ready);
    assert_eq!(process.arrival_tick(), Some(0));
    assert!((5..=20).contains(&process.memory_size()));
    assert!((10..=200).contains(&process.total_instructions()));
}

#[test]
fn test_zero_quantum_refused_until_restored() {
    let mut sim = Simulation::with_seed(quiet_config(1), 4).unwrap();
    let a = admit(&mut sim, 8, 100, 5);
    sim.run(2).unwrap();

    let handle = sim.config_handle();
    handle.write().scheduler.quantum = 0;
    for _ in 0..3 {
        assert!(matches!(sim.tick(), Err(SimError::InvalidConfig(_))));
    }
    assert!(!sim.is_faulted());
    assert_eq!(sim.current_tick(), 2);
    assert_eq!(sim.process(a).unwrap().pc(), 1);

    handle.write().scheduler.quantum = 2;
    sim.run(2).unwrap();
    assert_eq!(sim.current_tick(), 4);
    assert_eq!(sim.scheduler_stats().preemptions, 1);
}

#[test]
fn test_inverted_priority_range_refused_without_panic() {
    let mut sim = Simulation::with_seed(quiet_config(1), 4).unwrap();
    let ready = sim.create_process(8, 100, 5).unwrap();

    let handle = sim.config_handle();
    {
        let mut config = handle.write();
        config.scheduler.min_priority = 9;
        config.scheduler.max_priority = 3;
    }

    assert!(matches!(sim.create_process(8, 100, 5), Err(SimError::InvalidConfig(_))));
    assert!(matches!(sim.load_process(Some(ready)), Err(SimError::InvalidConfig(_))));
    assert!(matches!(sim.load_process(None), Err(SimError::InvalidConfig(_))));
    assert!(matches!(sim.tick(), Err(SimError::InvalidConfig(_))));
    assert!(!sim.is_faulted());
    assert_eq!(sim.process_count(), 0);
    assert_eq!(sim.memory_stats().used_memory, 0);
}
