/*!
 * Tick Protocol Scenarios
 * Deterministic end-to-end runs with hand-picked configurations
 */

use os_sim_kernel::{CapacityKind, Pid, ProcessState, SimConfig, SimError, Simulation};
use pretty_assertions::assert_eq;

/// Compute-only workload without overheads or aging
fn compute_only(threads: usize, quantum: u64) -> SimConfig {
    let mut config = SimConfig::default();
    config.cpu.thread_count = threads;
    config.scheduler.quantum = quantum;
    config.scheduler.aging_interval_ticks = 1000;
    config.commands.compute_prob = 1.0;
    config.commands.io_prob = 0.0;
    config.commands.error_prob = 0.0;
    config.overheads = None;
    config
}

fn admit(sim: &mut Simulation, memory: usize, instructions: u64, priority: u8) -> Pid {
    let process = sim.create_process(memory, instructions, priority).unwrap();
    sim.load_process(Some(process)).unwrap()
}

fn state(sim: &Simulation, pid: Pid) -> ProcessState {
    sim.process(pid).unwrap().state()
}

#[test]
fn test_oversized_process_rejected() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 1).unwrap();
    let process = sim.create_process(300, 50, 5).unwrap();

    let err = sim.load_process(Some(process)).unwrap_err();
    assert_eq!(
        err,
        SimError::InsufficientMemory {
            requested: 300,
            available: 256
        }
    );
    assert_eq!(sim.memory_stats().used_memory, 0);
    assert_eq!(sim.process_count(), 0);
    assert!(sim.ready_pids().is_empty());
}

#[test]
fn test_empty_processes_rejected() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 1).unwrap();

    let no_memory = sim.create_process(0, 50, 5).unwrap();
    let pid = no_memory.pid();
    assert!(matches!(
        sim.load_process(Some(no_memory)),
        Err(SimError::InvalidProcess { pid: rejected, .. }) if rejected == pid
    ));

    let no_program = sim.create_process(8, 0, 5).unwrap();
    assert!(matches!(
        sim.load_process(Some(no_program)),
        Err(SimError::InvalidProcess { .. })
    ));

    assert_eq!(sim.process_count(), 0);
    assert_eq!(sim.memory_stats().used_memory, 0);
    sim.run(3).unwrap();
    assert!(!sim.is_faulted());
}

#[test]
fn test_full_table_rejected() {
    let mut config = SimConfig::default();
    config.system.max_processes = 2;
    let mut sim = Simulation::with_seed(config, 1).unwrap();

    admit(&mut sim, 10, 50, 5);
    admit(&mut sim, 10, 50, 5);
    let third = sim.create_process(10, 50, 5).unwrap();

    assert_eq!(
        sim.load_process(Some(third)),
        Err(SimError::CapacityExceeded {
            resource: CapacityKind::ProcessTable,
            limit: 2
        })
    );
    assert_eq!(sim.memory_stats().used_memory, 20);
    assert_eq!(sim.ready_pids().len(), 2);
}

#[test]
fn test_duplicate_pid_rejected() {
    let mut sim = Simulation::with_seed(SimConfig::default(), 1).unwrap();
    let process = sim.create_process(10, 50, 5).unwrap();
    let pid = sim.load_process(Some(process.clone())).unwrap();

    assert_eq!(sim.load_process(Some(process)), Err(SimError::AlreadyExists(pid)));
    assert_eq!(sim.memory_stats().used_memory, 10);
}

#[test]
fn test_quantum_expiry_penalizes_and_preempts() {
    let mut sim = Simulation::with_seed(compute_only(1, 5), 7).unwrap();
    let a = admit(&mut sim, 8, 100, 5);
    let b = admit(&mut sim, 8, 100, 4);

    // Tick 1 dispatches A, ticks 2..=5 execute four instructions
    sim.run(5).unwrap();
    assert_eq!(state(&sim, a), ProcessState::Running);
    assert_eq!(sim.process(a).unwrap().pc(), 4);
    assert_eq!(sim.scheduler_stats().preemptions, 0);

    // The fifth instruction uses up the quantum within the same tick
    sim.tick().unwrap();
    let pa = sim.process(a).unwrap();
    assert_eq!(pa.state(), ProcessState::Ready);
    assert_eq!(pa.pc(), 5);
    assert_eq!(pa.dynamic_priority(), 5 - 3);
    assert_eq!(sim.running_pids(), vec![b]);
    assert_eq!(sim.scheduler_stats().preemptions, 1);

    sim.tick().unwrap();
    assert_eq!(sim.system_report().recent_pids, vec![a, a, a, a, a, b]);
}

#[test]
fn test_quantum_of_one_rotates_every_tick() {
    let mut sim = Simulation::with_seed(compute_only(1, 1), 7).unwrap();
    let a = admit(&mut sim, 8, 100, 5);
    let b = admit(&mut sim, 8, 100, 5);

    sim.run(5).unwrap();
    assert_eq!(sim.system_report().recent_pids, vec![a, b, a, b]);
    assert_eq!(sim.process(a).unwrap().pc(), 2);
    assert_eq!(sim.process(b).unwrap().pc(), 2);
}

#[test]
fn test_exit_on_quantum_boundary_is_not_preempted() {
    let mut sim = Simulation::with_seed(compute_only(1, 3), 7).unwrap();
    let a = admit(&mut sim, 8, 3, 5);

    // Third executed instruction is the EXIT
    sim.run(4).unwrap();
    let pa = sim.process(a).unwrap();
    assert!(pa.is_terminated());
    assert_eq!(pa.end_tick(), Some(4));
    assert_eq!(sim.scheduler_stats().preemptions, 0);
    assert_eq!(sim.performance_report().completed, 1);
    assert!(sim.ready_pids().is_empty());
}

#[test]
fn test_penalty_clamped_to_min_priority() {
    let mut sim = Simulation::with_seed(compute_only(1, 2), 7).unwrap();
    let a = admit(&mut sim, 8, 100, 2);

    sim.run(3).unwrap();
    // Sole process is preempted and dispatched again in the same tick
    let pa = sim.process(a).unwrap();
    assert_eq!(pa.dynamic_priority(), 1);
    assert_eq!(pa.state(), ProcessState::Running);
    assert_eq!(pa.slice_ticks(), 0);
}

#[test]
fn test_io_blocks_for_exact_duration() {
    let mut config = compute_only(1, 100);
    config.commands.io_prob = 1.0;
    config.commands.io_min_ticks = 3;
    config.commands.io_max_ticks = 3;
    let mut sim = Simulation::with_seed(config, 3).unwrap();
    let a = admit(&mut sim, 8, 100, 5);

    sim.tick().unwrap();
    assert_eq!(sim.running_pids(), vec![a]);

    // Tick 2 issues the request; ticks 2, 3 and 4 are spent blocked
    for _ in 0..3 {
        sim.tick().unwrap();
        assert_eq!(state(&sim, a), ProcessState::BlockedIo);
        assert!(sim.running_pids().is_empty());
        assert_eq!(sim.blocked_pids(), vec![a]);
    }

    sim.tick().unwrap();
    let pa = sim.process(a).unwrap();
    assert_ne!(pa.state(), ProcessState::BlockedIo);
    assert_eq!(pa.times().blocked_ticks, 3);
    assert_eq!(pa.times().io_busy_ticks, 3);
    assert_eq!(pa.pc(), 0);
    assert_eq!(sim.io_stats().completed, 1);
}

#[test]
fn test_equal_priority_dispatched_fifo() {
    let mut sim = Simulation::with_seed(compute_only(1, 100), 11).unwrap();
    let a = admit(&mut sim, 8, 100, 5);
    let b = admit(&mut sim, 8, 100, 5);

    sim.tick().unwrap();
    assert_eq!(sim.running_pids(), vec![a]);
    assert_eq!(sim.ready_pids(), vec![b]);
}

#[test]
fn test_terminated_process_retained_then_released() {
    let mut sim = Simulation::with_seed(compute_only(1, 1000), 5).unwrap();
    // Dispatched at tick 1, EXIT drawn at tick 50 on the last instruction
    let a = admit(&mut sim, 8, 49, 5);

    sim.run(49).unwrap();
    assert_eq!(state(&sim, a), ProcessState::Running);

    sim.tick().unwrap();
    assert_eq!(sim.current_tick(), 50);
    let pa = sim.process(a).unwrap();
    assert_eq!(pa.state(), ProcessState::Terminated);
    assert_eq!(pa.end_tick(), Some(50));
    assert_eq!(sim.performance_report().completed, 1);

    for _ in 51..=59 {
        sim.tick().unwrap();
        assert!(sim.process(a).is_some(), "tick {}", sim.current_tick());
        assert_eq!(sim.memory_stats().used_memory, 8);
    }

    sim.tick().unwrap();
    assert_eq!(sim.current_tick(), 60);
    assert!(sim.process(a).is_none());
    assert_eq!(sim.memory_stats().used_memory, 0);
}

#[test]
fn test_error_command_terminates() {
    let mut config = compute_only(1, 100);
    config.commands.error_prob = 1.0;
    let mut sim = Simulation::with_seed(config, 9).unwrap();
    let a = admit(&mut sim, 8, 100, 5);

    sim.run(2).unwrap();
    let pa = sim.process(a).unwrap();
    assert!(pa.is_terminated());
    assert_eq!(pa.pc(), 0);
    assert!(sim.running_pids().is_empty());
    assert_eq!(sim.performance_report().completed, 1);
}

#[test]
fn test_multiple_slots_run_in_parallel() {
    let mut sim = Simulation::with_seed(compute_only(3, 100), 2).unwrap();
    let pids: Vec<Pid> = (0..4).map(|_| admit(&mut sim, 8, 100, 5)).collect();

    sim.run(3).unwrap();
    assert_eq!(sim.running_pids(), pids[..3].to_vec());
    assert_eq!(sim.ready_pids(), vec![pids[3]]);
    for &pid in &pids[..3] {
        assert_eq!(sim.process(pid).unwrap().pc(), 2);
    }

    let report = sim.system_report();
    assert!((report.cpu_utilization - 200.0 / 3.0).abs() < 1e-6);
    assert_eq!(report.recent_pids.len(), 6);
}
