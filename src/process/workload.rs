/*!
 * Synthetic Workload
 * Job generation (new processes) and per-instruction command generation
 */

use super::command::{Command, Operation};
use super::types::Process;
use crate::core::config::{CommandConfig, GeneratorConfig, SchedulerConfig};
use crate::core::random::RandomSource;
use crate::core::types::{Pid, Priority, Size};

/// Draw the next command for a scheduled process
///
/// The last instruction is always EXIT. Otherwise a single uniform draw picks
/// ERROR below `error_prob`, IO below `error_prob + io_prob`, COMPUTE above.
pub fn generate_command(
    process: &Process,
    config: &CommandConfig,
    rng: &mut dyn RandomSource,
) -> Command {
    if process.at_last_instruction() {
        return Command::Exit;
    }

    let r = rng.next_f64();
    if r < config.error_prob {
        Command::Error
    } else if r < config.error_prob + config.io_prob {
        Command::Io {
            duration: rng.range_inclusive(config.io_min_ticks, config.io_max_ticks),
        }
    } else {
        let last = process.memory_size().saturating_sub(1) as u64;
        let lhs = rng.range_inclusive(0, last) as usize;
        let rhs = rng.range_inclusive(0, last) as usize;
        let dst = rng.range_inclusive(0, last) as usize;
        let op = Operation::ALL[rng.range_inclusive(0, Operation::ALL.len() as u64 - 1) as usize];
        Command::Compute { op, lhs, rhs, dst }
    }
}

/// Creates processes with sequential, never reused pids
#[derive(Debug, Clone, Default)]
pub struct JobGenerator {
    counter: Pid,
}

impl JobGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next pid
    pub fn next_pid(&mut self) -> Pid {
        self.counter += 1;
        self.counter
    }

    /// Last pid handed out (0 before the first)
    pub fn last_pid(&self) -> Pid {
        self.counter
    }

    /// Random process within the configured ranges
    ///
    /// Priority is uniform over the scheduler's priority range.
    pub fn generate(
        &mut self,
        generator: &GeneratorConfig,
        scheduler: &SchedulerConfig,
        rng: &mut dyn RandomSource,
    ) -> Process {
        let pid = self.next_pid();
        let memory_size =
            rng.range_inclusive(generator.min_memory as u64, generator.max_memory as u64) as Size;
        let total_instructions =
            rng.range_inclusive(generator.min_instructions, generator.max_instructions);
        let priority = rng.range_inclusive(
            u64::from(scheduler.min_priority),
            u64::from(scheduler.max_priority),
        ) as Priority;

        Process::new(pid, memory_size, total_instructions, priority)
    }

    /// Process with caller-chosen shape and a fresh pid
    pub fn create(
        &mut self,
        memory_size: Size,
        total_instructions: u64,
        base_priority: Priority,
    ) -> Process {
        let pid = self.next_pid();
        Process::new(pid, memory_size, total_instructions, base_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::SeededRandom;
    use crate::process::command::CommandKind;

    /// Replays fixed draws
    struct Scripted {
        floats: Vec<f64>,
        ints: Vec<u64>,
    }

    impl RandomSource for Scripted {
        fn next_f64(&mut self) -> f64 {
            self.floats.remove(0)
        }

        fn range_inclusive(&mut self, min: u64, max: u64) -> u64 {
            self.ints.remove(0).clamp(min, max)
        }
    }

    fn config(io: f64, error: f64) -> CommandConfig {
        CommandConfig {
            compute_prob: 1.0 - io - error,
            io_prob: io,
            error_prob: error,
            io_min_ticks: 2,
            io_max_ticks: 6,
        }
    }

    #[test]
    fn test_last_instruction_forces_exit() {
        let mut p = Process::new(1, 8, 3, 5);
        p.pc = 2;
        let mut rng = Scripted {
            floats: vec![],
            ints: vec![],
        };
        // No draws are consumed
        assert_eq!(generate_command(&p, &config(0.5, 0.5), &mut rng), Command::Exit);
    }

    #[test]
    fn test_draw_thresholds() {
        let p = Process::new(1, 8, 100, 5);
        let cfg = config(0.2, 0.1);

        let mut rng = Scripted {
            floats: vec![0.05],
            ints: vec![],
        };
        assert_eq!(generate_command(&p, &cfg, &mut rng), Command::Error);

        let mut rng = Scripted {
            floats: vec![0.25],
            ints: vec![4],
        };
        assert_eq!(generate_command(&p, &cfg, &mut rng), Command::Io { duration: 4 });

        let mut rng = Scripted {
            floats: vec![0.9],
            ints: vec![1, 2, 7, 3],
        };
        assert_eq!(
            generate_command(&p, &cfg, &mut rng),
            Command::Compute {
                op: Operation::Div,
                lhs: 1,
                rhs: 2,
                dst: 7
            }
        );
    }

    #[test]
    fn test_compute_addresses_stay_in_bounds() {
        let p = Process::new(1, 5, 1000, 5);
        let mut rng = SeededRandom::from_seed(11);
        for _ in 0..500 {
            match generate_command(&p, &config(0.0, 0.0), &mut rng) {
                Command::Compute { lhs, rhs, dst, .. } => {
                    assert!(lhs < 5 && rhs < 5 && dst < 5);
                }
                other => panic!("unexpected command {:?}", other),
            }
        }
    }

    #[test]
    fn test_io_duration_in_range() {
        let p = Process::new(1, 5, 1000, 5);
        let mut rng = SeededRandom::from_seed(3);
        for _ in 0..200 {
            let cmd = generate_command(&p, &config(1.0, 0.0), &mut rng);
            assert_eq!(cmd.kind(), CommandKind::Io);
            if let Command::Io { duration } = cmd {
                assert!((2..=6).contains(&duration));
            }
        }
    }

    #[test]
    fn test_job_generator_sequential_pids() {
        let mut gen = JobGenerator::new();
        let mut rng = SeededRandom::from_seed(1);
        let g = GeneratorConfig::default();
        let s = SchedulerConfig::default();

        let a = gen.generate(&g, &s, &mut rng);
        let b = gen.generate(&g, &s, &mut rng);
        let c = gen.create(10, 10, 5);
        assert_eq!((a.pid(), b.pid(), c.pid()), (1, 2, 3));

        for p in [&a, &b] {
            assert!((g.min_memory..=g.max_memory).contains(&p.memory_size()));
            assert!((g.min_instructions..=g.max_instructions).contains(&p.total_instructions()));
            assert!((s.min_priority..=s.max_priority).contains(&p.base_priority()));
            assert_eq!(p.dynamic_priority(), p.base_priority());
        }
    }
}
