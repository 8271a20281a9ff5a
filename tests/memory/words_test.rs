/*!
 * Private Memory and Command Execution Tests
 */

use os_sim_kernel::process::Operation;
use os_sim_kernel::{Command, ProcessMemory, SimError};
use pretty_assertions::assert_eq;

fn memory_with(values: &[i64]) -> ProcessMemory {
    let mut memory = ProcessMemory::new(values.len());
    for (address, &value) in values.iter().enumerate() {
        memory.write(address, value).unwrap();
    }
    memory
}

#[test]
fn test_out_of_bounds_is_invalid_address() {
    let mut memory = ProcessMemory::new(4);
    assert_eq!(
        memory.read(4),
        Err(SimError::InvalidAddress { address: 4, size: 4 })
    );
    assert!(memory.write(10, 1).is_err());
    assert!(!memory.is_valid_address(4));
}

#[test]
fn test_compute_writes_result() {
    let mut memory = memory_with(&[6, 7, 0]);
    let command = Command::Compute {
        op: Operation::Mul,
        lhs: 0,
        rhs: 1,
        dst: 2,
    };

    assert_eq!(command.execute(&mut memory).unwrap(), Some(42));
    assert_eq!(memory.read(2).unwrap(), 42);
}

#[test]
fn test_division_by_zero_yields_zero() {
    let mut memory = memory_with(&[9, 0, 5]);
    let command = Command::Compute {
        op: Operation::Div,
        lhs: 0,
        rhs: 1,
        dst: 2,
    };

    assert_eq!(command.execute(&mut memory).unwrap(), Some(0));
    assert_eq!(memory.read(2).unwrap(), 0);
}

#[test]
fn test_compare_sign() {
    let mut memory = memory_with(&[3, 8, 0]);
    let cmp = |lhs, rhs| Command::Compute {
        op: Operation::Cmp,
        lhs,
        rhs,
        dst: 2,
    };

    assert_eq!(cmp(0, 1).execute(&mut memory).unwrap(), Some(-1));
    assert_eq!(cmp(1, 0).execute(&mut memory).unwrap(), Some(1));
    assert_eq!(cmp(0, 0).execute(&mut memory).unwrap(), Some(0));
}

#[test]
fn test_compute_outside_memory_fails() {
    let mut memory = ProcessMemory::new(2);
    let command = Command::Compute {
        op: Operation::Add,
        lhs: 0,
        rhs: 5,
        dst: 1,
    };
    assert!(matches!(
        command.execute(&mut memory),
        Err(SimError::InvalidAddress { address: 5, .. })
    ));
}

#[test]
fn test_non_compute_commands_do_not_touch_memory() {
    let mut memory = memory_with(&[1, 2]);
    for command in [Command::Io { duration: 2 }, Command::Exit, Command::Error] {
        assert_eq!(command.execute(&mut memory).unwrap(), None);
    }
    assert_eq!(memory, memory_with(&[1, 2]));
}
