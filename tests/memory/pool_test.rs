/*!
 * Shared Pool Tests
 */

use os_sim_kernel::memory::MemoryPressure;
use os_sim_kernel::MemoryManager;
use pretty_assertions::assert_eq;

#[test]
fn test_allocate_until_full() {
    let mut pool = MemoryManager::new(100);

    assert!(pool.allocate(60));
    assert!(pool.allocate(40));
    assert!(!pool.has_space(1));
    assert!(!pool.allocate(1));
    assert_eq!(pool.used(), 100);
    assert_eq!(pool.available(), 0);
}

#[test]
fn test_refused_allocation_changes_nothing() {
    let mut pool = MemoryManager::new(256);
    assert!(!pool.allocate(300));
    assert_eq!(pool.used(), 0);
    assert_eq!(pool.available(), 256);
}

#[test]
fn test_free_floors_at_zero() {
    let mut pool = MemoryManager::new(50);
    pool.allocate(20);
    pool.free(30);
    assert_eq!(pool.used(), 0);
}

#[test]
fn test_stats_and_pressure() {
    let mut pool = MemoryManager::new(200);
    pool.allocate(170);

    let stats = pool.stats();
    assert_eq!(stats.total_memory, 200);
    assert_eq!(stats.used_memory, 170);
    assert_eq!(stats.available_memory, 30);
    assert!((stats.usage_percentage - 85.0).abs() < 1e-9);
    assert_eq!(stats.pressure, MemoryPressure::High);
}

#[test]
fn test_shrink_below_usage() {
    let mut pool = MemoryManager::new(100);
    pool.allocate(80);
    pool.set_capacity(50);

    assert_eq!(pool.used(), 80);
    assert_eq!(pool.available(), 0);
    assert!(!pool.has_space(1));

    pool.free(40);
    assert!(pool.has_space(10));
    assert!(!pool.has_space(11));
}
