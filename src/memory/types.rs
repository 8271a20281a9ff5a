/*!
 * Memory Types
 * Pool snapshot reported to collaborators
 */

use crate::core::types::Size;
use serde::{Deserialize, Serialize};

/// Pool snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MemoryStats {
    pub total_memory: Size,
    pub used_memory: Size,
    pub available_memory: Size,
    pub usage_percentage: f64,
    pub pressure: MemoryPressure,
}

/// How close the pool is to refusing admissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPressure {
    Low,
    High,
    /// No free word left; every admission is refused
    Exhausted,
}

impl MemoryPressure {
    /// Classify a pool; 80% usage counts as high
    pub fn classify(used: Size, total: Size) -> Self {
        if used >= total {
            MemoryPressure::Exhausted
        } else if used * 5 >= total * 4 {
            MemoryPressure::High
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "low"),
            MemoryPressure::High => write!(f, "high"),
            MemoryPressure::Exhausted => write!(f, "exhausted"),
        }
    }
}
