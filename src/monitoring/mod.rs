/*!
 * Monitoring
 * Metrics accumulation, mono-vs-multi analysis and tracing
 */

pub mod analysis;
mod metrics;
mod tracer;

pub use analysis::{PerformanceReport, SystemReport, TimeBreakdown};
pub use metrics::{Completion, Metrics, TickSample};
pub use tracer::{generate_run_id, init_tracing, TickSpan};
