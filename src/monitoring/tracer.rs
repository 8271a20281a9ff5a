/*!
 * Structured Tracing
 * Subscriber setup and the per-tick span
 */

use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::core::types::Tick;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SIM_TRACE_JSON: Enable JSON output (default: false)
///
/// A second call is a no-op.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Identifier of one simulation instance, carried by every tick span
pub fn generate_run_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one tick of the protocol
///
/// Logs the tick outcome on drop; ticks slower than 50ms are reported.
pub struct TickSpan {
    span: tracing::Span,
    start: Instant,
    tick: Tick,
}

impl TickSpan {
    pub fn new(run_id: &str, tick: Tick) -> Self {
        let span = span!(
            Level::DEBUG,
            "tick",
            run_id = %run_id,
            tick = tick,
            executed = tracing::field::Empty,
            completed = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            tick,
        }
    }

    pub fn record_executed(&self, count: usize) {
        self.span.record("executed", count);
    }

    pub fn record_completed(&self, count: usize) {
        self.span.record("completed", count);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for TickSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration.as_millis() > 50 {
            warn!(tick = self.tick, duration_ms = duration.as_millis() as u64, slow = true, "slow tick");
        } else {
            debug!(tick = self.tick, duration_us = duration.as_micros() as u64, "tick completed");
        }
    }
}
