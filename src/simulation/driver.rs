/*!
 * Paced Driver
 *
 * Background task that calls `Simulation::tick()` at a fixed real-time rate.
 * The simulation itself has no timers; pacing lives entirely here. Only a
 * fatal tick error stops the task.
 */

use super::Simulation;
use crate::core::limits::{MAX_TICKS_PER_SECOND, MIN_TICKS_PER_SECOND};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Control messages for the driver task
#[derive(Debug, Clone, Copy, PartialEq)]
enum DriverCommand {
    /// New rate in ticks per second
    UpdateSpeed(f64),
    Shutdown,
}

struct DriverTask {
    command_tx: mpsc::UnboundedSender<DriverCommand>,
    handle: tokio::task::JoinHandle<()>,
}

/// Runs a shared simulation in real time
pub struct SimulationDriver {
    simulation: Arc<Mutex<Simulation>>,
    ticks_per_second: f64,
    task: Option<DriverTask>,
}

impl SimulationDriver {
    /// Driver paced by the simulation's configured `ticks_per_second`
    pub fn new(simulation: Simulation) -> Self {
        Self::from_shared(Arc::new(Mutex::new(simulation)))
    }

    pub fn from_shared(simulation: Arc<Mutex<Simulation>>) -> Self {
        let ticks_per_second = clamp_speed(simulation.lock().config().cpu.ticks_per_second);
        Self {
            simulation,
            ticks_per_second,
            task: None,
        }
    }

    /// Shared handle for reports and admission between ticks
    pub fn simulation(&self) -> Arc<Mutex<Simulation>> {
        self.simulation.clone()
    }

    /// Spawn the tick loop; no-op while already running
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let simulation = self.simulation.clone();
        let ticks_per_second = self.ticks_per_second;

        let handle = tokio::spawn(async move {
            run_driver_loop(simulation, ticks_per_second, command_rx).await;
        });
        info!(ticks_per_second, "Simulation driver started");

        self.task = Some(DriverTask { command_tx, handle });
    }

    /// Stop the tick loop and wait for it to exit
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        let _ = task.command_tx.send(DriverCommand::Shutdown);
        if let Err(e) = task.handle.await {
            warn!(error = %e, "Simulation driver shutdown error");
        } else {
            info!("Simulation driver stopped");
        }
    }

    /// Change the rate, clamped to the supported range
    ///
    /// Takes effect immediately when running. Returns the applied rate.
    pub fn set_speed(&mut self, ticks_per_second: f64) -> f64 {
        self.ticks_per_second = clamp_speed(ticks_per_second);
        if let Some(task) = &self.task {
            let _ = task
                .command_tx
                .send(DriverCommand::UpdateSpeed(self.ticks_per_second));
        }
        self.ticks_per_second
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.ticks_per_second
    }

    /// The loop is alive; false after `stop()` or a faulted tick
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.handle.is_finished())
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            let _ = task.command_tx.send(DriverCommand::Shutdown);
        }
    }
}

fn clamp_speed(ticks_per_second: f64) -> f64 {
    if ticks_per_second.is_nan() {
        return MIN_TICKS_PER_SECOND;
    }
    ticks_per_second.clamp(MIN_TICKS_PER_SECOND, MAX_TICKS_PER_SECOND)
}

fn tick_interval(ticks_per_second: f64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / ticks_per_second));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run_driver_loop(
    simulation: Arc<Mutex<Simulation>>,
    ticks_per_second: f64,
    mut command_rx: mpsc::UnboundedReceiver<DriverCommand>,
) {
    let mut interval = tick_interval(ticks_per_second);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let result = simulation.lock().tick();
                match result {
                    Ok(()) => {}
                    Err(e) if e.is_fatal() => {
                        error!(error = %e, "Tick failed, driver stopping");
                        break;
                    }
                    // Refused before any change; retried on the next interval
                    Err(e) => warn!(error = %e, "Tick skipped"),
                }
            }

            command = command_rx.recv() => {
                match command {
                    Some(DriverCommand::UpdateSpeed(rate)) => {
                        info!(ticks_per_second = rate, "Simulation speed updated");
                        interval = tick_interval(rate);
                    }
                    Some(DriverCommand::Shutdown) | None => break,
                }
            }
        }
    }
}
