/*!
 * OS Simulator - Main Entry Point
 *
 * Usage: `os-sim [config.json]`
 *
 * Environment:
 * - SIM_TICKS: ticks to run (default 1000)
 * - SIM_SEED: seed for a reproducible run
 * - SIM_TICKS_PER_SECOND: run in real time at this rate instead of flat out
 * - RUST_LOG / SIM_TRACE_JSON: logging, see `init_tracing`
 */

use miette::{IntoDiagnostic, Result, WrapErr};
use std::time::Duration;
use tracing::info;

use os_sim_kernel::{init_tracing, SimConfig, Simulation, SimulationDriver};

const DEFAULT_TICKS: u64 = 1000;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

fn load_config() -> Result<SimConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading configuration {}", path))?;
            Ok(SimConfig::from_json_str(&json)?)
        }
        None => Ok(SimConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = load_config()?;
    let ticks = env_parse::<u64>("SIM_TICKS").unwrap_or(DEFAULT_TICKS);

    let mut simulation = match env_parse::<u64>("SIM_SEED") {
        Some(seed) => Simulation::with_seed(config, seed)?,
        None => Simulation::new(config)?,
    };
    let admitted = simulation.initial_load();
    info!(run_id = %simulation.run_id(), admitted = admitted.len(), ticks, "Simulation starting");

    let simulation = match env_parse::<f64>("SIM_TICKS_PER_SECOND") {
        Some(rate) => {
            let mut driver = SimulationDriver::new(simulation);
            driver.set_speed(rate);
            driver.start();
            loop {
                tokio::time::sleep(Duration::from_millis(50)).await;
                let done = driver.simulation().lock().current_tick() >= ticks;
                if done || !driver.is_running() {
                    break;
                }
            }
            driver.stop().await;
            driver.simulation()
        }
        None => {
            simulation.run(ticks)?;
            std::sync::Arc::new(parking_lot::Mutex::new(simulation))
        }
    };

    let simulation = simulation.lock();
    let output = serde_json::json!({
        "run_id": simulation.run_id(),
        "system": simulation.system_report(),
        "performance": simulation.performance_report(),
        "memory": simulation.memory_stats(),
        "scheduler": simulation.scheduler_stats(),
        "processes": simulation.time_breakdown(),
    });
    println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);

    if simulation.is_faulted() {
        return Err(miette::miette!("simulation faulted at tick {}", simulation.current_tick()));
    }
    Ok(())
}
