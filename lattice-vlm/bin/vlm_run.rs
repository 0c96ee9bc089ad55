//! Unsteady vortex-lattice runner
//!
//! Loads a scenario JSON file (geometry, movement laws, solver settings),
//! marches the run and writes the full time history to JSON.
//!
//! Usage:
//!   cargo run --release --bin vlm-run -- --scenario flapper.json
//!   cargo run --release --bin vlm-run -- --help

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use aero_lattice_vlm::{Scenario, WakeMode};

#[derive(Parser, Debug)]
#[command(name = "vlm-run")]
#[command(about = "Time-marching unsteady ring-vortex-lattice solver", long_about = None)]
struct Args {
    /// Path to the scenario JSON file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Output JSON file path
    #[arg(short, long, default_value = "solution.json")]
    output: PathBuf,

    /// Override the scenario's wake model
    #[arg(short, long)]
    wake: Option<WakeArg>,

    /// Number of parallel threads (default: all cores)
    #[arg(short = 't', long)]
    threads: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WakeArg {
    /// Wake vertices ride the full induced velocity field
    Free,
    /// Wake vertices ride the freestream only
    Prescribed,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to set thread pool")?;
        println!("Using {threads} threads\n");
    }

    let scenario_path = args.scenario.display().to_string();
    println!("Loading scenario from: {scenario_path}");
    let mut scenario = Scenario::from_file(&scenario_path).map_err(|e| anyhow!(e))?;
    if let Some(wake) = args.wake {
        scenario.settings.wake_mode = match wake {
            WakeArg::Free => WakeMode::Free,
            WakeArg::Prescribed => WakeMode::Prescribed,
        };
    }

    let solver = scenario.into_solver()?;
    let timing = solver.resolve_timing()?;
    println!("\n=== Run Plan ===");
    println!(
        "Steps: {} x {:.6} s ({:.4} s of simulated time)",
        timing.num_steps,
        timing.delta_time,
        timing.num_steps as f64 * timing.delta_time
    );
    println!("Wake model: {:?}", solver.settings().wake_mode);

    let started = std::time::Instant::now();
    let solution = solver.run()?;
    println!("Run finished in {:.2} s", started.elapsed().as_secs_f64());

    println!("\n=== Final Loads ===");
    if let Some(last) = solution.final_step() {
        for plane in &last.airplanes {
            println!("{}:", plane.name);
            println!(
                "  CL = {:+.5}   CDi = {:+.5}   CY = {:+.5}",
                plane.lift_coefficient,
                plane.induced_drag_coefficient,
                plane.side_force_coefficient
            );
            println!(
                "  Cl = {:+.5}   Cm  = {:+.5}   Cn = {:+.5}",
                plane.rolling_moment_coefficient,
                plane.pitching_moment_coefficient,
                plane.yawing_moment_coefficient
            );
        }
        println!("Wake rings: {}", last.wake_rings.len());
    }

    let output_path = args.output.display().to_string();
    solution.to_file(&output_path).map_err(|e| anyhow!(e))?;
    println!("\nSolution written to: {output_path}");
    Ok(())
}
