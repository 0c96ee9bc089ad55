//! Flapping wing with a free wake
//!
//! An ornithopter-style wing flaps through three cycles: the tip sections
//! sweep up and down about the root chord line while the root stays level.
//! The wake convects force-free, so it rolls up behind the flapping tips.
//!
//! Prints the lift coefficient through the last cycle and the cycle-mean
//! loads. A flapping wing produces thrust on the downstroke, which shows
//! up here as a negative cycle-mean induced drag.
//!
//! Usage:
//!     cargo run --release --example flapping_wing

use aero_lattice_vlm::{
    Airfoil, Airplane, AirplaneMovement, Movement, MovementLaw, OperatingPoint,
    OperatingPointMovement, SolverSettings, Spacing, UnsteadySolver, WakeMode, Wing,
    WingCrossSection, WingCrossSectionMovement, WingMovement,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Flapping Wing, Free Wake ===\n");

    let flap_period = 0.5; // s
    let flap_amplitude = 15.0; // deg

    let airfoil = Airfoil::naca("8304")?;
    let wing = Wing::new(
        "flapper",
        vec![
            WingCrossSection::new(0.6, airfoil.clone()).with_spanwise_panels(6, Spacing::Cosine),
            WingCrossSection::new(0.4, airfoil).with_le_offset(0.1, 1.6, 0.0),
        ],
    )
    .with_symmetric(true)
    .with_chordwise_panels(4, Spacing::Cosine);
    let airplane = Airplane::new("ornithopter", vec![wing]);

    // Root fixed, tip sweeping: the whole panel strip flaps
    let mut wing_movement = WingMovement::fixed(&airplane.wings[0]);
    wing_movement.cross_section_movements = vec![
        WingCrossSectionMovement::fixed(),
        WingCrossSectionMovement::fixed()
            .with_sweep(MovementLaw::sine(flap_amplitude, flap_period)),
    ];
    let movement = Movement::new(
        vec![AirplaneMovement::new(airplane, vec![wing_movement])],
        OperatingPointMovement::fixed(OperatingPoint::new(1.225, 8.0, 3.0, 0.0)),
    );

    let settings = SolverSettings::default()
        .with_wake_mode(WakeMode::Free)
        .with_num_cycles(3);
    let solver = UnsteadySolver::new(movement, settings)?;
    let timing = solver.resolve_timing()?;
    println!(
        "Flapping at {:.1} deg over {:.2} s periods, {} steps of {:.4} s",
        flap_amplitude, flap_period, timing.num_steps, timing.delta_time
    );

    let solution = solver.run()?;

    let steps_per_cycle = (flap_period / timing.delta_time).round() as usize;
    println!("\nLast cycle:");
    let first_of_last = solution.num_steps().saturating_sub(steps_per_cycle);
    for step in &solution.steps[first_of_last..] {
        let plane = &step.airplanes[0];
        println!(
            "  t = {:6.3} s   CL = {:+.4}   CDi = {:+.5}",
            step.time, plane.lift_coefficient, plane.induced_drag_coefficient
        );
    }

    let mean_lift = solution
        .trailing_mean(steps_per_cycle, |s| s.airplanes[0].lift_coefficient)
        .unwrap_or(0.0);
    let mean_drag = solution
        .trailing_mean(steps_per_cycle, |s| {
            s.airplanes[0].induced_drag_coefficient
        })
        .unwrap_or(0.0);

    println!("\n=== Cycle Means ===");
    println!("  CL  = {mean_lift:+.4}");
    println!("  CDi = {mean_drag:+.5}   (negative means net thrust)");
    println!(
        "  Wake rings at the end: {}",
        solution.final_step().map_or(0, |s| s.wake_rings.len())
    );

    Ok(())
}
