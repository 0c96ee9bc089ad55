//! Static wing in a steady freestream
//!
//! Marches a rectangular NACA 2412 wing at a fixed angle of attack until
//! the wake has trailed far enough for the loads to settle, then compares
//! the lift slope against the finite-wing thin-airfoil estimate
//!
//!   CL = 2 pi (alpha + alpha_0) / (1 + 2 / AR)
//!
//! The match is not exact (the estimate ignores chordwise resolution and
//! wake rollup) but lands within a few percent for a clean planform.
//!
//! Usage:
//!     cargo run --release --example static_wing

use aero_lattice_vlm::{
    Airfoil, Airplane, Movement, OperatingPoint, SolverSettings, Spacing, UnsteadySolver, Wing,
    WingCrossSection,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Static Wing ===\n");

    // 5:1 rectangular planform, mirrored about the root
    let half_span = 2.5;
    let chord = 1.0;
    let alpha = 5.0; // deg

    let airfoil = Airfoil::naca("2412")?;
    let wing = Wing::new(
        "main",
        vec![
            WingCrossSection::new(chord, airfoil.clone()).with_spanwise_panels(8, Spacing::Cosine),
            WingCrossSection::new(chord, airfoil).with_le_offset(0.0, half_span, 0.0),
        ],
    )
    .with_symmetric(true)
    .with_chordwise_panels(6, Spacing::Cosine);
    let airplane = Airplane::new("static-wing", vec![wing]);

    let operating_point = OperatingPoint::new(1.225, 10.0, alpha, 0.0);
    println!("Setup:");
    println!("  Span: {} m, chord: {} m", 2.0 * half_span, chord);
    println!("  Freestream: {} m/s at {} deg", operating_point.velocity, alpha);
    println!();

    let movement = Movement::steady(vec![airplane], operating_point);
    let solver = UnsteadySolver::new(movement, SolverSettings::default())?;
    let timing = solver.resolve_timing()?;
    println!(
        "Marching {} steps of {:.4} s...",
        timing.num_steps, timing.delta_time
    );

    let solution = solver.run()?;

    println!("\nLoad history (every 5th step):");
    for step in solution.steps.iter().step_by(5) {
        let plane = &step.airplanes[0];
        println!(
            "  t = {:6.3} s   CL = {:.4}   CDi = {:.5}",
            step.time, plane.lift_coefficient, plane.induced_drag_coefficient
        );
    }

    let last = solution.final_step().unwrap();
    let plane = &last.airplanes[0];

    // 2412 camber is worth roughly 2 degrees of incidence
    let aspect_ratio = 2.0 * half_span / chord;
    let alpha_effective = (alpha + 2.0_f64).to_radians();
    let estimate = 2.0 * std::f64::consts::PI * alpha_effective / (1.0 + 2.0 / aspect_ratio);

    println!("\n=== Final Loads ===");
    println!("  CL  = {:+.4}   (thin-airfoil estimate {:+.4})", plane.lift_coefficient, estimate);
    println!("  CDi = {:+.5}", plane.induced_drag_coefficient);
    println!("  Cm  = {:+.4}", plane.pitching_moment_coefficient);
    println!("  Wake rings: {}", last.wake_rings.len());

    Ok(())
}
