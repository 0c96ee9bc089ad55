use criterion::{black_box, criterion_group, criterion_main, Criterion};

use aero_lattice_common::Vec3;
use aero_lattice_vlm::{
    filament_velocity, influence_matrix, mesh_airplanes, Airfoil, Airplane, KernelCounters,
    Spacing, Wing, WingCrossSection, DEFAULT_CORE_RADIUS,
};

fn benchmark_mesh(nc: usize, ns: usize) -> aero_lattice_vlm::FlatMesh {
    let airfoil = Airfoil::naca("2412").unwrap();
    let wing = Wing::new(
        "bench",
        vec![
            WingCrossSection::new(1.0, airfoil.clone()).with_spanwise_panels(ns, Spacing::Cosine),
            WingCrossSection::new(0.7, airfoil).with_le_offset(0.1, 4.0, 0.0),
        ],
    )
    .with_symmetric(true)
    .with_chordwise_panels(nc, Spacing::Cosine);
    mesh_airplanes(&[Airplane::new("bench", vec![wing])]).unwrap()
}

fn bench_filament_kernel(c: &mut Criterion) {
    let start = Vec3::new(0.0, -0.5, 0.0);
    let end = Vec3::new(0.0, 0.5, 0.0);
    let point = Vec3::new(0.3, 0.1, 0.2);

    c.bench_function("filament_velocity", |b| {
        b.iter(|| {
            black_box(filament_velocity(
                black_box(&start),
                black_box(&end),
                black_box(&point),
                DEFAULT_CORE_RADIUS,
                None,
            ))
        })
    });
}

fn bench_influence_matrix(c: &mut Criterion) {
    for (nc, ns) in [(4, 8), (8, 16)] {
        let mesh = benchmark_mesh(nc, ns);
        let rings = mesh.bound_rings();
        let collocations = mesh.collocation_points();
        let normals = mesh.normals();
        let counters = KernelCounters::new();
        let name = format!("influence_matrix_{}", mesh.num_panels());

        c.bench_function(&name, |b| {
            b.iter(|| {
                black_box(influence_matrix(
                    black_box(&rings),
                    black_box(&collocations),
                    black_box(&normals),
                    DEFAULT_CORE_RADIUS,
                    &counters,
                ));
                counters.take();
            })
        });
    }
}

criterion_group!(benches, bench_filament_kernel, bench_influence_matrix);
criterion_main!(benches);
