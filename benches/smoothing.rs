//! Benchmarks for feature-preserving smoothing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crease::algo::features::mark_boundary_edges;
use crease::algo::smooth::{
    assemble_system, classify_vertices, solve_weighted_least_squares, SmootherOptions,
};
use crease::prelude::*;
use crease::spatial::SpatialIndex;
use nalgebra::Point3;

/// Wavy triangulated grid with its boundary marked as a crease.
fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            let (x, y) = (i as f64, j as f64);
            vertices.push(Point3::new(x, y, 0.1 * (x * 1.7).sin() * (y * 2.3).cos()));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    let mut mesh = build_from_triangles(&vertices, &faces).unwrap();
    mark_boundary_edges(&mut mesh);
    mesh
}

fn bench_assembly(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);
    let labels = classify_vertices(&mesh);

    for (name, parallel) in [("assemble_50x50_parallel", true), ("assemble_50x50_sequential", false)] {
        let options = SmootherOptions::default().with_parallel(parallel);
        c.bench_function(name, |b| {
            b.iter(|| assemble_system(black_box(&mesh), &labels, &options, 0).unwrap());
        });
    }
}

fn bench_solve(c: &mut Criterion) {
    let mesh = create_grid_mesh(50);
    let labels = classify_vertices(&mesh);
    let options = SmootherOptions::default();
    let assembly = assemble_system(&mesh, &labels, &options, 0).unwrap();
    let x0 = assembly.layout.initial_guess(&mesh);

    c.bench_function("solve_50x50", |b| {
        b.iter(|| {
            solve_weighted_least_squares(black_box(&assembly.system), Some(&x0), &options.solver)
                .unwrap()
        });
    });
}

fn bench_smooth(c: &mut Criterion) {
    let mesh = create_grid_mesh(30);
    let target = mesh.clone();

    for (name, mode) in [
        ("smooth_30x30_uniform", LaplacianMode::Uniform),
        ("smooth_30x30_cotangent", LaplacianMode::Cotangent),
    ] {
        let options = SmootherOptions::default()
            .with_laplacian_mode(mode)
            .with_iterations(3);
        c.bench_function(name, |b| {
            b.iter(|| {
                let mut m = mesh.clone();
                feature_preserving_smooth_with_diagnostics(
                    &mut m,
                    &target,
                    &options,
                    &Diagnostics::ignore(),
                )
                .unwrap();
                m
            });
        });
    }
}

fn bench_closest_point(c: &mut Criterion) {
    let mesh = create_grid_mesh(100);
    let index = SpatialIndex::build_from_mesh_faces(&mesh);
    let queries: Vec<Point3<f64>> = mesh
        .positions()
        .iter()
        .map(|p| Point3::new(p.x + 0.3, p.y - 0.2, p.z + 0.5))
        .collect();

    c.bench_function("closest_point_100x100", |b| {
        b.iter(|| {
            queries
                .iter()
                .filter_map(|q| index.closest_point(black_box(q)))
                .count()
        });
    });
}

criterion_group!(benches, bench_assembly, bench_solve, bench_smooth, bench_closest_point);
criterion_main!(benches);
