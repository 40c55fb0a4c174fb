//! Benchmarks for the 2D solver

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fem2d_solver::prelude::*;

fn create_cantilever_mesh() -> Mesh {
    let mut mesh = Mesh::new();
    let section = BeamSection::rectangular(0.3, 0.5);

    let n1 = mesh.add_node(0.0, 0.0);
    let n2 = mesh.add_node(10.0, 0.0);
    mesh.add_beam_element([n1, n2], DEFAULT_MATERIAL_ID, section)
        .unwrap();
    mesh.update_node(n1, NodeUpdate::new().constraints(Constraints::fixed()));
    mesh.update_node(n2, NodeUpdate::new().loads(NodalLoads::fy(-10000.0)));

    mesh
}

fn create_multi_story_frame(stories: usize, bays: usize) -> Mesh {
    let mut mesh = Mesh::new();
    let column = BeamSection::rectangular(0.4, 0.4);
    let girder = BeamSection::rectangular(0.3, 0.6);

    let story_height = 3.5;
    let bay_width = 6.0;

    // Node grid, row-major by story
    let mut grid = Vec::with_capacity((stories + 1) * (bays + 1));
    for story in 0..=stories {
        for bay in 0..=bays {
            let x = bay as f64 * bay_width;
            let y = story as f64 * story_height;
            grid.push(mesh.add_node(x, y));
        }
    }
    let at = |story: usize, bay: usize| grid[story * (bays + 1) + bay];

    for story in 0..stories {
        for bay in 0..=bays {
            mesh.add_beam_element([at(story, bay), at(story + 1, bay)], DEFAULT_MATERIAL_ID, column)
                .unwrap();
        }
    }

    for story in 1..=stories {
        for bay in 0..bays {
            let id = mesh
                .add_beam_element([at(story, bay), at(story, bay + 1)], DEFAULT_MATERIAL_ID, girder)
                .unwrap();
            mesh.update_beam_element(
                id,
                BeamUpdate::new().distributed_load(Some(DistributedLoad::uniform(-25000.0))),
            );
        }
    }

    for bay in 0..=bays {
        mesh.update_node(at(0, bay), NodeUpdate::new().constraints(Constraints::fixed()));
    }

    // Notional lateral load at each floor
    for story in 1..=stories {
        mesh.update_node(at(story, 0), NodeUpdate::new().loads(NodalLoads::fx(5000.0)));
    }

    mesh
}

/// Cantilevered plate strip of `nx` × `ny` quads
fn create_plate_strip(nx: usize, ny: usize) -> Mesh {
    let mut mesh = Mesh::new();
    let (lx, ly, t) = (4.0, 1.0, 0.01);

    let mut grid = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            let x = lx * i as f64 / nx as f64;
            let y = ly * j as f64 / ny as f64;
            grid.push(mesh.add_node(x, y));
        }
    }
    let at = |i: usize, j: usize| grid[j * (nx + 1) + i];

    for j in 0..ny {
        for i in 0..nx {
            let corners = [at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)];
            mesh.add_quad_element(corners, DEFAULT_MATERIAL_ID, t).unwrap();
        }
    }

    for j in 0..=ny {
        mesh.update_node(at(0, j), NodeUpdate::new().constraints(Constraints::pinned()));
    }
    mesh.update_node(at(nx, ny), NodeUpdate::new().loads(NodalLoads::fy(-1000.0)));

    mesh
}

fn benchmark_cantilever(c: &mut Criterion) {
    let mesh = create_cantilever_mesh();
    c.bench_function("cantilever_linear", |b| {
        b.iter(|| black_box(solve_linear(&mesh, &AnalysisOptions::frame()).unwrap()))
    });
}

fn benchmark_small_frame(c: &mut Criterion) {
    let mesh = create_multi_story_frame(3, 2);
    c.bench_function("frame_3story_2bay_linear", |b| {
        b.iter(|| black_box(solve_linear(&mesh, &AnalysisOptions::frame()).unwrap()))
    });
}

fn benchmark_medium_frame(c: &mut Criterion) {
    let mesh = create_multi_story_frame(10, 5);
    c.bench_function("frame_10story_5bay_linear", |b| {
        b.iter(|| black_box(solve_linear(&mesh, &AnalysisOptions::frame()).unwrap()))
    });
}

fn benchmark_pdelta(c: &mut Criterion) {
    let mesh = create_multi_story_frame(5, 3);
    let options = AnalysisOptions::frame().with_geometric_nonlinear(true);
    c.bench_function("frame_5story_3bay_pdelta", |b| {
        b.iter(|| black_box(solve_nonlinear(&mesh, &options, None).unwrap()))
    });
}

fn benchmark_plate_strip(c: &mut Criterion) {
    let mesh = create_plate_strip(16, 4);
    c.bench_function("plate_strip_16x4_plane_stress", |b| {
        b.iter(|| black_box(solve_linear(&mesh, &AnalysisOptions::plane_stress()).unwrap()))
    });
}

criterion_group!(
    benches,
    benchmark_cantilever,
    benchmark_small_frame,
    benchmark_medium_frame,
    benchmark_pdelta,
    benchmark_plate_strip,
);

criterion_main!(benches);
