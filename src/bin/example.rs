//! FEM2D Solver Example - Simple Portal Frame

use anyhow::Context;
use fem2d_solver::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    println!("=== FEM2D Solver Example: Portal Frame ===\n");

    let mut mesh = Mesh::new();

    // IPE300 from its plates: 300 × 150, tf = 10.7 mm, tw = 7.1 mm
    let ipe300 = BeamSection::i_section(0.3, 0.15, 0.0107, 0.0071);
    mesh.add_section("IPE300", ipe300);

    // Create a simple portal frame
    //
    //     N3 -------- N4
    //     |          |
    //     |          |
    //     |          |
    //     N1        N2
    //     ^          ^
    //   Fixed     Fixed
    //

    // Add nodes (in meters)
    let height = 4.0; // 4m column height
    let span = 6.0; // 6m beam span

    let n1 = mesh.add_node(0.0, 0.0);
    let n2 = mesh.add_node(span, 0.0);
    let n3 = mesh.add_node(0.0, height);
    let n4 = mesh.add_node(span, height);

    let steel = DEFAULT_MATERIAL_ID;
    let col1 = mesh
        .add_beam_element([n1, n3], steel, ipe300)
        .context("left column")?;
    let col2 = mesh
        .add_beam_element([n2, n4], steel, ipe300)
        .context("right column")?;
    let beam = mesh
        .add_beam_element([n3, n4], steel, ipe300)
        .context("beam")?;

    // Fixed supports at base
    for node in [n1, n2] {
        mesh.update_node(node, NodeUpdate::new().constraints(Constraints::fixed()));
    }

    // 20 kN/m on the beam (negative Y = downward), 10 kN wind at roof level
    mesh.update_beam_element(
        beam,
        BeamUpdate::new().distributed_load(Some(DistributedLoad::uniform(-20000.0))),
    );
    mesh.update_node(n3, NodeUpdate::new().loads(NodalLoads::fx(10000.0)));

    println!("Running linear analysis...\n");
    let linear = solve_linear(&mesh, &AnalysisOptions::frame())?;
    print_results(&linear, &[n1, n2, n3, n4], &[n1, n2], &[col1, col2, beam]);
    print_stresses(&mesh, &linear, &[col1, col2, beam]);

    println!("=== P-Delta Analysis Comparison ===\n");
    let options = AnalysisOptions::frame().with_geometric_nonlinear(true);
    let p_delta = solve_nonlinear(&mesh, &options, None)?;
    println!("Status: {:?}", p_delta.status);
    if !p_delta.is_converged() {
        println!("P-Delta analysis did not converge, showing the last iterate");
    }

    let dx_linear = linear.node_displacement(n3).map_or(0.0, |d| d.dx);
    let dx_p_delta = p_delta.node_displacement(n3).map_or(0.0, |d| d.dx);
    println!("Lateral displacement at N3 (linear):  {:.4}mm", dx_linear * 1000.0);
    println!("Lateral displacement at N3 (P-Delta): {:.4}mm", dx_p_delta * 1000.0);

    println!("\n=== Analysis Complete ===");
    Ok(())
}

fn print_results(result: &SolverResult, nodes: &[NodeId], supports: &[NodeId], beams: &[ElementId]) {
    println!("Node Displacements:");
    for &id in nodes {
        if let Some(disp) = result.node_displacement(id) {
            println!(
                "  N{}: DX={:.4}mm, DY={:.4}mm, RZ={:.6}rad",
                id,
                disp.dx * 1000.0,
                disp.dy * 1000.0,
                disp.rz
            );
        }
    }

    println!("\nSupport Reactions:");
    for &id in supports {
        if let Some(rxn) = result.node_reaction(id) {
            println!(
                "  N{}: FX={:.2}kN, FY={:.2}kN, MZ={:.2}kN·m",
                id,
                rxn.fx / 1000.0,
                rxn.fy / 1000.0,
                rxn.mz / 1000.0
            );
        }
    }

    println!("\nBeam Forces:");
    for id in beams {
        if let Some(forces) = result.beam_forces.get(id) {
            println!(
                "  E{}: N={:.2}kN, Vmax={:.2}kN, Mmax={:.2}kN·m",
                id,
                forces.n1 / 1000.0,
                forces.max_v / 1000.0,
                forces.max_m / 1000.0
            );
        }
    }

    let [fx, fy, _] = result.reaction_sum();
    println!("\nSummary:");
    println!("  Max displacement: {:.4}mm", result.max_displacement() * 1000.0);
    println!("  Reaction sum: FX={:.2}kN, FY={:.2}kN", fx / 1000.0, fy / 1000.0);
    println!();
}

/// Extreme fibre bending stress M / W of each beam
fn print_stresses(mesh: &Mesh, result: &SolverResult, beams: &[ElementId]) {
    println!("Bending Stresses:");
    for id in beams {
        let (Some(beam), Some(forces)) = (mesh.beam(*id), result.beam_forces.get(id)) else {
            continue;
        };
        let w = beam.section.elastic_modulus();
        if w > 0.0 {
            println!("  E{}: σmax={:.1}MPa", id, forces.max_m / w / 1e6);
        }
    }
    println!();
}
