//! Linear static solver
//!
//! Constrained DOFs are eliminated, the reduced system is solved by a dense
//! LU decomposition and zeros are reinserted. Reactions are recovered
//! from the unreduced structural stiffness as `R = K·U − F`.

mod nonlinear;

pub use nonlinear::{solve_nonlinear, CancelFlag};

use log::{debug, info};

use crate::analysis::{validate, AnalysisOptions};
use crate::assembly::Assembler;
use crate::error::{FemError, FemResult};
use crate::math::{solve_cholesky, solve_linear_system, Mat, Vec as FEVec};
use crate::mesh::Mesh;
use crate::post_processor::{post_process, PostProcessed};
use crate::results::{SolveStatus, SolverResult};

/// DOFs left free once `constrained` and stiffness-free rows are removed
///
/// A free DOF whose stiffness row is identically zero is held at zero as
/// well; if it carries load the system is singular.
fn free_dofs(k: &Mat, f: &FEVec, constrained: &[usize]) -> FemResult<Vec<usize>> {
    let n = f.len();
    let mut eliminated = vec![false; n];
    for &dof in constrained {
        if dof < n {
            eliminated[dof] = true;
        }
    }

    for i in 0..n {
        if eliminated[i] || k.row(i).iter().any(|&v| v != 0.0) {
            continue;
        }
        if f[i] != 0.0 {
            return Err(FemError::SingularSystem { dof: i, pivot: 0.0 });
        }
        debug!("DOF {i} has no stiffness, held at zero");
        eliminated[i] = true;
    }

    Ok((0..n).filter(|&i| !eliminated[i]).collect())
}

/// Full displacement vector with zeros at the eliminated DOFs
fn expand(n: usize, free: &[usize], u_red: &FEVec) -> FEVec {
    let mut u = FEVec::zeros(n);
    for (a, &i) in free.iter().enumerate() {
        u[i] = u_red[a];
    }
    u
}

/// Solve `K·U = F` with zero displacement at the `constrained` DOFs
pub fn solve(k: &Mat, f: &FEVec, constrained: &[usize], pivot_tolerance: f64) -> FemResult<FEVec> {
    let free = free_dofs(k, f, constrained)?;
    let k_red = k.select_rows(free.iter()).select_columns(free.iter());
    let f_red = f.select_rows(free.iter());

    debug!("solving {} free of {} DOFs", free.len(), f.len());
    let u_red = solve_linear_system(k_red, &f_red, pivot_tolerance).map_err(|breakdown| {
        FemError::SingularSystem {
            dof: free[breakdown.column],
            pivot: breakdown.pivot,
        }
    })?;
    Ok(expand(f.len(), &free, &u_red))
}

/// Like [`solve`], by Cholesky decomposition of the reduced system
///
/// `Ok(None)` when the reduced stiffness is not positive definite.
pub fn solve_definite(k: &Mat, f: &FEVec, constrained: &[usize]) -> FemResult<Option<FEVec>> {
    let free = free_dofs(k, f, constrained)?;
    let k_red = k.select_rows(free.iter()).select_columns(free.iter());
    let f_red = f.select_rows(free.iter());

    Ok(solve_cholesky(k_red, &f_red).map(|u_red| expand(f.len(), &free, &u_red)))
}

/// Reactions `K·U − F` over the full system
pub fn reactions(k: &Mat, u: &FEVec, f: &FEVec) -> FEVec {
    k * u - f
}

/// Structural stiffness with node springs added to the diagonal
pub(crate) fn with_springs(k: &Mat, springs: &FEVec) -> Mat {
    k + Mat::from_diagonal(springs)
}

/// Package solved fields into a [`SolverResult`]
pub(crate) fn build_result(
    assembler: &Assembler<'_>,
    displacements: FEVec,
    reactions: FEVec,
    applied_loads: FEVec,
    post: PostProcessed,
    status: SolveStatus,
    load_factor: f64,
) -> SolverResult {
    let dofs = assembler.dof_map();
    SolverResult {
        analysis_type: assembler.analysis_type(),
        dofs_per_node: dofs.dofs_per_node(),
        node_id_order: dofs.node_order().to_vec(),
        displacements: displacements.iter().copied().collect(),
        reactions: reactions.iter().copied().collect(),
        applied_loads: applied_loads.iter().copied().collect(),
        element_stresses: post.element_stresses,
        beam_forces: post.beam_forces,
        max_von_mises: post.max_von_mises,
        min_von_mises: post.min_von_mises,
        status,
        load_factor,
        diagnostics: assembler.diagnostics().to_vec(),
    }
}

/// First-order static analysis of `mesh`
pub fn solve_linear(mesh: &Mesh, options: &AnalysisOptions) -> FemResult<SolverResult> {
    validate(mesh, options.analysis_type)?;

    let assembler = Assembler::new(mesh, options.analysis_type);
    let k = assembler.assemble_global_stiffness_matrix()?;
    let f = assembler.assemble_force_vector()?;
    let constrained = assembler.constrained_dofs();

    let k_total = with_springs(&k, &assembler.spring_diagonal());
    let u = solve(&k_total, &f, &constrained, options.pivot_tolerance)?;
    let r = reactions(&k, &u, &f);

    let post = post_process(&assembler, &u, 1.0, None, options.num_stations)?;
    info!(
        "linear {:?} solve: {} DOFs, {} constrained, max |u| = {:.4e}",
        options.analysis_type,
        f.len(),
        constrained.len(),
        u.amax()
    );

    Ok(build_result(
        &assembler,
        u,
        r,
        f,
        post,
        SolveStatus::Converged { iterations: 1 },
        1.0,
    ))
}

/// Run the analysis selected by `options`
pub fn analyze(mesh: &Mesh, options: &AnalysisOptions) -> FemResult<SolverResult> {
    if options.geometric_nonlinear {
        solve_nonlinear(mesh, options, None)
    } else {
        solve_linear(mesh, options)
    }
}
