//! Incremental P-Delta driver
//!
//! The load is applied in equal steps. Within a step the beam geometric
//! stiffness is rebuilt from the axial forces of the last iterate and the
//! system re-solved until the displacement increment is small relative to
//! the displacements. The tangent `K + Kg` must stay positive definite;
//! once it does not, the load has passed a buckling load and the solve
//! stops as unstable.

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{build_result, reactions, solve, solve_definite, solve_linear, with_springs};
use crate::analysis::{validate, AnalysisOptions};
use crate::assembly::{Assembler, AxialForces};
use crate::error::FemResult;
use crate::math::Vec as FEVec;
use crate::mesh::Mesh;
use crate::post_processor::{axial_forces, post_process};
use crate::results::{SolveStatus, SolverResult};

/// Shared flag a caller sets to stop a running nonlinear solve
///
/// Checked before every iteration, never inside a linear solve.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Geometrically nonlinear (P-Delta) analysis of `mesh`
///
/// Identical to [`solve_linear`] when `geometric_nonlinear` is off or the
/// analysis is not a frame. Non-convergence, instability and cancellation
/// are reported through [`SolverResult::status`] with the last iterate's
/// fields.
pub fn solve_nonlinear(
    mesh: &Mesh,
    options: &AnalysisOptions,
    cancel: Option<&CancelFlag>,
) -> FemResult<SolverResult> {
    if !options.geometric_nonlinear || !options.analysis_type.is_frame() {
        return solve_linear(mesh, options);
    }
    validate(mesh, options.analysis_type)?;

    let assembler = Assembler::new(mesh, options.analysis_type);
    let k_linear = assembler.assemble_global_stiffness_matrix()?;
    let f = assembler.assemble_force_vector()?;
    let springs = assembler.spring_diagonal();
    let constrained = assembler.constrained_dofs();

    let steps = options.load_steps.max(1);
    let max_iterations = options.max_iterations.max(1);

    let mut u = FEVec::zeros(f.len());
    let mut k_used = k_linear.clone();
    let mut axial_used: Option<AxialForces> = None;
    let mut axial: Option<AxialForces> = None;
    let mut lambda_solved = 0.0;
    let mut total_iterations = 0;
    let mut status = None;

    'steps: for step in 1..=steps {
        let lambda = step as f64 / steps as f64;
        let f_step = &f * lambda;
        let mut converged = false;

        for iteration in 1..=max_iterations {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                info!("nonlinear solve cancelled in step {step} before iteration {iteration}");
                status = Some(SolveStatus::Cancelled);
                break 'steps;
            }

            let k = match &axial {
                Some(forces) => assembler.assemble_stiffness(Some(forces))?,
                None => k_linear.clone(),
            };
            let k_total = with_springs(&k, &springs);
            let u_new = if axial.is_some() {
                match solve_definite(&k_total, &f_step, &constrained)? {
                    Some(u_new) => u_new,
                    None => {
                        warn!(
                            "tangent stiffness not positive definite in step {step} (λ={lambda:.3}), \
                             load exceeds a buckling load"
                        );
                        status = Some(SolveStatus::Unstable { step });
                        break 'steps;
                    }
                }
            } else {
                solve(&k_total, &f_step, &constrained, options.pivot_tolerance)?
            };

            let increment = (&u_new - &u).norm();
            let scale = u_new.norm().max(f64::EPSILON);
            u = u_new;
            k_used = k;
            axial_used = axial.take();
            lambda_solved = lambda;
            axial = Some(axial_forces(&assembler, &u, lambda, axial_used.as_ref())?);
            total_iterations += 1;

            debug!(
                "step {step}/{steps} (λ={lambda:.3}) iteration {iteration}: |Δu|/|u| = {:.3e}",
                increment / scale
            );
            if increment <= options.tolerance * scale {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!("P-Delta iteration did not converge in step {step} after {max_iterations} iterations");
            status = Some(SolveStatus::NotConverged {
                step,
                iterations: max_iterations,
            });
            break;
        }
    }

    let status = status.unwrap_or(SolveStatus::Converged {
        iterations: total_iterations,
    });
    let applied = &f * lambda_solved;
    let r = reactions(&k_used, &u, &applied);
    let post = post_process(
        &assembler,
        &u,
        lambda_solved,
        axial_used.as_ref(),
        options.num_stations,
    )?;

    info!(
        "nonlinear solve: {:?} after {} iterations, λ = {:.3}, max |u| = {:.4e}",
        status,
        total_iterations,
        lambda_solved,
        u.amax()
    );

    Ok(build_result(
        &assembler,
        u,
        r,
        applied,
        post,
        status,
        lambda_solved,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let handle = flag.clone();
        assert!(!flag.is_cancelled());
        handle.cancel();
        assert!(flag.is_cancelled());
        flag.reset();
        assert!(!handle.is_cancelled());
    }
}
